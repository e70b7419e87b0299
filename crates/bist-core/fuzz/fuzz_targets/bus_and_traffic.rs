#![no_main]

use bist_core::{
    alu, AluBistWrapper, AluOp, BistConfig, BusRequest, TickInputs, RUN_TEST_PATTERNS,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut wrapper = AluBistWrapper::default();

    for chunk in data.chunks_exact(8) {
        let flags = chunk[0];
        let op = AluOp::from_u8(chunk[1] % 7).expect("selector in range");
        let a = u32::from_le_bytes([chunk[2], chunk[3], chunk[4], chunk[5]]);
        let b = u32::from(chunk[6]) * 0x0101_0101;

        let inputs = TickInputs {
            op,
            operand_a: a,
            operand_b: b,
            consumer_active: flags & 0x01 != 0,
            fault_inject: flags & 0x02 != 0,
            bus: BusRequest {
                psel: flags & 0x04 != 0,
                penable: flags & 0x08 != 0,
                pwrite: flags & 0x10 != 0,
                paddr: u32::from(chunk[7]),
                pwdata: a ^ b,
            },
        };

        let out = wrapper.tick(inputs);

        // The responder never inserts wait states.
        assert!(out.bus.pready);
        // Consumer traffic is bit-exact whenever the engine does not own
        // the unit, fault pin notwithstanding.
        if inputs.consumer_active && !out.bist_active {
            assert_eq!(out.result, alu::eval(op, a, b));
        }

        // Captured state always satisfies the design invariants.
        let snap = wrapper.snapshot();
        assert_ne!(snap.lfsr_state, 0);
        assert!(snap.idle_count <= snap.threshold);
        if let bist_core::BistPhase::RunTest { remaining } = snap.phase {
            assert!(remaining >= 1 && remaining <= RUN_TEST_PATTERNS);
        }
        let restored = AluBistWrapper::from_snapshot(BistConfig::default(), &snap)
            .expect("live snapshot must restore");
        assert_eq!(restored, wrapper);
    }
});
