//! Walks the calibration protocol end to end: run once, read the captured
//! signature, commit it as golden, run again and report the verdict.

use bist_core::{
    AluBistWrapper, BusRequest, TickInputs, TraceEvent, TraceSink, REG_CAPTURED_SIG, REG_CTRL,
    REG_GOLDEN_SIG, REG_THRESHOLD,
};
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

struct PrintSink;

impl TraceSink for PrintSink {
    fn on_event(&mut self, event: TraceEvent) {
        if let TraceEvent::RunCompleted {
            captured,
            golden,
            failed,
        } = event
        {
            println!(
                "  run complete: captured {captured:#010X} golden {golden:#010X} ({})",
                if failed { "FAIL" } else { "pass" }
            );
        }
    }
}

fn apb_write(wrapper: &mut AluBistWrapper, sink: &mut PrintSink, addr: u8, value: u32) {
    let addr = u32::from(addr);
    wrapper.tick_traced(
        TickInputs::idle().with_bus(BusRequest::setup_write(addr, value)),
        sink,
    );
    wrapper.tick_traced(
        TickInputs::idle().with_bus(BusRequest::access_write(addr, value)),
        sink,
    );
}

fn apb_read(wrapper: &mut AluBistWrapper, sink: &mut PrintSink, addr: u8) -> u32 {
    let addr = u32::from(addr);
    wrapper.tick_traced(
        TickInputs::idle().with_bus(BusRequest::setup_read(addr)),
        sink,
    );
    let out = wrapper.tick_traced(
        TickInputs::idle().with_bus(BusRequest::access_read(addr)),
        sink,
    );
    out.bus.prdata
}

fn run_once(wrapper: &mut AluBistWrapper, sink: &mut PrintSink) {
    let target = wrapper.counters().runs_completed + 1;
    apb_write(wrapper, sink, REG_CTRL, 1);
    while wrapper.counters().runs_completed < target {
        wrapper.tick_traced(TickInputs::idle(), sink);
    }
    apb_write(wrapper, sink, REG_CTRL, 0);
    while wrapper.status().busy {
        wrapper.tick_traced(TickInputs::idle(), sink);
    }
}

fn main() {
    let mut wrapper = AluBistWrapper::default();
    let mut sink = PrintSink;

    apb_write(&mut wrapper, &mut sink, REG_THRESHOLD, 4);

    println!("calibration run (golden still zero, expected to mismatch):");
    run_once(&mut wrapper, &mut sink);

    let captured = apb_read(&mut wrapper, &mut sink, REG_CAPTURED_SIG);
    println!("committing {captured:#010X} as the golden signature");
    apb_write(&mut wrapper, &mut sink, REG_GOLDEN_SIG, captured);

    println!("verification run:");
    run_once(&mut wrapper, &mut sink);

    println!(
        "verdict: {}",
        if wrapper.status().fail { "FAIL" } else { "pass" }
    );
}
