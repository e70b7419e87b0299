//! Cycle-accurate model of an idle-triggered self-test (BIST) engine wrapped
//! around a shared 32-bit ALU.

/// Shared functional unit: operation encoding and combinational evaluation.
pub mod alu;
pub use alu::AluOp;

/// Pattern generator: maximal-length 32-bit Fibonacci LFSR.
pub mod lfsr;
pub use lfsr::{Lfsr, LFSR_RESET_SEED};

/// Signature analyzer: 32-bit Galois MISR response compressor.
pub mod misr;
pub use misr::{Misr, MISR_POLY};

/// Consumer idle detection with a software-programmable threshold.
pub mod idle;
pub use idle::IdleDetector;

/// Two-phase configuration bus port and transaction types.
pub mod bus;
pub use bus::{ApbPort, BusCommit, BusPhase, BusReply, BusRequest};

/// Memory-mapped register file and register/bit constants.
pub mod regfile;
pub use regfile::{
    RegisterFile, CTRL_ENABLE, REG_CAPTURED_SIG, REG_CTRL, REG_GOLDEN_SIG, REG_STATUS,
    REG_THRESHOLD, STATUS_BUSY, STATUS_FAIL,
};

/// Lifetime run statistics.
pub mod counters;
pub use counters::RunCounters;

/// Self-test controller state machine.
pub mod controller;
pub use controller::{
    BistController, BistPhase, RunEvent, RuntimeStatus, StepContext, StepReport,
    RUN_TEST_PATTERNS,
};

/// Public host-facing API contract and integration types.
pub mod api;
pub use api::{
    BistConfig, BistSnapshot, RestoreError, SnapshotVersion, TickInputs, TickOutputs, TraceEvent,
    TraceSink, DEFAULT_IRQ_PULSE_WIDTH,
};

/// Top-level wrapper integrating every block behind a per-cycle interface.
pub mod wrapper;
pub use wrapper::{AluBistWrapper, FAULT_INJECT_MASK};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
