//! Host-facing contracts for embedding the self-test engine: per-cycle pin
//! bundles, trace hooks, and state snapshots for save/restore and replay.

use thiserror::Error;

use crate::alu::AluOp;
use crate::bus::{BusPhase, BusReply, BusRequest};
use crate::controller::BistPhase;
use crate::counters::RunCounters;

/// Default error-notification pulse width, in cycles.
pub const DEFAULT_IRQ_PULSE_WIDTH: u32 = 1;

/// Immutable construction-time configuration for a wrapper instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BistConfig {
    /// Requested error-notification pulse width in cycles.
    pub irq_pulse_width: u32,
}

impl Default for BistConfig {
    fn default() -> Self {
        Self {
            irq_pulse_width: DEFAULT_IRQ_PULSE_WIDTH,
        }
    }
}

impl BistConfig {
    /// Returns the pulse width actually driven, clamped to at least one cycle.
    #[must_use]
    pub const fn effective_irq_pulse_width(self) -> u32 {
        if self.irq_pulse_width == 0 {
            1
        } else {
            self.irq_pulse_width
        }
    }
}

/// Input pins sampled by [`tick`] for one clock cycle.
///
/// [`tick`]: crate::AluBistWrapper::tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TickInputs {
    /// Consumer operation request for the shared unit.
    pub op: AluOp,
    /// Consumer operand A.
    pub operand_a: u32,
    /// Consumer operand B.
    pub operand_b: u32,
    /// True while the consumer drives the shared unit this cycle.
    pub consumer_active: bool,
    /// Test hook corrupting the unit response during a pattern run.
    pub fault_inject: bool,
    /// Configuration bus pins for this cycle.
    pub bus: BusRequest,
}

impl TickInputs {
    /// A cycle with no consumer activity and an idle bus.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            op: AluOp::Add,
            operand_a: 0,
            operand_b: 0,
            consumer_active: false,
            fault_inject: false,
            bus: BusRequest::idle(),
        }
    }

    /// A cycle where the consumer computes `op(a, b)` on the shared unit.
    #[must_use]
    pub const fn consumer(op: AluOp, operand_a: u32, operand_b: u32) -> Self {
        Self {
            op,
            operand_a,
            operand_b,
            consumer_active: true,
            ..Self::idle()
        }
    }

    /// Attaches configuration bus pins to this cycle.
    #[must_use]
    pub const fn with_bus(self, bus: BusRequest) -> Self {
        Self { bus, ..self }
    }
}

/// Output pins driven by [`tick`] for one clock cycle.
///
/// [`tick`]: crate::AluBistWrapper::tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TickOutputs {
    /// Raw shared-unit result pins. Consumer-owned unless `bist_active`.
    pub result: u32,
    /// Configuration bus reply pins.
    pub bus: BusReply,
    /// Error-notification pulse level.
    pub error_irq: bool,
    /// True while the engine owns the shared unit this cycle.
    pub bist_active: bool,
}

/// Deterministic trace events emitted at cycle boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// Controller phase transition.
    PhaseChanged {
        /// Phase registered at the start of the cycle.
        from: BistPhase,
        /// Phase registered for the next cycle.
        to: BistPhase,
    },
    /// A full run reached evaluation.
    RunCompleted {
        /// Signature compressed from the run's responses.
        captured: u32,
        /// Golden signature it was compared against.
        golden: u32,
        /// True when the signatures mismatched.
        failed: bool,
    },
    /// A run was abandoned to the consumer.
    RunAborted {
        /// Pattern cycles absorbed before the abort.
        patterns_done: u32,
    },
    /// A configuration bus write committed.
    RegisterWritten {
        /// Decoded low-byte register address.
        addr: u8,
        /// Value written.
        value: u32,
    },
    /// A configuration bus read completed.
    RegisterRead {
        /// Decoded low-byte register address.
        addr: u8,
        /// Value returned to the bus master.
        value: u32,
    },
}

/// Sink trait for deterministic trace hooks.
pub trait TraceSink {
    /// Records an event in cycle order.
    fn on_event(&mut self, event: TraceEvent);
}

/// Stable snapshot wire-version identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u16)]
pub enum SnapshotVersion {
    /// Initial schema revision for bist-core v0.1.x.
    V1 = 1,
}

impl SnapshotVersion {
    /// Converts wire value to known snapshot version.
    #[must_use]
    pub const fn from_u16(version: u16) -> Option<Self> {
        match version {
            1 => Some(Self::V1),
            _ => None,
        }
    }
}

/// Serializable full-state snapshot used for save/restore and replay.
///
/// Plain data: every field of the synchronous design appears here, so a
/// restored wrapper is cycle-for-cycle identical to the one captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BistSnapshot {
    /// Snapshot schema version.
    pub version: SnapshotVersion,
    /// CTRL register value.
    pub ctrl: u32,
    /// THRESHOLD register value.
    pub threshold: u32,
    /// GOLDEN_SIG register value.
    pub golden_signature: u32,
    /// Controller phase.
    pub phase: BistPhase,
    /// Sticky fail flag.
    pub fail: bool,
    /// Signature captured by the last completed run.
    pub captured_signature: u32,
    /// Pattern generator shift register state.
    pub lfsr_state: u32,
    /// Signature analyzer accumulator state.
    pub misr_signature: u32,
    /// Idle detector counter value.
    pub idle_count: u32,
    /// Idle detector trigger flop.
    pub idle_triggered: bool,
    /// Configuration bus handshake phase.
    pub bus_phase: BusPhase,
    /// Error-notification pulse cycles still pending.
    pub irq_cycles_left: u32,
    /// Lifetime run counters.
    pub counters: RunCounters,
}

/// Rejection reasons for [`from_snapshot`].
///
/// [`from_snapshot`]: crate::AluBistWrapper::from_snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum RestoreError {
    /// The all-zero generator state is absorbing and never occurs in a
    /// captured snapshot.
    #[error("pattern generator state is zero")]
    ZeroPatternState,
    /// A running phase must hold pattern budget in range.
    #[error("run pattern budget {remaining} is outside 1..=64")]
    InvalidPatternBudget {
        /// Budget value carried by the snapshot's running phase.
        remaining: u32,
    },
    /// The idle counter saturates at the threshold and cannot exceed it.
    #[error("idle counter {count} exceeds threshold {threshold}")]
    IdleCounterOverrun {
        /// Idle counter value carried by the snapshot.
        count: u32,
        /// Threshold register value carried by the snapshot.
        threshold: u32,
    },
}
