//! Self-test controller: the state machine that owns the pattern generator
//! and signature analyzer, arbitrates for the shared unit, and latches the
//! pass/fail outcome.

use crate::counters::RunCounters;
use crate::lfsr::Lfsr;
use crate::misr::Misr;
use crate::regfile::{STATUS_BUSY, STATUS_FAIL};

/// Pattern cycles in a full run. Fixed, independent of configuration.
pub const RUN_TEST_PATTERNS: u32 = 64;

/// Controller phase. `RunTest` carries its remaining pattern budget so a
/// running phase with an exhausted budget is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum BistPhase {
    /// Disabled, or parked after a run finished with enable clear.
    #[default]
    Idle,
    /// Enabled and waiting for an idle slot on the shared unit.
    WaitForSlot,
    /// Driving patterns into the unit and compressing its responses.
    RunTest {
        /// Pattern cycles left in this run, in `1..=`[`RUN_TEST_PATTERNS`].
        remaining: u32,
    },
    /// Comparing the captured signature against the golden value.
    Evaluate,
    /// Releasing the unit after the consumer reclaimed it mid-run.
    Abort,
}

impl BistPhase {
    /// True while this phase owns the shared unit's operand ports.
    #[must_use]
    pub const fn is_testing(self) -> bool {
        matches!(self, Self::RunTest { .. })
    }

    /// True while the STATUS busy bit reads as set.
    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::RunTest { .. } | Self::Evaluate)
    }

    /// Short phase name for traces.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::WaitForSlot => "wait-for-slot",
            Self::RunTest { .. } => "run-test",
            Self::Evaluate => "evaluate",
            Self::Abort => "abort",
        }
    }
}

/// Registered status outputs, spliced into STATUS and CAPTURED_SIG reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RuntimeStatus {
    /// Set from `RunTest` entry until the evaluation completes.
    pub busy: bool,
    /// Sticky mismatch flag, cleared by the next passing run.
    pub fail: bool,
    /// Signature captured by the last completed run.
    pub captured_signature: u32,
}

impl RuntimeStatus {
    /// Packs the STATUS register bit layout.
    #[must_use]
    pub const fn status_bits(self) -> u32 {
        let mut bits = 0;
        if self.busy {
            bits |= STATUS_BUSY;
        }
        if self.fail {
            bits |= STATUS_FAIL;
        }
        bits
    }
}

/// Inputs sampled by [`BistController::step`] each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StepContext {
    /// CTRL.ENABLE as currently latched.
    pub enable: bool,
    /// Idle-detector trigger for this cycle.
    pub idle_trigger: bool,
    /// True while the primary consumer drives the shared unit.
    pub consumer_active: bool,
    /// GOLDEN_SIG register value.
    pub golden_signature: u32,
    /// Shared-unit response word for this cycle.
    pub response: u32,
}

/// Outcome of a run, reported the cycle it resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunEvent {
    /// A full run reached evaluation.
    Completed {
        /// Signature compressed from the run's responses.
        captured: u32,
        /// Golden signature it was compared against.
        golden: u32,
        /// True when the signatures mismatched.
        failed: bool,
    },
    /// A run was abandoned to the consumer.
    Aborted {
        /// Pattern cycles absorbed before the abort.
        patterns_done: u32,
    },
}

/// What one controller step produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StepReport {
    /// Error-notification level driven this cycle.
    pub error_irq: bool,
    /// Run outcome, if one resolved this cycle.
    pub event: Option<RunEvent>,
}

/// The self-test state machine.
///
/// One call to [`step`] is one clock cycle. Phase transitions take effect
/// at the end of the step, so outputs sampled during a cycle reflect the
/// state registered at its start.
///
/// [`step`]: Self::step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BistController {
    phase: BistPhase,
    status: RuntimeStatus,
    lfsr: Lfsr,
    misr: Misr,
    irq_pulse_width: u32,
    irq_cycles_left: u32,
    counters: RunCounters,
}

impl BistController {
    /// Creates a controller in the reset state.
    ///
    /// `irq_pulse_width` is clamped to at least one cycle.
    #[must_use]
    pub const fn new(irq_pulse_width: u32) -> Self {
        Self {
            phase: BistPhase::Idle,
            status: RuntimeStatus {
                busy: false,
                fail: false,
                captured_signature: 0,
            },
            lfsr: Lfsr::new(),
            misr: Misr::new(),
            irq_pulse_width: clamp_pulse_width(irq_pulse_width),
            irq_cycles_left: 0,
            counters: RunCounters::new(),
        }
    }

    /// Advances the state machine one clock cycle.
    pub fn step(&mut self, ctx: StepContext) -> StepReport {
        let error_irq = self.irq_cycles_left > 0;
        self.irq_cycles_left = self.irq_cycles_left.saturating_sub(1);

        let (next, event) = match self.phase {
            BistPhase::Idle => (Self::step_idle(ctx), None),
            BistPhase::WaitForSlot => (self.step_wait_for_slot(ctx), None),
            BistPhase::RunTest { remaining } => self.step_run_test(ctx, remaining),
            BistPhase::Evaluate => self.step_evaluate(ctx),
            BistPhase::Abort => (Self::step_abort(ctx), None),
        };
        self.phase = next;
        self.status.busy = self.phase.is_busy();

        StepReport { error_irq, event }
    }

    const fn step_idle(ctx: StepContext) -> BistPhase {
        if ctx.enable {
            BistPhase::WaitForSlot
        } else {
            BistPhase::Idle
        }
    }

    fn step_wait_for_slot(&mut self, ctx: StepContext) -> BistPhase {
        if !ctx.enable {
            return BistPhase::Idle;
        }
        if ctx.idle_trigger && !ctx.consumer_active {
            // Every run compresses the same stimulus stream.
            self.lfsr.reset();
            self.misr.clear();
            self.counters.record_run_started();
            return BistPhase::RunTest {
                remaining: RUN_TEST_PATTERNS,
            };
        }
        BistPhase::WaitForSlot
    }

    fn step_run_test(&mut self, ctx: StepContext, remaining: u32) -> (BistPhase, Option<RunEvent>) {
        if ctx.consumer_active {
            self.misr.clear();
            self.counters.record_run_aborted();
            let event = RunEvent::Aborted {
                patterns_done: RUN_TEST_PATTERNS - remaining,
            };
            return (BistPhase::Abort, Some(event));
        }

        self.misr.absorb(ctx.response);
        self.lfsr.advance();
        self.counters.record_pattern_absorbed();

        let remaining = remaining - 1;
        if remaining == 0 {
            (BistPhase::Evaluate, None)
        } else {
            (BistPhase::RunTest { remaining }, None)
        }
    }

    fn step_evaluate(&mut self, ctx: StepContext) -> (BistPhase, Option<RunEvent>) {
        let captured = self.misr.value();
        let failed = captured != ctx.golden_signature;

        self.status.fail = failed;
        self.status.captured_signature = captured;
        if failed {
            self.irq_cycles_left = self.irq_pulse_width;
        }
        self.counters.record_run_completed(failed);

        let event = RunEvent::Completed {
            captured,
            golden: ctx.golden_signature,
            failed,
        };
        let next = if ctx.enable && ctx.idle_trigger {
            BistPhase::WaitForSlot
        } else {
            BistPhase::Idle
        };
        (next, Some(event))
    }

    const fn step_abort(ctx: StepContext) -> BistPhase {
        if ctx.enable {
            BistPhase::WaitForSlot
        } else {
            BistPhase::Idle
        }
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> BistPhase {
        self.phase
    }

    /// Returns the registered status outputs.
    #[must_use]
    pub const fn status(&self) -> RuntimeStatus {
        self.status
    }

    /// Returns the stimulus word the pattern generator drives this cycle.
    #[must_use]
    pub const fn pattern(&self) -> u32 {
        self.lfsr.value()
    }

    /// Returns the lifetime run counters.
    #[must_use]
    pub const fn counters(&self) -> RunCounters {
        self.counters
    }

    /// Parks the machine in `Idle` and rewinds the datapath.
    ///
    /// Lifetime counters survive, mirroring a warm reset.
    pub fn reset(&mut self) {
        self.phase = BistPhase::Idle;
        self.status = RuntimeStatus::default();
        self.lfsr.reset();
        self.misr.clear();
        self.irq_cycles_left = 0;
    }

    pub(crate) const fn lfsr_state(&self) -> u32 {
        self.lfsr.value()
    }

    pub(crate) const fn misr_signature(&self) -> u32 {
        self.misr.value()
    }

    pub(crate) const fn irq_cycles_left(&self) -> u32 {
        self.irq_cycles_left
    }

    pub(crate) const fn from_raw(
        irq_pulse_width: u32,
        phase: BistPhase,
        status: RuntimeStatus,
        lfsr_state: u32,
        misr_signature: u32,
        irq_cycles_left: u32,
        counters: RunCounters,
    ) -> Self {
        Self {
            phase,
            status,
            lfsr: Lfsr::from_raw(lfsr_state),
            misr: Misr::from_raw(misr_signature),
            irq_pulse_width: clamp_pulse_width(irq_pulse_width),
            irq_cycles_left,
            counters,
        }
    }
}

const fn clamp_pulse_width(width: u32) -> u32 {
    if width == 0 {
        1
    } else {
        width
    }
}
