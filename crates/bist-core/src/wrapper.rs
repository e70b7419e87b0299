//! Top-level wrapper tying the shared unit, bus port, register file, idle
//! detector and controller into one synchronous design with a per-cycle
//! pin-level interface.

use crate::alu::{self, AluOp};
use crate::api::{
    BistConfig, BistSnapshot, RestoreError, SnapshotVersion, TickInputs, TickOutputs, TraceEvent,
    TraceSink,
};
use crate::bus::{ApbPort, BusCommit};
use crate::controller::{
    BistController, BistPhase, RunEvent, RuntimeStatus, StepContext, RUN_TEST_PATTERNS,
};
use crate::counters::RunCounters;
use crate::idle::IdleDetector;
use crate::regfile::{RegisterFile, CTRL_ENABLE};

/// Response corruption applied while `fault_inject` is held during a run.
pub const FAULT_INJECT_MASK: u32 = 0x0000_0001;

struct NullSink;

impl TraceSink for NullSink {
    fn on_event(&mut self, _event: TraceEvent) {}
}

/// Cycle-accurate model of the self-testing shared-unit wrapper.
///
/// One call to [`tick`] is one clock cycle: consumer pins, test hooks and
/// bus pins go in, unit result and status pins come out. State moves at
/// the end of the call, so outputs always reflect the registers as they
/// stood when the cycle began.
///
/// [`tick`]: Self::tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AluBistWrapper {
    regs: RegisterFile,
    port: ApbPort,
    idle: IdleDetector,
    controller: BistController,
}

impl Default for AluBistWrapper {
    fn default() -> Self {
        Self::new(BistConfig::default())
    }
}

impl AluBistWrapper {
    /// Creates a wrapper in the reset state: registers zero, engine idle.
    #[must_use]
    pub const fn new(config: BistConfig) -> Self {
        Self {
            regs: RegisterFile::new(),
            port: ApbPort::new(),
            idle: IdleDetector::new(),
            controller: BistController::new(config.effective_irq_pulse_width()),
        }
    }

    /// Advances the whole design one clock cycle.
    pub fn tick(&mut self, inputs: TickInputs) -> TickOutputs {
        self.tick_traced(inputs, &mut NullSink)
    }

    /// Advances one clock cycle, reporting trace events to `sink`.
    pub fn tick_traced(&mut self, inputs: TickInputs, sink: &mut dyn TraceSink) -> TickOutputs {
        let phase_before = self.controller.phase();
        let testing = phase_before.is_testing();

        let trigger = self
            .idle
            .tick(inputs.consumer_active, self.regs.threshold());

        // Unit mux: the selector is the phase registered at cycle start.
        let (op, a, b) = if testing {
            let pattern = self.controller.pattern();
            (AluOp::Add, pattern, !pattern)
        } else {
            (inputs.op, inputs.operand_a, inputs.operand_b)
        };
        let mut response = alu::eval(op, a, b);
        if testing && inputs.fault_inject {
            response ^= FAULT_INJECT_MASK;
        }

        // Bus reads observe the status registered at cycle start.
        let status = self.controller.status();
        let (reply, commit) = self
            .port
            .tick(inputs.bus, |addr| self.regs.read(addr, status));

        let report = self.controller.step(StepContext {
            enable: self.regs.enable(),
            idle_trigger: trigger,
            consumer_active: inputs.consumer_active,
            golden_signature: self.regs.golden_signature(),
            response,
        });

        let phase_after = self.controller.phase();
        if phase_after != phase_before {
            sink.on_event(TraceEvent::PhaseChanged {
                from: phase_before,
                to: phase_after,
            });
        }
        match report.event {
            Some(RunEvent::Completed {
                captured,
                golden,
                failed,
            }) => sink.on_event(TraceEvent::RunCompleted {
                captured,
                golden,
                failed,
            }),
            Some(RunEvent::Aborted { patterns_done }) => {
                sink.on_event(TraceEvent::RunAborted { patterns_done });
            }
            None => {}
        }

        // Committed writes land after the controller step; the engine sees
        // them on the following cycle.
        match commit {
            Some(BusCommit::Write { addr, value }) => {
                self.regs.write(addr, value);
                self.idle.clamp_to(self.regs.threshold());
                sink.on_event(TraceEvent::RegisterWritten { addr, value });
            }
            Some(BusCommit::Read { addr, value }) => {
                sink.on_event(TraceEvent::RegisterRead { addr, value });
            }
            None => {}
        }

        TickOutputs {
            result: response,
            bus: reply,
            error_irq: report.error_irq,
            bist_active: testing,
        }
    }

    /// Returns the registered status outputs.
    #[must_use]
    pub const fn status(&self) -> RuntimeStatus {
        self.controller.status()
    }

    /// Returns the controller phase registered for the current cycle.
    #[must_use]
    pub const fn phase(&self) -> BistPhase {
        self.controller.phase()
    }

    /// True when the engine owns the shared unit in the current cycle.
    #[must_use]
    pub const fn bist_active(&self) -> bool {
        self.controller.phase().is_testing()
    }

    /// Returns the lifetime run counters.
    #[must_use]
    pub const fn counters(&self) -> RunCounters {
        self.controller.counters()
    }

    /// Returns the software-visible register file.
    #[must_use]
    pub const fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    /// Applies a warm reset: registers, bus port, detector and controller
    /// return to their power-on state. Lifetime counters survive.
    pub fn reset(&mut self) {
        self.regs = RegisterFile::new();
        self.port = ApbPort::new();
        self.idle = IdleDetector::new();
        self.controller.reset();
    }

    /// Captures the complete synchronous state.
    #[must_use]
    pub const fn snapshot(&self) -> BistSnapshot {
        let status = self.controller.status();
        BistSnapshot {
            version: SnapshotVersion::V1,
            ctrl: self.regs.ctrl(),
            threshold: self.regs.threshold(),
            golden_signature: self.regs.golden_signature(),
            phase: self.controller.phase(),
            fail: status.fail,
            captured_signature: status.captured_signature,
            lfsr_state: self.controller.lfsr_state(),
            misr_signature: self.controller.misr_signature(),
            idle_count: self.idle.count(),
            idle_triggered: self.idle.triggered(),
            bus_phase: self.port.phase(),
            irq_cycles_left: self.controller.irq_cycles_left(),
            counters: self.controller.counters(),
        }
    }

    /// Reconstructs a wrapper from a captured snapshot.
    ///
    /// The restored instance is cycle-for-cycle identical to the captured
    /// one under the same subsequent inputs.
    ///
    /// # Errors
    ///
    /// Returns a [`RestoreError`] when the snapshot holds a state no
    /// capture of this design can produce.
    pub fn from_snapshot(
        config: BistConfig,
        snapshot: &BistSnapshot,
    ) -> Result<Self, RestoreError> {
        if snapshot.lfsr_state == 0 {
            return Err(RestoreError::ZeroPatternState);
        }
        if let BistPhase::RunTest { remaining } = snapshot.phase {
            if remaining == 0 || remaining > RUN_TEST_PATTERNS {
                return Err(RestoreError::InvalidPatternBudget { remaining });
            }
        }
        if snapshot.idle_count > snapshot.threshold {
            return Err(RestoreError::IdleCounterOverrun {
                count: snapshot.idle_count,
                threshold: snapshot.threshold,
            });
        }

        let status = RuntimeStatus {
            busy: snapshot.phase.is_busy(),
            fail: snapshot.fail,
            captured_signature: snapshot.captured_signature,
        };
        Ok(Self {
            regs: RegisterFile::from_raw(
                snapshot.ctrl & CTRL_ENABLE,
                snapshot.threshold,
                snapshot.golden_signature,
            ),
            port: ApbPort::from_phase(snapshot.bus_phase),
            idle: IdleDetector::from_raw(snapshot.idle_count, snapshot.idle_triggered),
            controller: BistController::from_raw(
                config.effective_irq_pulse_width(),
                snapshot.phase,
                status,
                snapshot.lfsr_state,
                snapshot.misr_signature,
                snapshot.irq_cycles_left,
                snapshot.counters,
            ),
        })
    }
}
