//! Calibration and self-test scenarios driven over the configuration bus,
//! the same way an external bus master would exercise the real block.

use std::fmt;

use bist_core::{
    AluBistWrapper, BusRequest, TickInputs, TickOutputs, TraceSink, REG_CAPTURED_SIG, REG_CTRL,
    REG_GOLDEN_SIG, REG_STATUS, REG_THRESHOLD, STATUS_FAIL,
};

/// Knobs shared by every scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioOptions {
    /// Idle cycles before a run may start.
    pub idle_threshold: u32,
    /// Total cycle budget before the scenario gives up.
    pub max_cycles: u64,
}

impl Default for ScenarioOptions {
    fn default() -> Self {
        Self {
            idle_threshold: 2,
            max_cycles: 10_000,
        }
    }
}

/// Knobs specific to the `selftest` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelftestOptions {
    /// Shared scenario knobs.
    pub scenario: ScenarioOptions,
    /// Golden signature to compare against; calibrated on the fly if absent.
    pub golden: Option<u32>,
    /// Corrupt the unit's responses during the verification run.
    pub inject_fault: bool,
}

/// Scenario failure reported to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioError {
    /// The engine never reached the expected milestone.
    Timeout {
        /// Cycles spent before giving up.
        cycles: u64,
    },
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { cycles } => {
                write!(f, "self-test did not complete within {cycles} cycles")
            }
        }
    }
}

impl std::error::Error for ScenarioError {}

/// Outcome of a calibration scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    /// Signature captured by the calibration run.
    pub signature: u32,
    /// Cycles the scenario consumed.
    pub cycles: u64,
}

/// Outcome of a self-test scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// Golden signature the run was compared against.
    pub golden: u32,
    /// Signature captured by the verification run.
    pub captured: u32,
    /// True when the signatures mismatched.
    pub failed: bool,
    /// Error-notification pulses observed during the scenario.
    pub irq_pulses: u32,
    /// Cycles the scenario consumed.
    pub cycles: u64,
}

/// Bus master driving one wrapper instance through a scenario.
struct Driver<'a> {
    wrapper: AluBistWrapper,
    fault_inject: bool,
    irq_level: bool,
    irq_pulses: u32,
    cycles: u64,
    sink: &'a mut dyn TraceSink,
}

impl<'a> Driver<'a> {
    fn new(fault_inject: bool, sink: &'a mut dyn TraceSink) -> Self {
        Self {
            wrapper: AluBistWrapper::default(),
            fault_inject,
            irq_level: false,
            irq_pulses: 0,
            cycles: 0,
            sink,
        }
    }

    fn step_with(&mut self, bus: BusRequest) -> TickOutputs {
        let inputs = TickInputs {
            fault_inject: self.fault_inject,
            ..TickInputs::idle()
        }
        .with_bus(bus);
        let out = self.wrapper.tick_traced(inputs, self.sink);
        if out.error_irq && !self.irq_level {
            self.irq_pulses += 1;
        }
        self.irq_level = out.error_irq;
        self.cycles += 1;
        out
    }

    fn write(&mut self, addr: u8, value: u32) {
        let addr = u32::from(addr);
        self.step_with(BusRequest::setup_write(addr, value));
        self.step_with(BusRequest::access_write(addr, value));
    }

    fn read(&mut self, addr: u8) -> u32 {
        let addr = u32::from(addr);
        self.step_with(BusRequest::setup_read(addr));
        self.step_with(BusRequest::access_read(addr)).bus.prdata
    }

    fn run_until(
        &mut self,
        budget: u64,
        done: impl Fn(&AluBistWrapper) -> bool,
    ) -> Result<(), ScenarioError> {
        while !done(&self.wrapper) {
            if self.cycles >= budget {
                return Err(ScenarioError::Timeout {
                    cycles: self.cycles,
                });
            }
            self.step_with(BusRequest::idle());
        }
        Ok(())
    }

    /// One complete run: arm, wait for a fresh completion, disarm, park.
    fn run_once(&mut self, options: ScenarioOptions) -> Result<(), ScenarioError> {
        let target = self.wrapper.counters().runs_completed + 1;
        self.write(REG_THRESHOLD, options.idle_threshold);
        self.write(REG_CTRL, 1);
        self.run_until(options.max_cycles, |w| {
            w.counters().runs_completed >= target
        })?;
        self.write(REG_CTRL, 0);
        self.run_until(options.max_cycles, |w| !w.status().busy)
    }
}

/// Runs one self-test and reports the signature it captured.
///
/// # Errors
///
/// Returns [`ScenarioError::Timeout`] when the run does not complete within
/// the configured cycle budget.
pub fn calibrate(
    options: ScenarioOptions,
    sink: &mut dyn TraceSink,
) -> Result<Calibration, ScenarioError> {
    let mut driver = Driver::new(false, sink);
    driver.run_once(options)?;
    let signature = driver.read(REG_CAPTURED_SIG);
    Ok(Calibration {
        signature,
        cycles: driver.cycles,
    })
}

/// Runs a verification self-test against a golden signature, calibrating
/// one first when none is supplied.
///
/// # Errors
///
/// Returns [`ScenarioError::Timeout`] when either run does not complete
/// within the configured cycle budget.
pub fn selftest(
    options: SelftestOptions,
    sink: &mut dyn TraceSink,
) -> Result<Verdict, ScenarioError> {
    let golden = match options.golden {
        Some(golden) => golden,
        None => calibrate(options.scenario, sink)?.signature,
    };

    let mut driver = Driver::new(options.inject_fault, sink);
    driver.write(REG_GOLDEN_SIG, golden);
    driver.run_once(options.scenario)?;

    let status = driver.read(REG_STATUS);
    let captured = driver.read(REG_CAPTURED_SIG);
    Ok(Verdict {
        golden,
        captured,
        failed: status & STATUS_FAIL != 0,
        irq_pulses: driver.irq_pulses,
        cycles: driver.cycles,
    })
}
