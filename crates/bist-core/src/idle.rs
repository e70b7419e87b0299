//! Consumer inactivity tracking for self-test scheduling.

/// Saturating idle-cycle counter with a registered trigger output.
///
/// The trigger deasserts the moment activity is seen and asserts one cycle
/// after `threshold` consecutive idle cycles have elapsed, then holds until
/// activity resumes. A threshold of zero trips on the first idle cycle. The
/// threshold is sampled every cycle, so a threshold register write takes
/// effect on the next evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IdleDetector {
    count: u32,
    triggered: bool,
}

impl IdleDetector {
    /// Creates a detector with a cleared count and trigger.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            count: 0,
            triggered: false,
        }
    }

    pub(crate) const fn from_raw(count: u32, triggered: bool) -> Self {
        Self { count, triggered }
    }

    /// Re-saturates the count after a threshold register write, keeping the
    /// counter-never-exceeds-threshold invariant across the write boundary.
    pub(crate) fn clamp_to(&mut self, threshold: u32) {
        self.count = self.count.min(threshold);
    }

    /// Returns the registered trigger level.
    #[must_use]
    pub const fn triggered(self) -> bool {
        self.triggered
    }

    /// Returns the consecutive-idle count, saturated at the threshold.
    #[must_use]
    pub const fn count(self) -> u32 {
        self.count
    }

    /// Advances one cycle and returns the trigger level for that cycle.
    #[allow(clippy::missing_const_for_fn)]
    pub fn tick(&mut self, activity: bool, threshold: u32) -> bool {
        if activity {
            self.count = 0;
            self.triggered = false;
        } else {
            self.triggered = self.count >= threshold;
            self.count = self.count.saturating_add(1).min(threshold);
        }
        self.triggered
    }
}
