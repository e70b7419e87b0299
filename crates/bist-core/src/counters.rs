//! Lifetime run statistics, outside the memory-mapped register space.

/// Saturating counters accumulated across runs. Survive [`reset`].
///
/// [`reset`]: crate::AluBistWrapper::reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RunCounters {
    /// Runs that entered the pattern loop.
    pub runs_started: u32,
    /// Runs that reached signature evaluation.
    pub runs_completed: u32,
    /// Completed runs whose signature mismatched.
    pub runs_failed: u32,
    /// Runs abandoned because the consumer reclaimed the unit.
    pub runs_aborted: u32,
    /// Responses compressed into the signature register.
    pub patterns_absorbed: u64,
}

impl RunCounters {
    /// Creates zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            runs_started: 0,
            runs_completed: 0,
            runs_failed: 0,
            runs_aborted: 0,
            patterns_absorbed: 0,
        }
    }

    pub(crate) fn record_run_started(&mut self) {
        self.runs_started = self.runs_started.saturating_add(1);
    }

    pub(crate) fn record_run_completed(&mut self, failed: bool) {
        self.runs_completed = self.runs_completed.saturating_add(1);
        if failed {
            self.runs_failed = self.runs_failed.saturating_add(1);
        }
    }

    pub(crate) fn record_run_aborted(&mut self) {
        self.runs_aborted = self.runs_aborted.saturating_add(1);
    }

    pub(crate) fn record_pattern_absorbed(&mut self) {
        self.patterns_absorbed = self.patterns_absorbed.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::RunCounters;

    #[test]
    fn counters_start_at_zero() {
        assert_eq!(RunCounters::new(), RunCounters::default());
        assert_eq!(RunCounters::new().runs_started, 0);
    }

    #[test]
    fn completed_runs_split_by_outcome() {
        let mut counters = RunCounters::new();
        counters.record_run_started();
        counters.record_run_completed(false);
        counters.record_run_started();
        counters.record_run_completed(true);

        assert_eq!(counters.runs_started, 2);
        assert_eq!(counters.runs_completed, 2);
        assert_eq!(counters.runs_failed, 1);
        assert_eq!(counters.runs_aborted, 0);
    }

    #[test]
    fn counters_saturate_instead_of_wrapping() {
        let mut counters = RunCounters {
            runs_started: u32::MAX,
            patterns_absorbed: u64::MAX,
            ..RunCounters::new()
        };
        counters.record_run_started();
        counters.record_pattern_absorbed();
        assert_eq!(counters.runs_started, u32::MAX);
        assert_eq!(counters.patterns_absorbed, u64::MAX);
    }
}
