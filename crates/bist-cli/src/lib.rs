//! Scenario runner library for the `bist-run` binary.

/// Bus-level calibration and self-test scenario drivers.
pub mod scenario;
/// Operator-facing trace sinks.
pub mod trace;
