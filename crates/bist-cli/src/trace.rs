//! Trace sinks turning engine events into operator-readable lines.

use bist_core::{TraceEvent, TraceSink};

/// Sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl TraceSink for SilentSink {
    fn on_event(&mut self, _event: TraceEvent) {}
}

/// Sink that prints one line per event to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl TraceSink for StderrSink {
    fn on_event(&mut self, event: TraceEvent) {
        eprintln!("trace: {}", describe(event));
    }
}

/// Formats a trace event as a single human-readable line.
#[must_use]
pub fn describe(event: TraceEvent) -> String {
    match event {
        TraceEvent::PhaseChanged { from, to } => {
            format!("phase {} -> {}", from.name(), to.name())
        }
        TraceEvent::RunCompleted {
            captured,
            golden,
            failed,
        } => format!(
            "run complete: captured {captured:#010X} golden {golden:#010X} ({})",
            if failed { "fail" } else { "pass" }
        ),
        TraceEvent::RunAborted { patterns_done } => {
            format!("run aborted after {patterns_done} pattern cycles")
        }
        TraceEvent::RegisterWritten { addr, value } => {
            format!("bus write [{addr:#04X}] = {value:#010X}")
        }
        TraceEvent::RegisterRead { addr, value } => {
            format!("bus read [{addr:#04X}] -> {value:#010X}")
        }
    }
}
