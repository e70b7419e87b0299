//! CLI entry point for the bist-run binary.

use std::env;
use std::ffi::OsString;

use bist_cli::scenario::{self, ScenarioOptions, SelftestOptions};
use bist_cli::trace::{SilentSink, StderrSink};
use bist_core::TraceSink;

const USAGE_TEXT: &str = "\
Usage: bist-run <command> [options]

Commands:
  calibrate  Run one self-test and print the captured signature
  selftest   Calibrate (or take --golden), re-run, and report the verdict

Options:
  --threshold <cycles>  Idle cycles before a run may start (default 2)
  --golden <value>      Golden signature, hex or decimal (selftest only)
  --inject-fault        Corrupt responses during the run (selftest only)
  --max-cycles <n>      Cycle budget before giving up (default 10000)
  -v, --verbose         Stream trace events to stderr
  -h, --help            Show this help message

Examples:
  bist-run calibrate
  bist-run selftest
  bist-run selftest --golden 0xDEADBEEF --inject-fault
";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Calibrate(CalibrateArgs),
    Selftest(SelftestArgs),
}

#[derive(Debug, PartialEq, Eq)]
struct CalibrateArgs {
    options: ScenarioOptions,
    verbose: bool,
}

#[derive(Debug, PartialEq, Eq)]
struct SelftestArgs {
    options: SelftestOptions,
    verbose: bool,
}

#[derive(Debug)]
enum ParseResult {
    Command(Command),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let first = args.next().ok_or_else(|| "missing command".to_string())?;

    if first == "--help" || first == "-h" {
        return Ok(ParseResult::Help);
    }

    let command_str = first.to_string_lossy().to_string();

    match command_str.as_str() {
        "calibrate" => parse_calibrate_args(args)
            .map(Command::Calibrate)
            .map(ParseResult::Command),
        "selftest" => parse_selftest_args(args)
            .map(Command::Selftest)
            .map(ParseResult::Command),
        other => Err(format!("unknown command: {other}")),
    }
}

#[allow(clippy::while_let_on_iterator)]
fn parse_calibrate_args(mut args: impl Iterator<Item = OsString>) -> Result<CalibrateArgs, String> {
    let mut options = ScenarioOptions::default();
    let mut verbose = false;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg == "--verbose" || arg == "-v" {
            verbose = true;
            continue;
        }

        if arg == "--threshold" {
            options.idle_threshold = parse_u32(&take_value(&mut args, "--threshold")?)?;
            continue;
        }

        if arg == "--max-cycles" {
            options.max_cycles = u64::from(parse_u32(&take_value(&mut args, "--max-cycles")?)?);
            continue;
        }

        return Err(format!("unknown option: {}", arg.to_string_lossy()));
    }

    Ok(CalibrateArgs { options, verbose })
}

#[allow(clippy::while_let_on_iterator)]
fn parse_selftest_args(mut args: impl Iterator<Item = OsString>) -> Result<SelftestArgs, String> {
    let mut options = SelftestOptions::default();
    let mut verbose = false;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg == "--verbose" || arg == "-v" {
            verbose = true;
            continue;
        }

        if arg == "--threshold" {
            options.scenario.idle_threshold = parse_u32(&take_value(&mut args, "--threshold")?)?;
            continue;
        }

        if arg == "--max-cycles" {
            options.scenario.max_cycles =
                u64::from(parse_u32(&take_value(&mut args, "--max-cycles")?)?);
            continue;
        }

        if arg == "--golden" {
            options.golden = Some(parse_u32(&take_value(&mut args, "--golden")?)?);
            continue;
        }

        if arg == "--inject-fault" {
            options.inject_fault = true;
            continue;
        }

        return Err(format!("unknown option: {}", arg.to_string_lossy()));
    }

    Ok(SelftestArgs { options, verbose })
}

fn take_value(
    args: &mut impl Iterator<Item = OsString>,
    option: &str,
) -> Result<String, String> {
    args.next()
        .map(|value| value.to_string_lossy().to_string())
        .ok_or_else(|| format!("missing value for {option}"))
}

/// Accepts decimal or 0x-prefixed hex, with optional `_` separators.
fn parse_u32(text: &str) -> Result<u32, String> {
    let cleaned = text.trim().replace('_', "");
    let parsed = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
        .map_or_else(|| cleaned.parse(), |hex| u32::from_str_radix(hex, 16));
    parsed.map_err(|_| format!("invalid number: {text}"))
}

fn run_calibrate(args: &CalibrateArgs) -> Result<(), i32> {
    let mut stderr_sink = StderrSink;
    let mut silent_sink = SilentSink;
    let sink: &mut dyn TraceSink = if args.verbose {
        &mut stderr_sink
    } else {
        &mut silent_sink
    };

    match scenario::calibrate(args.options, sink) {
        Ok(calibration) => {
            println!(
                "Captured signature {:#010X} after {} cycles",
                calibration.signature, calibration.cycles
            );
            Ok(())
        }
        Err(error) => {
            eprintln!("error: {error}");
            Err(1)
        }
    }
}

fn run_selftest(args: &SelftestArgs) -> Result<(), i32> {
    let mut stderr_sink = StderrSink;
    let mut silent_sink = SilentSink;
    let sink: &mut dyn TraceSink = if args.verbose {
        &mut stderr_sink
    } else {
        &mut silent_sink
    };

    match scenario::selftest(args.options, sink) {
        Ok(verdict) if !verdict.failed => {
            println!(
                "PASS: captured {:#010X} matches golden {:#010X} ({} cycles)",
                verdict.captured, verdict.golden, verdict.cycles
            );
            Ok(())
        }
        Ok(verdict) => {
            println!(
                "FAIL: captured {:#010X} != golden {:#010X} ({} error pulse(s), {} cycles)",
                verdict.captured, verdict.golden, verdict.irq_pulses, verdict.cycles
            );
            Err(1)
        }
        Err(error) => {
            eprintln!("error: {error}");
            Err(1)
        }
    }
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Command(Command::Calibrate(args))) => match run_calibrate(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Ok(ParseResult::Command(Command::Selftest(args))) => match run_selftest(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            if error.starts_with("Usage:") {
                println!("{error}");
            } else {
                eprintln!("error: {error}");
                eprintln!("{USAGE_TEXT}");
            }
            1
        }
    };

    std::process::exit(exit_code);
}
