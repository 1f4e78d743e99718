//! Flag parser for the simulator binary.
//!
//! Hand-rolled (no clap dependency) to keep the binary small and boot fast.
//!
//! # Grammar
//!
//! ```text
//! schedsim [--cpus N] [--algo fcfs|spn|hrrn|rr|rr1|rr4|srt] [--quantum N]
//!          [--interval N] [--input FILE] [--output FILE]
//!          [--proc-stats FILE] [--stats-json FILE] [--log LEVEL]
//! schedsim --help | -h
//! ```
//!
//! Usage errors (unknown flag, missing value) exit with code 2; invalid
//! values (unknown algorithm, zero cpus) are configuration errors and exit
//! with code 1 from `main`.

use std::env;
use std::path::PathBuf;
use std::process;

use crate::config::{LogLevel, SimConfig};
use crate::error::SimError;

/// Everything the binary needs for one run.
#[derive(Clone, Debug, PartialEq)]
pub struct CliOptions {
    pub config: SimConfig,
    pub log: LogLevel,
    /// Workload file; stdin when absent.
    pub input: Option<PathBuf>,
    pub output: PathBuf,
    pub proc_stats: PathBuf,
    /// Optional machine-readable run summary.
    pub stats_json: Option<PathBuf>,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            config: SimConfig::default(),
            log: LogLevel::Debug,
            input: None,
            output: PathBuf::from("result.txt"),
            proc_stats: PathBuf::from("procStats.txt"),
            stats_json: None,
        }
    }
}

/// Outcome of parsing an argument list.
#[derive(Clone, Debug, PartialEq)]
pub enum CliOutcome {
    Run(Box<CliOptions>),
    Help,
}

/// Errors from argument parsing, split by exit code.
#[derive(Debug)]
pub enum CliError {
    /// Unknown flag or missing value: print usage, exit 2.
    Usage(String),
    /// A flag value failed validation: exit 1.
    Invalid(SimError),
}

/// Parse `std::env::args()` or exit.
///
/// Exits 0 after printing usage for `--help`, 2 with a diagnostic on usage
/// errors, 1 on invalid flag values.
pub fn parse_args() -> CliOptions {
    match parse_from(env::args().skip(1)) {
        Ok(CliOutcome::Run(opts)) => *opts,
        Ok(CliOutcome::Help) => {
            print!("{}", usage());
            process::exit(0);
        }
        Err(CliError::Usage(message)) => {
            eprintln!("error: {message}");
            eprintln!();
            eprint!("{}", usage());
            process::exit(2);
        }
        Err(CliError::Invalid(err)) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    }
}

/// Parse an argument list. Pure; used directly by tests.
pub fn parse_from<I>(args: I) -> Result<CliOutcome, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut opts = CliOptions::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let mut value_for = |flag: &str| {
            args.next()
                .ok_or_else(|| CliError::Usage(format!("missing value for {flag}")))
        };

        match arg.as_str() {
            "--help" | "-h" => return Ok(CliOutcome::Help),
            "--cpus" => {
                opts.config.cpus = parse_number(&arg, &value_for("--cpus")?)?;
            }
            "--algo" => {
                opts.config.algo = value_for("--algo")?.parse().map_err(CliError::Invalid)?;
            }
            "--quantum" => {
                opts.config.quantum = parse_number(&arg, &value_for("--quantum")?)?;
            }
            "--interval" => {
                opts.config.interval = parse_number(&arg, &value_for("--interval")?)?;
            }
            "--input" => opts.input = Some(PathBuf::from(value_for("--input")?)),
            "--output" => opts.output = PathBuf::from(value_for("--output")?),
            "--proc-stats" => opts.proc_stats = PathBuf::from(value_for("--proc-stats")?),
            "--stats-json" => opts.stats_json = Some(PathBuf::from(value_for("--stats-json")?)),
            "--log" => {
                opts.log = value_for("--log")?.parse().map_err(CliError::Invalid)?;
            }
            other => return Err(CliError::Usage(format!("unknown flag `{other}`"))),
        }
    }

    Ok(CliOutcome::Run(Box::new(opts)))
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| {
        CliError::Invalid(SimError::Config(format!(
            "{flag} expects a non-negative integer, got `{value}`"
        )))
    })
}

fn usage() -> String {
    let d = CliOptions::default();
    format!(
        "usage: schedsim [FLAGS]\n\
         \n\
         Simulate a batch of processes on a CPU pool and two I/O devices.\n\
         Reads the workload from --input (or stdin): one process per line,\n\
         semicolon-separated task literals like CPU(5);IO1(2);CPU(1).\n\
         \n\
         flags:\n\
         \x20 --cpus N           CPU pool size (default {})\n\
         \x20 --algo NAME        fcfs|spn|hrrn|rr|rr1|rr4|srt (default {})\n\
         \x20 --quantum N        round-robin quantum for --algo rr (default {})\n\
         \x20 --interval N       arrival spacing in ticks (default {})\n\
         \x20 --input FILE       workload file (default: stdin)\n\
         \x20 --output FILE      per-tick snapshot report (default {})\n\
         \x20 --proc-stats FILE  per-process statistics (default {})\n\
         \x20 --stats-json FILE  machine-readable run summary (optional)\n\
         \x20 --log LEVEL        debug|info|warn|error (default debug)\n\
         \x20 --help, -h         show this help\n",
        d.config.cpus,
        d.config.algo.as_str(),
        d.config.quantum,
        d.config.interval,
        d.output.display(),
        d.proc_stats.display(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Algo;

    fn parse(args: &[&str]) -> Result<CliOutcome, CliError> {
        parse_from(args.iter().map(|s| s.to_string()))
    }

    fn options(args: &[&str]) -> CliOptions {
        match parse(args).unwrap() {
            CliOutcome::Run(opts) => *opts,
            CliOutcome::Help => panic!("expected options"),
        }
    }

    #[test]
    fn default_flag_values() {
        let opts = options(&[]);
        assert_eq!(opts.config.cpus, 4);
        assert_eq!(opts.config.algo, Algo::Fcfs);
        assert_eq!(opts.config.quantum, 4);
        assert_eq!(opts.config.interval, 2);
        assert_eq!(opts.output, PathBuf::from("result.txt"));
        assert_eq!(opts.proc_stats, PathBuf::from("procStats.txt"));
        assert_eq!(opts.input, None);
        assert_eq!(opts.stats_json, None);
    }

    #[test]
    fn parses_all_flags() {
        let opts = options(&[
            "--cpus", "2", "--algo", "srt", "--quantum", "3", "--interval", "0", "--input",
            "procs.txt", "--output", "snap.txt", "--proc-stats", "stats.txt", "--stats-json",
            "run.json", "--log", "warn",
        ]);
        assert_eq!(opts.config.cpus, 2);
        assert_eq!(opts.config.algo, Algo::Srt);
        assert_eq!(opts.config.quantum, 3);
        assert_eq!(opts.config.interval, 0);
        assert_eq!(opts.input, Some(PathBuf::from("procs.txt")));
        assert_eq!(opts.stats_json, Some(PathBuf::from("run.json")));
        assert_eq!(opts.log, LogLevel::Warn);
    }

    #[test]
    fn help_wins() {
        assert_eq!(parse(&["--help"]).unwrap(), CliOutcome::Help);
        assert_eq!(parse(&["-h"]).unwrap(), CliOutcome::Help);
    }

    #[test]
    fn unknown_flag_is_a_usage_error() {
        assert!(matches!(
            parse(&["--cores", "4"]),
            Err(CliError::Usage(_))
        ));
    }

    #[test]
    fn missing_value_is_a_usage_error() {
        assert!(matches!(parse(&["--cpus"]), Err(CliError::Usage(_))));
    }

    #[test]
    fn bad_values_are_config_errors() {
        assert!(matches!(
            parse(&["--algo", "mlfq"]),
            Err(CliError::Invalid(SimError::Config(_)))
        ));
        assert!(matches!(
            parse(&["--cpus", "many"]),
            Err(CliError::Invalid(SimError::Config(_)))
        ));
    }
}
