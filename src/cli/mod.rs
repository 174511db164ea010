//! CLI module for the parbench harness
//!
//! This module provides the command-line interface:
//!
//! ```text
//! parbench <SERIAL_ROOT> <PARALLEL_ROOT> <MAX_PROCESSES> [OPTIONS]
//! ```
//!
//! ## Modules
//!
//! - `commands` - Command implementations
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.
//!
//! ## Exit codes
//!
//! - `0` - verified and measured
//! - `1` - an external program failed, timed out, or a file could not be accessed
//! - `2` - invalid configuration (including malformed arguments)
//! - `3` - parallel output diverged from the serial output

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};

use crate::harness::{HarnessConfig, RenderFormat, RenderOptions};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
    pub const INVALID_CONFIGURATION: ExitCode = ExitCode(2);
    pub const OUTPUT_DIVERGENCE: ExitCode = ExitCode(3);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Verify a parallel program against its serial version, then measure how it scales
#[derive(Parser, Debug)]
#[command(name = "parbench")]
#[command(version = VERSION)]
#[command(about = "Verify a parallel program against its serial version, then measure how it scales")]
#[command(long_about = None)]
pub struct Cli {
    /// Root of the serial program (reference output)
    #[arg(value_name = "SERIAL_ROOT")]
    pub serial_root: PathBuf,

    /// Root of the parallel program under test
    #[arg(value_name = "PARALLEL_ROOT")]
    pub parallel_root: PathBuf,

    /// Largest process count; counts 1..=MAX_PROCESSES are verified and measured
    #[arg(value_name = "MAX_PROCESSES")]
    pub max_processes: u32,

    /// Timing runs per process count; the reported time is their mean
    #[arg(long = "repeat", value_name = "N", default_value_t = 1, env = "PARBENCH_REPEAT")]
    pub repeat: u32,

    /// Kill an invocation that runs longer than this many seconds
    #[arg(long = "timeout", value_name = "SECS", env = "PARBENCH_TIMEOUT")]
    pub timeout: Option<f64>,

    /// Write every invocation's output to its own scratch file
    #[arg(long = "isolate-outputs")]
    pub isolate_outputs: bool,

    /// Scratch directory for isolated outputs (default: a fresh temp directory)
    #[arg(long = "scratch-dir", value_name = "DIR", requires = "isolate_outputs")]
    pub scratch_dir: Option<PathBuf>,

    /// Report format
    #[arg(long = "format", value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Print only the table, without the chart (text format)
    #[arg(long = "no-plot")]
    pub no_plot: bool,

    /// Chart width in columns
    #[arg(long = "width", value_name = "COLS", default_value_t = 60)]
    pub width: usize,

    /// Chart height in rows
    #[arg(long = "height", value_name = "ROWS", default_value_t = 16)]
    pub height: usize,

    /// Report every verified process count
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Csv,
}

impl From<Format> for RenderFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => RenderFormat::Text,
            Format::Json => RenderFormat::Json,
            Format::Csv => RenderFormat::Csv,
        }
    }
}

impl Cli {
    /// Harness configuration described by the arguments.
    pub fn harness_config(&self) -> CliResult<HarnessConfig> {
        let timeout = match self.timeout {
            None => None,
            Some(secs) => Some(std::time::Duration::try_from_secs_f64(secs).map_err(|_| {
                CliError::new(
                    format!("invalid configuration: --timeout must be a finite, non-negative number, got {secs}"),
                    ExitCode::INVALID_CONFIGURATION,
                )
            })?),
        };
        Ok(HarnessConfig::new(&self.serial_root, &self.parallel_root, self.max_processes)
            .with_repetitions(self.repeat)
            .with_timeout(timeout)
            .with_isolated_outputs(self.isolate_outputs)
            .with_scratch_dir(self.scratch_dir.clone()))
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::new()
            .with_format(self.format.into())
            .with_size(self.width, self.height)
            .with_plot(!self.no_plot)
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                ExitCode::INVALID_CONFIGURATION
            } else {
                ExitCode::SUCCESS
            };
            let _ = e.print();
            process::exit(code.0);
        }
    };

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    let config = cli.harness_config()?;
    let color = std::io::stderr().is_terminal();
    commands::run_benchmark(&config, &cli.render_options(), cli.verbose, color)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cli_parse_positionals() {
        let cli = Cli::try_parse_from(["parbench", "serial", "parallel", "4"]).unwrap();
        assert_eq!(cli.serial_root, PathBuf::from("serial"));
        assert_eq!(cli.parallel_root, PathBuf::from("parallel"));
        assert_eq!(cli.max_processes, 4);
        assert_eq!(cli.format, Format::Text);
        assert!(!cli.isolate_outputs);
    }

    #[test]
    fn test_cli_rejects_wrong_argument_count() {
        assert!(Cli::try_parse_from(["parbench", "serial", "parallel"]).is_err());
        assert!(Cli::try_parse_from(["parbench", "a", "b", "4", "extra"]).is_err());
    }

    #[test]
    fn test_cli_rejects_non_numeric_count() {
        assert!(Cli::try_parse_from(["parbench", "serial", "parallel", "four"]).is_err());
        assert!(Cli::try_parse_from(["parbench", "serial", "parallel", "-1"]).is_err());
    }

    #[test]
    fn test_cli_parse_options() {
        let cli = Cli::try_parse_from([
            "parbench",
            "s",
            "p",
            "8",
            "--repeat",
            "3",
            "--timeout",
            "2.5",
            "--isolate-outputs",
            "--scratch-dir",
            "/tmp/runs",
            "--format",
            "json",
        ])
        .unwrap();
        let config = cli.harness_config().unwrap();
        assert_eq!(config.repetitions, 3);
        assert_eq!(config.timeout, Some(Duration::from_millis(2_500)));
        assert!(config.isolate_outputs);
        assert_eq!(config.scratch_dir, Some(PathBuf::from("/tmp/runs")));
        assert_eq!(cli.render_options().format, RenderFormat::Json);
    }

    #[test]
    fn test_cli_scratch_dir_requires_isolation() {
        assert!(Cli::try_parse_from(["parbench", "s", "p", "2", "--scratch-dir", "/tmp/x"]).is_err());
    }

    #[test]
    fn test_cli_negative_timeout_is_invalid_configuration() {
        let cli = Cli::try_parse_from(["parbench", "s", "p", "2", "--timeout=-1"]).unwrap();
        let err = cli.harness_config().unwrap_err();
        assert_eq!(err.exit_code, ExitCode::INVALID_CONFIGURATION);
    }

    #[test]
    fn test_cli_no_plot_and_size() {
        let cli = Cli::try_parse_from(["parbench", "s", "p", "2", "--no-plot", "--width", "30", "--height", "5"])
            .unwrap();
        let options = cli.render_options();
        assert!(!options.plot);
        assert_eq!((options.width, options.height), (30, 5));
    }
}
