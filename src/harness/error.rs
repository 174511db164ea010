//! Harness error taxonomy
//!
//! Every variant is fatal. Nothing in the harness catches and recovers from a `HarnessError`; it is propagated
//! with `?` to the top-level command, reported once, and turned into a non-zero exit code.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use miette::Diagnostic;
use parbench_core::{Divergence, ProcessCount};
use thiserror::Error;

/// Errors that abort a harness run.
#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    /// Bad roots or counts, detected before any external program runs.
    #[error("invalid configuration: {0}")]
    #[diagnostic(
        code(parbench::config),
        help("usage: parbench <SERIAL_ROOT> <PARALLEL_ROOT> <MAX_PROCESSES>")
    )]
    InvalidConfiguration(String),

    /// The launcher could not be started at all (missing, not executable, ...).
    #[error("failed to start {}: {source}", .launcher.display())]
    #[diagnostic(
        code(parbench::process),
        help("the launcher must exist and be executable")
    )]
    Spawn {
        launcher: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The launcher ran but did not exit successfully.
    #[error(
        "external program at {} failed with {} ({} process(es))",
        .target.display(),
        describe_exit(.code),
        .process_count
    )]
    #[diagnostic(
        code(parbench::process),
        help("re-run the launcher by hand to see its output; the harness discards it")
    )]
    ExternalProcessFailure {
        target: PathBuf,
        process_count: ProcessCount,
        /// Exit code, `None` when the process was terminated by a signal.
        code: Option<i32>,
    },

    /// The launcher exceeded the configured bounded wait and was killed.
    #[error(
        "external program at {} did not finish within {:.1}s ({} process(es))",
        .target.display(),
        .limit.as_secs_f64(),
        .process_count
    )]
    #[diagnostic(code(parbench::timeout))]
    Timeout {
        target: PathBuf,
        process_count: ProcessCount,
        limit: Duration,
    },

    /// Serial and parallel outputs are not line-for-line identical.
    #[error(
        "parallel output differs from the serial output at {} process(es): {divergence}",
        .process_count
    )]
    #[diagnostic(
        code(parbench::divergence),
        help("both output files are left in place for inspection")
    )]
    OutputDivergence {
        process_count: ProcessCount,
        serial_output: PathBuf,
        parallel_output: PathBuf,
        divergence: Divergence,
    },

    /// A file the harness needs (an output to compare, a scratch directory) could not be accessed.
    #[error("I/O error on {}: {source}", .path.display())]
    #[diagnostic(code(parbench::io))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl HarnessError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        HarnessError::Io {
            path: path.into(),
            source,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match *code {
        Some(code) => format!("exit status {code}"),
        None => "termination by signal".to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_external_failure_message() {
        let err = HarnessError::ExternalProcessFailure {
            target: PathBuf::from("/opt/serial"),
            process_count: ProcessCount::ONE,
            code: Some(1),
        };
        assert_eq!(
            err.to_string(),
            "external program at /opt/serial failed with exit status 1 (1 process(es))"
        );
    }

    #[test]
    fn test_signal_termination_message() {
        let err = HarnessError::ExternalProcessFailure {
            target: PathBuf::from("/opt/parallel"),
            process_count: ProcessCount::new(4).unwrap(),
            code: None,
        };
        assert!(err.to_string().contains("termination by signal"));
    }

    #[test]
    fn test_divergence_message_carries_context() {
        let err = HarnessError::OutputDivergence {
            process_count: ProcessCount::new(2).unwrap(),
            serial_output: PathBuf::from("s/output.csv"),
            parallel_output: PathBuf::from("p/output.csv"),
            divergence: Divergence {
                line_index: 1,
                left: Some("b".to_string()),
                right: Some("B".to_string()),
            },
        };
        assert_eq!(
            err.to_string(),
            "parallel output differs from the serial output at 2 process(es): line 2: expected \"b\", found \"B\""
        );
    }

    #[test]
    fn test_diagnostic_codes() {
        let err = HarnessError::InvalidConfiguration("x".to_string());
        assert_eq!(err.code().unwrap().to_string(), "parbench::config");
        let err = HarnessError::io("out.csv", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(err.code().unwrap().to_string(), "parbench::io");
    }
}
