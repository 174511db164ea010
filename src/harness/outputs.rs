//! Output location policy
//!
//! Where each invocation writes its output:
//!
//! - [`OutputPolicy::Shared`]: every invocation against a target overwrites that target's own `output.csv`. The
//!   file only ever holds the most recent run, so the serial baseline has to be re-run before every comparison.
//! - [`OutputPolicy::Isolated`]: every invocation gets its own file in a scratch directory. The serial baseline is
//!   written once and stays valid for every comparison.
//!
//! Either way at most one invocation writes a given file at a time, and the comparator reads it before anything else
//! touches it. The harness is sequential, so that needs no locking; any concurrent re-architecture must keep
//! per-run paths or add mutual exclusion on the shared file.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

use parbench_core::ProcessCount;

use super::error::HarnessError;
use super::target::ExecutionTarget;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputPolicy {
    #[default]
    Shared,
    Isolated(ScratchDir),
}

impl OutputPolicy {
    /// Isolated outputs under `dir`, or under a fresh directory in the system temp dir.
    pub fn isolated(dir: Option<PathBuf>) -> Self {
        match dir {
            Some(path) => OutputPolicy::Isolated(ScratchDir::user(path)),
            None => OutputPolicy::Isolated(ScratchDir::generated()),
        }
    }

    pub fn is_isolated(&self) -> bool {
        matches!(self, OutputPolicy::Isolated(_))
    }

    /// Whether the serial baseline must be re-run before every comparison.
    pub fn reruns_serial_baseline(&self) -> bool {
        !self.is_isolated()
    }

    /// Create the scratch directory if needed. No-op for shared outputs.
    pub fn prepare(&self) -> Result<(), HarnessError> {
        match self {
            OutputPolicy::Shared => Ok(()),
            OutputPolicy::Isolated(scratch) => {
                fs::create_dir_all(&scratch.path).map_err(|e| HarnessError::io(&scratch.path, e))?;
                tracing::info!(dir = %scratch.path.display(), "writing invocation outputs to scratch directory");
                Ok(())
            }
        }
    }

    pub fn serial_output(&self, serial: &ExecutionTarget) -> PathBuf {
        match self {
            OutputPolicy::Shared => serial.output.clone(),
            OutputPolicy::Isolated(scratch) => scratch.path.join("serial-p1.csv"),
        }
    }

    pub fn parallel_output(&self, parallel: &ExecutionTarget, p: ProcessCount) -> PathBuf {
        match self {
            OutputPolicy::Shared => parallel.output.clone(),
            OutputPolicy::Isolated(scratch) => scratch.path.join(format!("parallel-p{p}.csv")),
        }
    }

    /// Output path for timing run `run` (zero-based) at `p` processes.
    pub fn benchmark_output(&self, parallel: &ExecutionTarget, p: ProcessCount, run: u32) -> PathBuf {
        match self {
            OutputPolicy::Shared => parallel.output.clone(),
            OutputPolicy::Isolated(scratch) => scratch.path.join(format!("bench-p{p}-r{run}.csv")),
        }
    }

    /// Drop a timing-run output once it is no longer needed. Shared outputs are left alone.
    pub fn discard_benchmark_output(&self, path: &Path) {
        if self.is_isolated() {
            if let Err(e) = fs::remove_file(path) {
                tracing::debug!(path = %path.display(), error = %e, "could not remove benchmark output");
            }
        }
    }

    /// Remove a generated scratch directory after a successful run. User-supplied directories are kept.
    pub fn cleanup(&self) {
        if let OutputPolicy::Isolated(scratch) = self {
            if scratch.generated {
                if let Err(e) = fs::remove_dir_all(&scratch.path) {
                    tracing::warn!(dir = %scratch.path.display(), error = %e, "could not remove scratch directory");
                }
            }
        }
    }
}

/// Directory holding per-invocation outputs in isolated mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchDir {
    pub path: PathBuf,
    /// Created by the harness (removed on success) rather than supplied by the user (always kept).
    pub generated: bool,
}

impl ScratchDir {
    pub fn user(path: PathBuf) -> Self {
        Self { path, generated: false }
    }

    pub fn generated() -> Self {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        Self {
            path: env::temp_dir().join(format!("parbench_{}_{}", process::id(), stamp)),
            generated: true,
        }
    }
}
