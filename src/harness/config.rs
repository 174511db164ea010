//! Harness configuration
//!
//! [`HarnessConfig`] is what the user asked for; [`HarnessConfig::validate`] checks it against the filesystem and
//! turns it into a [`RunPlan`], the fully resolved description of a run. Nothing external is invoked before a plan
//! exists.

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use parbench_core::{ProcessCount, TargetLayout};

use super::error::HarnessError;
use super::outputs::OutputPolicy;
use super::target::ExecutionTarget;

/// Largest accepted process count. The counts `1..=max` are materialized up front.
pub const MAX_PROCESS_COUNT: u32 = 1 << 16;

/// Configuration for one harness run.
///
/// Built with [`HarnessConfig::new`] and the `with_*` methods; all optional settings default to the plain
/// single-shot, shared-output behavior.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub serial_root: PathBuf,
    pub parallel_root: PathBuf,
    /// Largest process count to verify and measure. Counts run `1..=max_processes`.
    pub max_processes: u32,
    /// Timing runs per process count (default: 1).
    pub repetitions: u32,
    /// Bounded wait per invocation (default: none).
    pub timeout: Option<Duration>,
    /// Write every invocation's output to its own scratch file (default: false).
    pub isolate_outputs: bool,
    /// Scratch directory for isolated outputs; implies `isolate_outputs`.
    pub scratch_dir: Option<PathBuf>,
    pub layout: TargetLayout,
}

impl HarnessConfig {
    pub fn new(serial_root: impl Into<PathBuf>, parallel_root: impl Into<PathBuf>, max_processes: u32) -> Self {
        Self {
            serial_root: serial_root.into(),
            parallel_root: parallel_root.into(),
            max_processes,
            repetitions: 1,
            timeout: None,
            isolate_outputs: false,
            scratch_dir: None,
            layout: TargetLayout::STANDARD,
        }
    }

    pub fn with_repetitions(mut self, repetitions: u32) -> Self {
        self.repetitions = repetitions;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_isolated_outputs(mut self, isolate: bool) -> Self {
        self.isolate_outputs = isolate;
        self
    }

    pub fn with_scratch_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.scratch_dir = dir;
        self
    }

    pub fn with_layout(mut self, layout: TargetLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Check the configuration and resolve it into a plan.
    ///
    /// ## Errors
    ///
    /// [`HarnessError::InvalidConfiguration`] when a root does not exist, is not a directory or has no launcher, when
    /// `max_processes` is zero or above [`MAX_PROCESS_COUNT`], when `repetitions` or the timeout is zero, or when
    /// both roots are the same directory with shared outputs.
    pub fn validate(&self) -> Result<RunPlan, HarnessError> {
        let max = ProcessCount::new(self.max_processes).ok_or_else(|| {
            HarnessError::InvalidConfiguration("the maximum process count must be at least 1".to_string())
        })?;
        if self.max_processes > MAX_PROCESS_COUNT {
            return Err(HarnessError::InvalidConfiguration(format!(
                "the maximum process count must be at most {MAX_PROCESS_COUNT}, got {}",
                self.max_processes
            )));
        }
        let repetitions = NonZeroU32::new(self.repetitions).ok_or_else(|| {
            HarnessError::InvalidConfiguration("the repetition count must be at least 1".to_string())
        })?;
        if self.timeout == Some(Duration::ZERO) {
            return Err(HarnessError::InvalidConfiguration(
                "the timeout must be greater than zero".to_string(),
            ));
        }

        let serial = ExecutionTarget::with_layout(&self.serial_root, self.layout);
        let parallel = ExecutionTarget::with_layout(&self.parallel_root, self.layout);
        serial.validate("serial")?;
        parallel.validate("parallel")?;

        let outputs = if self.isolate_outputs || self.scratch_dir.is_some() {
            OutputPolicy::isolated(self.scratch_dir.clone())
        } else {
            OutputPolicy::Shared
        };

        if !outputs.is_isolated() && same_location(&serial.root, &parallel.root) {
            return Err(HarnessError::InvalidConfiguration(format!(
                "the serial and parallel roots are the same directory '{}'; with shared outputs both runs write the \
                 same output file, so the comparison would always pass (use --isolate-outputs)",
                serial.root.display()
            )));
        }
        warn_on_oversubscription(max);

        Ok(RunPlan {
            serial,
            parallel,
            process_counts: max.ascending_from_one().collect(),
            repetitions,
            timeout: self.timeout,
            outputs,
        })
    }
}

/// A validated, fully resolved run.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub serial: ExecutionTarget,
    pub parallel: ExecutionTarget,
    /// `1..=max`, ascending.
    pub process_counts: Vec<ProcessCount>,
    pub repetitions: NonZeroU32,
    pub timeout: Option<Duration>,
    pub outputs: OutputPolicy,
}

fn warn_on_oversubscription(max: ProcessCount) {
    if let Ok(available) = thread::available_parallelism() {
        if max.get() as usize > available.get() {
            tracing::warn!(
                requested = max.get(),
                available = available.get(),
                "more processes requested than available cores; timings past that point measure oversubscription"
            );
        }
    }
}

fn same_location(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
