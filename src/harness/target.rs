//! Execution target descriptor
//!
//! An [`ExecutionTarget`] is a filesystem root resolved against a [`TargetLayout`] into four concrete paths. The
//! harness never builds these paths by string concatenation at call sites; everything goes through the descriptor.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use parbench_core::{ProcessCount, TargetLayout};

use super::error::HarnessError;

/// A runnable program rooted at a directory with a fixed layout.
///
/// Identity is the root path. The harness treats everything here as read-only except `output`, which every
/// invocation against the target overwrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionTarget {
    pub root: PathBuf,
    pub launcher: PathBuf,
    pub build_artifact: PathBuf,
    pub input_dataset: PathBuf,
    pub output: PathBuf,
}

impl ExecutionTarget {
    /// Resolve a root against the standard layout.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self::with_layout(root, TargetLayout::STANDARD)
    }

    pub fn with_layout(root: impl AsRef<Path>, layout: TargetLayout) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            launcher: root.join(layout.launcher),
            build_artifact: root.join(layout.build_artifact),
            input_dataset: root.join(layout.input_dataset),
            output: root.join(layout.output),
            root,
        }
    }

    /// Check that the root is an existing directory and exposes its launcher.
    ///
    /// `role` names the target in error messages ("serial", "parallel").
    pub fn validate(&self, role: &str) -> Result<(), HarnessError> {
        if !self.root.exists() {
            return Err(HarnessError::InvalidConfiguration(format!(
                "the {role} target root '{}' does not exist",
                self.root.display()
            )));
        }
        if !self.root.is_dir() {
            return Err(HarnessError::InvalidConfiguration(format!(
                "the {role} target root '{}' is not a directory",
                self.root.display()
            )));
        }
        if !self.launcher.is_file() {
            return Err(HarnessError::InvalidConfiguration(format!(
                "the {role} target has no launcher at '{}'",
                self.launcher.display()
            )));
        }
        Ok(())
    }
}

/// One invocation of a target: which program, how many processes, and where its output goes.
///
/// In shared-output mode `output` is the target's own output location; in isolated mode it is a per-run scratch
/// path.
#[derive(Debug, Clone, Copy)]
pub struct InvocationRequest<'a> {
    pub target: &'a ExecutionTarget,
    pub process_count: ProcessCount,
    pub output: &'a Path,
}

impl<'a> InvocationRequest<'a> {
    /// Request that writes to the target's own output location.
    pub fn new(target: &'a ExecutionTarget, process_count: ProcessCount) -> Self {
        Self {
            target,
            process_count,
            output: &target.output,
        }
    }

    /// Redirect the invocation's output to another path.
    pub fn with_output(mut self, output: &'a Path) -> Self {
        self.output = output;
        self
    }

    /// Positional launcher arguments, in the only order the launcher understands:
    /// build artifact, input dataset, output location, process count.
    pub fn launcher_args(&self) -> [OsString; 4] {
        [
            self.target.build_artifact.clone().into_os_string(),
            self.target.input_dataset.clone().into_os_string(),
            self.output.as_os_str().to_os_string(),
            OsString::from(self.process_count.to_string()),
        ]
    }
}
