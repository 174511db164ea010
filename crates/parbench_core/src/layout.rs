//! Define the fixed on-disk layout of an execution target.
//!
//! Every target root (serial or parallel) is expected to expose the same four elements at the same relative paths.
//! The launcher is invoked as:
//!
//! ```text
//! <root>/scripts/launch.sh <root>/build/main <root>/data/molecules.smi <output> <process count>
//! ```
//!
//! ## Notes
//! - The layout is a value, not a set of string constants sprinkled across call sites, so a target whose layout
//!   drifts can be described explicitly instead of silently misbehaving.

/// Relative path of the launcher entrypoint.
pub const LAUNCHER: &str = "scripts/launch.sh";
/// Relative path of the build artifact passed to the launcher.
pub const BUILD_ARTIFACT: &str = "build/main";
/// Relative path of the input dataset passed to the launcher.
pub const INPUT_DATASET: &str = "data/molecules.smi";
/// Relative path of the mutable output location.
pub const OUTPUT: &str = "output.csv";

/// Describe the four relative paths a target root must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetLayout {
    pub launcher: &'static str,
    pub build_artifact: &'static str,
    pub input_dataset: &'static str,
    pub output: &'static str,
}

impl TargetLayout {
    /// The layout shared by every serial and parallel target.
    pub const STANDARD: TargetLayout = TargetLayout {
        launcher: LAUNCHER,
        build_artifact: BUILD_ARTIFACT,
        input_dataset: INPUT_DATASET,
        output: OUTPUT,
    };
}

impl Default for TargetLayout {
    fn default() -> Self {
        Self::STANDARD
    }
}
