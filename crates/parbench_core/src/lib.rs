//! Provide the shared, pure vocabulary of the parbench harness.
//!
//! This crate is intentionally small and dependency-free. It holds the value types that flow between the harness
//! phases and the deterministic helpers that operate on them:
//! - the fixed on-disk layout every execution target must satisfy,
//! - process counts, benchmark samples, and the scaling summary derived from them,
//! - the short-circuiting line comparison that backs the correctness oracle.
//!
//! ## Notes
//!
//! - This is a “semantic core” crate: **no IO**, no global state, no process handling. Anything that touches the
//!   filesystem or spawns children lives in the `parbench` crate.

pub mod compare;
pub mod layout;
pub mod sample;

use std::fmt;
use std::num::NonZeroU32;

pub use compare::{ComparisonOutcome, Divergence, compare_lines};
pub use layout::TargetLayout;
pub use sample::{BenchmarkSample, ScalingPoint, ScalingSummary, mean_duration};

/// Represent the degree of worker parallelism requested of the program under test.
///
/// Always positive. The serial baseline always runs at [`ProcessCount::ONE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessCount(NonZeroU32);

impl ProcessCount {
    /// The degenerate single-worker count used for the serial baseline.
    pub const ONE: ProcessCount = ProcessCount(NonZeroU32::MIN);

    /// Create a process count, rejecting zero.
    ///
    /// ## Returns
    /// - `Some(ProcessCount)` for any `n >= 1`, `None` for `0`.
    pub fn new(n: u32) -> Option<Self> {
        NonZeroU32::new(n).map(ProcessCount)
    }

    /// Return the raw count.
    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Iterate `1..=self` in ascending order.
    ///
    /// ## Examples
    /// ```rust
    /// use parbench_core::ProcessCount;
    ///
    /// let max = ProcessCount::new(3).unwrap();
    /// let counts: Vec<u32> = max.ascending_from_one().map(ProcessCount::get).collect();
    /// assert_eq!(counts, vec![1, 2, 3]);
    /// ```
    pub fn ascending_from_one(self) -> impl DoubleEndedIterator<Item = ProcessCount> {
        (1..=self.get()).filter_map(ProcessCount::new)
    }
}

impl fmt::Display for ProcessCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<ProcessCount> for u32 {
    fn from(p: ProcessCount) -> u32 {
        p.get()
    }
}
