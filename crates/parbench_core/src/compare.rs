//! Define line-sequence equality between two program outputs.
//!
//! Two outputs are the same result when they have the same number of lines and every pair of corresponding lines is
//! byte-identical. Nothing is parsed: a CSV with reordered columns is a different output.
//!
//! ## Notes
//! - Comparison is lazy. Both sides are pulled one line at a time and the walk stops at the first mismatch, so the
//!   cost is proportional to the position of the divergence rather than to the file size.
//! - Only the first divergence is reported. There is no diff.

use std::fmt;

/// Describe the first point at which two line sequences differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divergence {
    /// Zero-based index of the first differing line.
    pub line_index: usize,
    /// Line from the left (reference) side, `None` if the left side ended first.
    pub left: Option<String>,
    /// Line from the right (candidate) side, `None` if the right side ended first.
    pub right: Option<String>,
}

impl Divergence {
    /// One-based line number, for messages aimed at humans.
    pub fn line_number(&self) -> usize {
        self.line_index + 1
    }
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn side(line: &Option<String>) -> String {
            match line {
                Some(text) => format!("{text:?}"),
                None => "<end of file>".to_string(),
            }
        }
        write!(
            f,
            "line {}: expected {}, found {}",
            self.line_number(),
            side(&self.left),
            side(&self.right)
        )
    }
}

/// Result of comparing two line sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparisonOutcome {
    Equal,
    Diverged(Divergence),
}

impl ComparisonOutcome {
    pub fn is_equal(&self) -> bool {
        matches!(self, ComparisonOutcome::Equal)
    }

    /// Return the divergence, if any.
    pub fn divergence(&self) -> Option<&Divergence> {
        match self {
            ComparisonOutcome::Equal => None,
            ComparisonOutcome::Diverged(d) => Some(d),
        }
    }
}

/// Compare two fallible line sources in document order, stopping at the first difference.
///
/// Lines are compared as raw bytes; they are only decoded (lossily) to build the divergence report.
///
/// ## Parameters
/// - `left`: reference lines (the serial baseline).
/// - `right`: candidate lines (the parallel run).
///
/// ## Returns
/// - `Ok(ComparisonOutcome::Equal)` if both sources yield the same lines and end together.
/// - `Ok(ComparisonOutcome::Diverged(..))` at the first mismatching line or length difference.
/// - `Err(e)` if either source fails before a verdict is reached.
///
/// ## Examples
/// ```rust
/// use parbench_core::compare::{ComparisonOutcome, compare_lines};
///
/// let serial = ["a", "b", "c"].map(|s| Ok::<_, ()>(s.to_string()));
/// let parallel = ["a", "B", "c"].map(|s| Ok::<_, ()>(s.to_string()));
/// let outcome = compare_lines(serial, parallel).unwrap();
/// assert_eq!(outcome.divergence().map(|d| d.line_index), Some(1));
/// ```
pub fn compare_lines<T, L, R, E>(left: L, right: R) -> Result<ComparisonOutcome, E>
where
    T: AsRef<[u8]>,
    L: IntoIterator<Item = Result<T, E>>,
    R: IntoIterator<Item = Result<T, E>>,
{
    let mut left = left.into_iter();
    let mut right = right.into_iter();
    let mut line_index = 0usize;

    loop {
        let l = left.next().transpose()?;
        let r = right.next().transpose()?;

        match (l, r) {
            (None, None) => return Ok(ComparisonOutcome::Equal),
            (Some(a), Some(b)) if a.as_ref() == b.as_ref() => {}
            (l, r) => {
                return Ok(ComparisonOutcome::Diverged(Divergence {
                    line_index,
                    left: l.map(|line| lossy(line.as_ref())),
                    right: r.map(|line| lossy(line.as_ref())),
                }));
            }
        }

        line_index += 1;
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
