//! Output file comparison
//!
//! Streams two files line by line into [`parbench_core::compare_lines`]. Neither file is loaded whole; reading stops
//! at the first divergence.
//!
//! Equality matches `diff`: lines are compared byte for byte, so `\r\n` and `\n` endings differ, and a last line
//! without a terminating newline differs from the same line with one.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use parbench_core::{ComparisonOutcome, Divergence, compare_lines};

use super::error::HarnessError;

/// Appended to an unterminated last line in divergence reports.
const NO_NEWLINE_AT_EOF: &str = " (no newline at end of file)";

/// Compare two files as ordered sequences of lines.
#[tracing::instrument(skip_all, fields(left = %left.display(), right = %right.display()))]
pub fn compare_files(left: &Path, right: &Path) -> Result<ComparisonOutcome, HarnessError> {
    let left_lines = LineReader::open(left)?;
    let right_lines = LineReader::open(right)?;
    Ok(match compare_lines(left_lines, right_lines)? {
        ComparisonOutcome::Diverged(d) => ComparisonOutcome::Diverged(Divergence {
            line_index: d.line_index,
            left: d.left.map(display_line),
            right: d.right.map(display_line),
        }),
        equal => equal,
    })
}

/// Drop the `\n` terminator for display, or mark its absence.
fn display_line(mut raw: String) -> String {
    if raw.ends_with('\n') {
        raw.pop();
    } else {
        raw.push_str(NO_NEWLINE_AT_EOF);
    }
    raw
}

/// Byte-oriented line iterator that tags read errors with the file path.
///
/// Lines keep their `\n` terminator so an unterminated last line compares unequal to a terminated one.
struct LineReader<'a> {
    path: &'a Path,
    reader: BufReader<File>,
    done: bool,
}

impl<'a> LineReader<'a> {
    fn open(path: &'a Path) -> Result<Self, HarnessError> {
        let file = File::open(path).map_err(|e| HarnessError::io(path, e))?;
        Ok(Self {
            path,
            reader: BufReader::new(file),
            done: false,
        })
    }
}

impl Iterator for LineReader<'_> {
    type Item = Result<Vec<u8>, HarnessError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut line = Vec::new();
        match self.reader.read_until(b'\n', &mut line) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => Some(Ok(line)),
            Err(e) => {
                self.done = true;
                Some(Err(HarnessError::io(self.path, e)))
            }
        }
    }
}
