//! Property-based tests for the harness
//!
//! These tests use proptest to verify invariants across many randomly
//! generated inputs, catching edge cases that hand-written tests might miss.

use std::fs;
use std::time::Duration;

use parbench::harness::{ReportRenderer, TerminalChart, compare_files};
use parbench::{BenchmarkSample, ComparisonOutcome, ProcessCount};
use proptest::prelude::*;

fn line_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9()=#@+\\-\\[\\]]{0,16}"
}

// =============================================================================
// File comparison properties
// =============================================================================

proptest! {
    /// Property: CRLF output never matches LF output, and the divergence is the first line
    #[test]
    fn line_endings_are_significant(lines in prop::collection::vec(line_strategy(), 1..40)) {
        let dir = tempfile::tempdir().unwrap();
        let lf = dir.path().join("lf.csv");
        let crlf = dir.path().join("crlf.csv");
        fs::write(&lf, lines.iter().map(|l| format!("{l}\n")).collect::<String>()).unwrap();
        fs::write(&crlf, lines.iter().map(|l| format!("{l}\r\n")).collect::<String>()).unwrap();

        let divergence = compare_files(&lf, &crlf).unwrap().divergence().cloned().unwrap();
        prop_assert_eq!(divergence.line_index, 0);
        prop_assert_eq!(divergence.right, Some(format!("{}\r", lines[0])));
    }

    /// Property: dropping the final newline is always a divergence at the last line
    #[test]
    fn final_newline_is_significant(lines in prop::collection::vec(line_strategy(), 1..40)) {
        let dir = tempfile::tempdir().unwrap();
        let terminated = dir.path().join("terminated.csv");
        let unterminated = dir.path().join("unterminated.csv");
        let text: String = lines.iter().map(|l| format!("{l}\n")).collect();
        fs::write(&terminated, &text).unwrap();
        fs::write(&unterminated, &text[..text.len() - 1]).unwrap();

        let outcome = compare_files(&terminated, &unterminated).unwrap();
        let divergence = outcome.divergence().cloned().unwrap();
        prop_assert_eq!(divergence.line_index, lines.len() - 1);
    }

    /// Property: changing one line is reported at exactly that line
    #[test]
    fn single_edit_is_located(
        lines in prop::collection::vec(line_strategy(), 1..40),
        index in any::<prop::sample::Index>(),
    ) {
        let at = index.index(lines.len());
        let mut edited = lines.clone();
        edited[at].push('!');

        let dir = tempfile::tempdir().unwrap();
        let left = dir.path().join("serial.csv");
        let right = dir.path().join("parallel.csv");
        fs::write(&left, lines.iter().map(|l| format!("{l}\n")).collect::<String>()).unwrap();
        fs::write(&right, edited.iter().map(|l| format!("{l}\n")).collect::<String>()).unwrap();

        let outcome = compare_files(&left, &right).unwrap();
        let divergence = outcome.divergence().cloned().unwrap();
        prop_assert_eq!(divergence.line_index, at);
        prop_assert_eq!(divergence.right, Some(edited[at].clone()));
    }
}

// =============================================================================
// Rendering properties
// =============================================================================

proptest! {
    /// Property: the chart marks every sample exactly once and stays inside its plot area
    #[test]
    fn chart_marks_every_sample(
        millis in prop::collection::vec(1u64..100_000, 1..12),
        width in 8usize..80,
        height in 3usize..24,
    ) {
        let samples: Vec<BenchmarkSample> = millis
            .iter()
            .enumerate()
            .map(|(i, &ms)| {
                let p = ProcessCount::new(i as u32 + 1).unwrap();
                BenchmarkSample::single(p, Duration::from_millis(ms))
            })
            .collect();
        let chart = TerminalChart { width, height, plot: true };

        let mut out = Vec::new();
        chart.render(&samples, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let rows: Vec<&str> = text.lines().filter(|l| l.contains(" |")).collect();
        prop_assert_eq!(rows.len(), height);
        let markers: usize = rows.iter().map(|r| r.matches('o').count()).sum();
        // distinct columns per sample while there is room for them
        if samples.len() <= width {
            prop_assert_eq!(markers, samples.len());
        }
        prop_assert!(rows.iter().all(|r| r.split_once(" |").map_or(0, |(_, plot)| plot.chars().count()) <= width));
    }
}
