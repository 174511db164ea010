//! Progress reporting and result rendering
//!
//! ## HarnessReporter Trait
//!
//! The phases emit progress events through a [`HarnessReporter`] instead of printing. [`ConsoleReporter`] is the
//! interactive default (stderr); tests record events instead.
//!
//! ## ReportRenderer Trait
//!
//! The final sample sequence is handed to a [`ReportRenderer`], the terminal sink of a run:
//! - [`TerminalChart`]: ASCII curve of time vs. process count plus a speedup table
//! - [`JsonRenderer`]: machine-readable document
//! - [`CsvRenderer`]: one row per sample

use std::io::{self, Write};

use parbench_core::{BenchmarkSample, ProcessCount, ScalingSummary};
use serde::Serialize;

// ============================================================================
// Progress reporting
// ============================================================================

/// Harness phase, for progress reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Verification,
    Benchmark,
}

/// Receives progress events while the harness runs.
pub trait HarnessReporter {
    /// Called before a phase starts, with the number of process counts it covers.
    fn on_phase_start(&mut self, _phase: Phase, _process_counts: usize) {}

    /// Called when the outputs at `process_count` matched the serial baseline.
    fn on_verified(&mut self, process_count: ProcessCount);

    /// Called once every requested process count has been verified.
    fn on_verification_complete(&mut self, passed: &[ProcessCount]);

    /// Called after each benchmark sample is taken.
    fn on_sample(&mut self, sample: &BenchmarkSample);
}

/// Reporter that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl HarnessReporter for NullReporter {
    fn on_verified(&mut self, _process_count: ProcessCount) {}
    fn on_verification_complete(&mut self, _passed: &[ProcessCount]) {}
    fn on_sample(&mut self, _sample: &BenchmarkSample) {}
}

/// Default console reporter (stderr, so stdout stays reserved for the rendered report).
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    pub verbose: bool,
    pub color: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool, color: bool) -> Self {
        Self { verbose, color }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

impl HarnessReporter for ConsoleReporter {
    fn on_phase_start(&mut self, phase: Phase, process_counts: usize) {
        let label = match phase {
            Phase::Verification => "verifying correctness",
            Phase::Benchmark => "measuring scaling",
        };
        eprintln!("{} for 1..={} process(es)", self.paint("1", label), process_counts);
    }

    fn on_verified(&mut self, process_count: ProcessCount) {
        if self.verbose {
            eprintln!("  {} {} process(es)", self.paint("32", "identical"), process_count);
        }
    }

    fn on_verification_complete(&mut self, _passed: &[ProcessCount]) {
        eprintln!(
            "{}",
            self.paint("32", "Parallel version yields the same results as the serial one")
        );
    }

    fn on_sample(&mut self, sample: &BenchmarkSample) {
        if sample.runs > 1 {
            eprintln!(
                "Time for {} processes: {:.3}s (mean of {}, min {:.3}s, max {:.3}s)",
                sample.process_count,
                sample.seconds(),
                sample.runs,
                sample.min.as_secs_f64(),
                sample.max.as_secs_f64()
            );
        } else {
            eprintln!("Time for {} processes: {:.3}s", sample.process_count, sample.seconds());
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Terminal sink for the scaling curve.
pub trait ReportRenderer {
    fn render(&self, samples: &[BenchmarkSample], out: &mut dyn Write) -> io::Result<()>;
}

/// Output format for the final report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderFormat {
    #[default]
    Text,
    Json,
    Csv,
}

/// Rendering configuration.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub format: RenderFormat,
    /// Plot area width in columns (text format).
    pub width: usize,
    /// Plot area height in rows (text format).
    pub height: usize,
    /// Draw the curve; when false the text format prints only the table.
    pub plot: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: RenderFormat::Text,
            width: 60,
            height: 16,
            plot: true,
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: RenderFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_plot(mut self, plot: bool) -> Self {
        self.plot = plot;
        self
    }

    pub fn renderer(&self) -> Box<dyn ReportRenderer> {
        match self.format {
            RenderFormat::Text => Box::new(TerminalChart {
                width: self.width,
                height: self.height,
                plot: self.plot,
            }),
            RenderFormat::Json => Box::new(JsonRenderer),
            RenderFormat::Csv => Box::new(CsvRenderer),
        }
    }
}

/// Smallest plot the chart will draw; smaller requests are clamped.
const MIN_PLOT_WIDTH: usize = 8;
const MIN_PLOT_HEIGHT: usize = 3;

/// ASCII scaling curve with marked data points, followed by a speedup table.
#[derive(Debug, Clone)]
pub struct TerminalChart {
    pub width: usize,
    pub height: usize,
    pub plot: bool,
}

impl ReportRenderer for TerminalChart {
    fn render(&self, samples: &[BenchmarkSample], out: &mut dyn Write) -> io::Result<()> {
        if samples.is_empty() {
            return writeln!(out, "no samples to report");
        }
        if self.plot {
            for line in self.chart_lines(samples) {
                writeln!(out, "{line}")?;
            }
            writeln!(out)?;
        }
        write!(out, "{}", format_table(samples))
    }
}

impl TerminalChart {
    fn chart_lines(&self, samples: &[BenchmarkSample]) -> Vec<String> {
        let width = self.width.max(MIN_PLOT_WIDTH);
        let height = self.height.max(MIN_PLOT_HEIGHT);

        let secs: Vec<f64> = samples.iter().map(BenchmarkSample::seconds).collect();
        let max = secs.iter().copied().fold(f64::MIN, f64::max);
        let min = secs.iter().copied().fold(f64::MAX, f64::min);

        let col_of = |i: usize| -> usize {
            if samples.len() == 1 {
                0
            } else {
                (i * (width - 1) + (samples.len() - 1) / 2) / (samples.len() - 1)
            }
        };
        let row_of = |v: f64| -> usize {
            if max > min {
                (((max - v) / (max - min)) * (height - 1) as f64).round() as usize
            } else {
                (height - 1) / 2
            }
        };

        let mut grid = vec![vec![' '; width]; height];

        // Line segments first, markers on top.
        for i in 1..samples.len() {
            let (c0, c1) = (col_of(i - 1), col_of(i));
            let (v0, v1) = (secs[i - 1], secs[i]);
            for c in c0..=c1 {
                let t = if c1 == c0 { 0.0 } else { (c - c0) as f64 / (c1 - c0) as f64 };
                let r = row_of(v0 + (v1 - v0) * t).min(height - 1);
                grid[r][c] = '.';
            }
        }
        for (i, v) in secs.iter().enumerate() {
            grid[row_of(*v).min(height - 1)][col_of(i)] = 'o';
        }

        let top = format!("{max:.3}");
        let bottom = format!("{min:.3}");
        let label_width = top.len().max(bottom.len());

        let mut lines = Vec::with_capacity(height + 5);
        lines.push("Benchmarking".to_string());
        lines.push(format!("{:>label_width$}", "Time (s)"));
        for (r, row) in grid.iter().enumerate() {
            let label = if r == 0 {
                top.as_str()
            } else if r == height - 1 {
                bottom.as_str()
            } else {
                ""
            };
            let row: String = row.iter().collect();
            lines.push(format!("{label:>label_width$} |{}", row.trim_end()));
        }
        lines.push(format!("{:>label_width$} +{}", "", "-".repeat(width)));

        // X tick labels under their columns, skipping any that would collide.
        let mut ticks = vec![' '; width + 8];
        let mut next_free = 0usize;
        for (i, s) in samples.iter().enumerate() {
            let text = s.process_count.to_string();
            let col = col_of(i);
            if col < next_free {
                continue;
            }
            for (k, ch) in text.chars().enumerate() {
                if let Some(slot) = ticks.get_mut(col + k) {
                    *slot = ch;
                }
            }
            next_free = col + text.len() + 1;
        }
        let ticks: String = ticks.into_iter().collect();
        lines.push(format!("{:>label_width$}  {}", "", ticks.trim_end()));
        lines.push(format!("{:>label_width$}  Number of processes", ""));
        lines
    }
}

/// Per-sample table: time, speedup and parallel efficiency relative to the first sample.
pub fn format_table(samples: &[BenchmarkSample]) -> String {
    let summary = ScalingSummary::from_samples(samples);
    let with_spread = samples.iter().any(|s| s.runs > 1);

    let mut table = String::new();
    if with_spread {
        table.push_str("processes     seconds         min         max   speedup  efficiency\n");
    } else {
        table.push_str("processes     seconds   speedup  efficiency\n");
    }

    for (sample, point) in samples.iter().zip(&summary.points) {
        let speedup = point.speedup.map_or_else(|| "-".to_string(), |s| format!("{s:.2}x"));
        let efficiency = point
            .efficiency
            .map_or_else(|| "-".to_string(), |e| format!("{:.1}%", e * 100.0));
        if with_spread {
            table.push_str(&format!(
                "{:>9}  {:>10.3}  {:>10.3}  {:>10.3}  {:>8}  {:>10}\n",
                point.process_count,
                point.seconds,
                sample.min.as_secs_f64(),
                sample.max.as_secs_f64(),
                speedup,
                efficiency
            ));
        } else {
            table.push_str(&format!(
                "{:>9}  {:>10.3}  {:>8}  {:>10}\n",
                point.process_count, point.seconds, speedup, efficiency
            ));
        }
    }
    table
}

#[derive(Debug, Serialize)]
struct JsonSample {
    processes: u32,
    seconds: f64,
    min_seconds: f64,
    max_seconds: f64,
    runs: u32,
    speedup: Option<f64>,
    efficiency: Option<f64>,
}

#[derive(Debug, Serialize)]
struct JsonReport {
    samples: Vec<JsonSample>,
    fastest_processes: Option<u32>,
}

/// Machine-readable report on stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn render(&self, samples: &[BenchmarkSample], out: &mut dyn Write) -> io::Result<()> {
        let summary = ScalingSummary::from_samples(samples);
        let report = JsonReport {
            samples: samples
                .iter()
                .zip(&summary.points)
                .map(|(s, p)| JsonSample {
                    processes: s.process_count.get(),
                    seconds: s.seconds(),
                    min_seconds: s.min.as_secs_f64(),
                    max_seconds: s.max.as_secs_f64(),
                    runs: s.runs,
                    speedup: p.speedup,
                    efficiency: p.efficiency,
                })
                .collect(),
            fastest_processes: summary.fastest().map(|p| p.process_count.get()),
        };
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)
    }
}

/// One CSV row per sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRenderer;

impl ReportRenderer for CsvRenderer {
    fn render(&self, samples: &[BenchmarkSample], out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "processes,seconds,min_seconds,max_seconds,runs")?;
        for s in samples {
            writeln!(
                out,
                "{},{:.6},{:.6},{:.6},{}",
                s.process_count,
                s.seconds(),
                s.min.as_secs_f64(),
                s.max.as_secs_f64(),
                s.runs
            )?;
        }
        Ok(())
    }
}
