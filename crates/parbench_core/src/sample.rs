//! Define timing samples and the scaling curve derived from them.
//!
//! ## Notes
//! - A sample's `duration` is what gets plotted. With a single run per process count it is that run's wall-clock
//!   time; with repetitions it is the arithmetic mean, and `min`/`max` keep the spread.
//! - Speedup and efficiency are relative to the first sample of the sequence (normally process count 1).

use std::time::Duration;

use crate::ProcessCount;

/// One point of the scaling curve: wall-clock cost of running the parallel target at a given process count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkSample {
    pub process_count: ProcessCount,
    /// Mean wall-clock duration over all runs.
    pub duration: Duration,
    pub min: Duration,
    pub max: Duration,
    /// Number of runs folded into this sample (at least 1).
    pub runs: u32,
}

impl BenchmarkSample {
    /// Build a sample from a single measured run.
    pub fn single(process_count: ProcessCount, duration: Duration) -> Self {
        Self {
            process_count,
            duration,
            min: duration,
            max: duration,
            runs: 1,
        }
    }

    /// Build a sample from repeated runs at the same process count.
    ///
    /// ## Returns
    /// - `None` if `runs` is empty.
    pub fn from_runs(process_count: ProcessCount, runs: &[Duration]) -> Option<Self> {
        let duration = mean_duration(runs)?;
        let min = runs.iter().min().copied()?;
        let max = runs.iter().max().copied()?;
        Some(Self {
            process_count,
            duration,
            min,
            max,
            runs: u32::try_from(runs.len()).unwrap_or(u32::MAX),
        })
    }

    pub fn seconds(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}

/// Arithmetic mean of a set of durations.
///
/// ## Returns
/// - `None` for an empty slice.
pub fn mean_duration(runs: &[Duration]) -> Option<Duration> {
    if runs.is_empty() {
        return None;
    }
    let total: Duration = runs.iter().sum();
    let count = u32::try_from(runs.len()).ok()?;
    Some(total / count)
}

/// A sample annotated with its speedup and parallel efficiency.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingPoint {
    pub process_count: ProcessCount,
    pub seconds: f64,
    /// `baseline / seconds`; `None` when this sample took no measurable time.
    pub speedup: Option<f64>,
    /// `speedup * baseline_processes / processes`.
    pub efficiency: Option<f64>,
}

/// The scaling curve with derived metrics, relative to the first sample.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScalingSummary {
    pub points: Vec<ScalingPoint>,
}

impl ScalingSummary {
    pub fn from_samples(samples: &[BenchmarkSample]) -> Self {
        let Some(baseline) = samples.first() else {
            return Self::default();
        };
        let base_secs = baseline.seconds();
        let base_procs = f64::from(baseline.process_count.get());

        let points = samples
            .iter()
            .map(|s| {
                let seconds = s.seconds();
                let speedup = (seconds > 0.0).then(|| base_secs / seconds);
                let efficiency = speedup.map(|sp| sp * base_procs / f64::from(s.process_count.get()));
                ScalingPoint {
                    process_count: s.process_count,
                    seconds,
                    speedup,
                    efficiency,
                }
            })
            .collect();

        Self { points }
    }

    /// Return the point with the lowest wall-clock time, first one wins on ties.
    pub fn fastest(&self) -> Option<&ScalingPoint> {
        self.points.iter().fold(None, |best: Option<&ScalingPoint>, p| match best {
            Some(b) if b.seconds <= p.seconds => Some(b),
            _ => Some(p),
        })
    }
}
