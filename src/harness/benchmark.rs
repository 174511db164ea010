//! Scaling benchmark
//!
//! Times the parallel target once per process count (or `repetitions` times, averaged) and returns the samples in
//! the order the counts were given. Runs are strictly sequential so each duration covers exactly one invocation.
//!
//! ## Notes
//!
//! - Single-shot by default: no warm-up, no outlier rejection. Expect noise on short runs.
//! - A failed invocation aborts the whole measurement; samples already taken are discarded with it.

use std::num::NonZeroU32;
use std::time::{Duration, Instant};

use parbench_core::{BenchmarkSample, ProcessCount};

use super::error::HarnessError;
use super::invoker::Invoker;
use super::outputs::OutputPolicy;
use super::report::HarnessReporter;
use super::target::{ExecutionTarget, InvocationRequest};

/// Monotonic time source for the benchmark.
///
/// Readings are offsets from an arbitrary origin; only differences are meaningful.
pub trait Clock {
    fn now(&self) -> Duration;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// Wall-clock time from [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

pub struct ScalingBenchmark<'a, I, C> {
    invoker: I,
    clock: C,
    parallel: &'a ExecutionTarget,
    outputs: &'a OutputPolicy,
    repetitions: NonZeroU32,
}

impl<'a, I: Invoker, C: Clock> ScalingBenchmark<'a, I, C> {
    pub fn new(invoker: I, clock: C, parallel: &'a ExecutionTarget, outputs: &'a OutputPolicy) -> Self {
        Self {
            invoker,
            clock,
            parallel,
            outputs,
            repetitions: NonZeroU32::MIN,
        }
    }

    pub fn with_repetitions(mut self, repetitions: NonZeroU32) -> Self {
        self.repetitions = repetitions;
        self
    }

    /// Measure every process count, in the given order.
    ///
    /// ## Returns
    ///
    /// Exactly one sample per count, in input order.
    #[tracing::instrument(skip_all, fields(counts = process_counts.len(), repetitions = self.repetitions.get()))]
    pub fn measure(
        &self,
        process_counts: &[ProcessCount],
        reporter: &mut dyn HarnessReporter,
    ) -> Result<Vec<BenchmarkSample>, HarnessError> {
        let mut samples = Vec::with_capacity(process_counts.len());

        for &p in process_counts {
            let sample = self.measure_one(p)?;
            tracing::info!(
                processes = p.get(),
                seconds = sample.seconds(),
                runs = sample.runs,
                "benchmark sample"
            );
            reporter.on_sample(&sample);
            samples.push(sample);
        }

        Ok(samples)
    }

    fn measure_one(&self, p: ProcessCount) -> Result<BenchmarkSample, HarnessError> {
        let mut runs = Vec::new();

        for run in 0..self.repetitions.get() {
            let output = self.outputs.benchmark_output(self.parallel, p, run);
            let request = InvocationRequest::new(self.parallel, p).with_output(&output);

            let start = self.clock.now();
            self.invoker.invoke(&request)?;
            let end = self.clock.now();

            runs.push(end.saturating_sub(start));
            self.outputs.discard_benchmark_output(&output);
        }

        BenchmarkSample::from_runs(p, &runs).ok_or_else(|| {
            HarnessError::InvalidConfiguration("at least one repetition per process count is required".to_string())
        })
    }
}
