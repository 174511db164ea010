//! Run pipeline
//!
//! A run is three strictly ordered phases over a validated [`RunPlan`]:
//!
//! 1. **Verification**: every process count `1..=max` must reproduce the serial output.
//! 2. **Benchmark**: only reached when verification passed in full; one sample per count.
//! 3. **Report**: left to the caller, which renders the returned samples.
//!
//! Any error ends the run where it happened. In particular no timing run is ever attempted after a divergence or a
//! failed invocation.

use parbench_core::{BenchmarkSample, ProcessCount};

use super::benchmark::{Clock, MonotonicClock, ScalingBenchmark};
use super::config::RunPlan;
use super::error::HarnessError;
use super::invoker::{Invoker, ProcessInvoker};
use super::oracle::CorrectnessOracle;
use super::report::{HarnessReporter, Phase};

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessOutcome {
    /// Counts whose parallel output matched the serial output, ascending.
    pub verified: Vec<ProcessCount>,
    /// One sample per count, ascending.
    pub samples: Vec<BenchmarkSample>,
}

pub struct Harness<I, C> {
    plan: RunPlan,
    invoker: I,
    clock: C,
}

impl Harness<ProcessInvoker, MonotonicClock> {
    /// Harness that runs real processes under the wall clock.
    pub fn new(plan: RunPlan) -> Self {
        let invoker = ProcessInvoker::new().with_timeout(plan.timeout);
        Self::with_parts(plan, invoker, MonotonicClock::default())
    }
}

impl<I: Invoker, C: Clock> Harness<I, C> {
    pub fn with_parts(plan: RunPlan, invoker: I, clock: C) -> Self {
        Self { plan, invoker, clock }
    }

    /// Verify, then measure.
    ///
    /// ## Errors
    ///
    /// The first error from either phase, unchanged. Scratch outputs are kept on failure so they can be inspected.
    #[tracing::instrument(skip_all, fields(
        serial = %self.plan.serial.root.display(),
        parallel = %self.plan.parallel.root.display(),
        max = self.plan.process_counts.len(),
    ))]
    pub fn run(&self, reporter: &mut dyn HarnessReporter) -> Result<HarnessOutcome, HarnessError> {
        let plan = &self.plan;
        plan.outputs.prepare()?;

        tracing::info!(counts = plan.process_counts.len(), "verification phase started");
        reporter.on_phase_start(Phase::Verification, plan.process_counts.len());
        let verified = CorrectnessOracle::new(&self.invoker, &plan.serial, &plan.parallel, &plan.outputs)
            .verify_all(&plan.process_counts, reporter)?;

        tracing::info!(verified = verified.len(), "benchmark phase started");
        reporter.on_phase_start(Phase::Benchmark, plan.process_counts.len());
        let samples = ScalingBenchmark::new(&self.invoker, &self.clock, &plan.parallel, &plan.outputs)
            .with_repetitions(plan.repetitions)
            .measure(&plan.process_counts, reporter)?;

        plan.outputs.cleanup();
        tracing::info!(samples = samples.len(), "run complete");
        Ok(HarnessOutcome { verified, samples })
    }
}
