//! Correctness oracle
//!
//! "Same result" means line-sequence equality between the serial output and the parallel output for the same
//! input. For each process count `p`:
//!
//! 1. run the serial target at 1 process,
//! 2. run the parallel target at `p` processes,
//! 3. compare the two outputs.
//!
//! With shared outputs the serial baseline is re-run for every `p`. Its only copy lives in the serial target's
//! `output.csv`, and re-running is the one way to be sure the file holds what the serial program produces for this
//! input right now. With isolated outputs the baseline is written to its own file once and reused.
//!
//! A divergence at any `p` aborts verification. Scaling measurements are only taken once every count has passed.

use parbench_core::{ComparisonOutcome, ProcessCount};

use super::compare::compare_files;
use super::error::HarnessError;
use super::invoker::Invoker;
use super::outputs::OutputPolicy;
use super::report::HarnessReporter;
use super::target::{ExecutionTarget, InvocationRequest};

pub struct CorrectnessOracle<'a, I> {
    invoker: I,
    serial: &'a ExecutionTarget,
    parallel: &'a ExecutionTarget,
    outputs: &'a OutputPolicy,
    /// Set once an isolated baseline exists on disk.
    baseline_written: bool,
}

impl<'a, I: Invoker> CorrectnessOracle<'a, I> {
    pub fn new(
        invoker: I,
        serial: &'a ExecutionTarget,
        parallel: &'a ExecutionTarget,
        outputs: &'a OutputPolicy,
    ) -> Self {
        Self {
            invoker,
            serial,
            parallel,
            outputs,
            baseline_written: false,
        }
    }

    /// Verify a single process count.
    ///
    /// Returns the comparison outcome; a divergence is *not* turned into an error here, see [`Self::verify_all`].
    pub fn verify(&mut self, process_count: ProcessCount) -> Result<ComparisonOutcome, HarnessError> {
        let serial_output = self.outputs.serial_output(self.serial);
        let parallel_output = self.outputs.parallel_output(self.parallel, process_count);

        if self.outputs.reruns_serial_baseline() || !self.baseline_written {
            let request = InvocationRequest::new(self.serial, ProcessCount::ONE).with_output(&serial_output);
            self.invoker.invoke(&request)?;
            self.baseline_written = true;
        }

        let request = InvocationRequest::new(self.parallel, process_count).with_output(&parallel_output);
        self.invoker.invoke(&request)?;

        compare_files(&serial_output, &parallel_output)
    }

    /// Verify every count in order, stopping at the first divergence.
    ///
    /// ## Errors
    ///
    /// - [`HarnessError::OutputDivergence`] for the first count whose output differs.
    /// - Any invocation or I/O error, unchanged.
    #[tracing::instrument(skip_all, fields(counts = process_counts.len()))]
    pub fn verify_all(
        &mut self,
        process_counts: &[ProcessCount],
        reporter: &mut dyn HarnessReporter,
    ) -> Result<Vec<ProcessCount>, HarnessError> {
        let mut passed = Vec::with_capacity(process_counts.len());

        for &p in process_counts {
            match self.verify(p)? {
                ComparisonOutcome::Equal => {
                    tracing::info!(processes = p.get(), "parallel output matches serial output");
                    reporter.on_verified(p);
                    passed.push(p);
                }
                ComparisonOutcome::Diverged(divergence) => {
                    tracing::error!(processes = p.get(), %divergence, "parallel output diverged");
                    return Err(HarnessError::OutputDivergence {
                        process_count: p,
                        serial_output: self.outputs.serial_output(self.serial),
                        parallel_output: self.outputs.parallel_output(self.parallel, p),
                        divergence,
                    });
                }
            }
        }

        reporter.on_verification_complete(&passed);
        Ok(passed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::harness::report::NullReporter;
    use crate::harness::testing::{Call, ScriptedInvoker};
    use std::path::PathBuf;

    fn counts(max: u32) -> Vec<ProcessCount> {
        ProcessCount::new(max).unwrap().ascending_from_one().collect()
    }

    #[test]
    fn test_equal_outputs_pass_every_count() {
        let dir = tempfile::tempdir().unwrap();
        let serial = ExecutionTarget::new(dir.path().join("serial"));
        let parallel = ExecutionTarget::new(dir.path().join("parallel"));
        let invoker = ScriptedInvoker::new()
            .output(&serial.root, |_| "a\nb\nc\n")
            .output(&parallel.root, |_| "a\nb\nc\n");
        let outputs = OutputPolicy::Shared;

        let mut oracle = CorrectnessOracle::new(&invoker, &serial, &parallel, &outputs);
        for p in counts(3) {
            assert_eq!(oracle.verify(p).unwrap(), ComparisonOutcome::Equal);
        }
    }

    #[test]
    fn test_shared_mode_reruns_serial_before_every_parallel_run() {
        let dir = tempfile::tempdir().unwrap();
        let serial = ExecutionTarget::new(dir.path().join("serial"));
        let parallel = ExecutionTarget::new(dir.path().join("parallel"));
        let invoker = ScriptedInvoker::new().output(&serial.root, |_| "x\n").output(&parallel.root, |_| "x\n");
        let outputs = OutputPolicy::Shared;

        let mut oracle = CorrectnessOracle::new(&invoker, &serial, &parallel, &outputs);
        let passed = oracle.verify_all(&counts(3), &mut NullReporter).unwrap();
        assert_eq!(passed, counts(3));

        let calls: Vec<(PathBuf, u32)> = invoker.calls().into_iter().map(|c| (c.root, c.processes)).collect();
        assert_eq!(
            calls,
            vec![
                (serial.root.clone(), 1),
                (parallel.root.clone(), 1),
                (serial.root.clone(), 1),
                (parallel.root.clone(), 2),
                (serial.root.clone(), 1),
                (parallel.root.clone(), 3),
            ]
        );
    }

    #[test]
    fn test_isolated_mode_runs_serial_once() {
        let dir = tempfile::tempdir().unwrap();
        let serial = ExecutionTarget::new(dir.path().join("serial"));
        let parallel = ExecutionTarget::new(dir.path().join("parallel"));
        let invoker = ScriptedInvoker::new().output(&serial.root, |_| "x\n").output(&parallel.root, |_| "x\n");
        let outputs = OutputPolicy::isolated(Some(dir.path().join("scratch")));
        outputs.prepare().unwrap();

        let mut oracle = CorrectnessOracle::new(&invoker, &serial, &parallel, &outputs);
        oracle.verify_all(&counts(3), &mut NullReporter).unwrap();

        let calls = invoker.calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls.iter().filter(|c| c.root == serial.root).count(), 1);
        let outputs_written: Vec<PathBuf> = calls.iter().map(|c| c.output.clone()).collect();
        assert_eq!(outputs_written[0], dir.path().join("scratch/serial-p1.csv"));
        assert_eq!(outputs_written[3], dir.path().join("scratch/parallel-p3.csv"));
    }

    #[test]
    fn test_divergence_stops_verification() {
        let dir = tempfile::tempdir().unwrap();
        let serial = ExecutionTarget::new(dir.path().join("serial"));
        let parallel = ExecutionTarget::new(dir.path().join("parallel"));
        let invoker = ScriptedInvoker::new()
            .output(&serial.root, |_| "a\nb\nc\n")
            .output(&parallel.root, |p| if p == 2 { "a\nB\nc\n" } else { "a\nb\nc\n" });
        let outputs = OutputPolicy::Shared;

        let mut oracle = CorrectnessOracle::new(&invoker, &serial, &parallel, &outputs);
        let err = oracle.verify_all(&counts(4), &mut NullReporter).unwrap_err();
        match err {
            HarnessError::OutputDivergence {
                process_count,
                divergence,
                ..
            } => {
                assert_eq!(process_count.get(), 2);
                assert_eq!(divergence.line_index, 1);
            }
            other => panic!("expected OutputDivergence, got {other:?}"),
        }
        // p=3 and p=4 never ran
        assert_eq!(invoker.calls().iter().map(|c| c.processes).max(), Some(2));
    }

    #[test]
    fn test_serial_failure_happens_before_any_comparison() {
        let dir = tempfile::tempdir().unwrap();
        let serial = ExecutionTarget::new(dir.path().join("serial"));
        let parallel = ExecutionTarget::new(dir.path().join("parallel"));
        let invoker = ScriptedInvoker::new()
            .fail(&serial.root, 1)
            .output(&parallel.root, |_| "a\n");
        let outputs = OutputPolicy::Shared;

        let mut oracle = CorrectnessOracle::new(&invoker, &serial, &parallel, &outputs);
        let err = oracle.verify(ProcessCount::ONE).unwrap_err();
        assert!(matches!(err, HarnessError::ExternalProcessFailure { code: Some(1), .. }));
        assert_eq!(invoker.calls(), vec![Call {
            root: serial.root.clone(),
            processes: 1,
            output: serial.output.clone(),
        }]);
    }
}
