//! Test doubles for the harness phases.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use parbench_core::{BenchmarkSample, ProcessCount};

use super::benchmark::Clock;
use super::error::HarnessError;
use super::invoker::{InvocationResult, Invoker};
use super::report::HarnessReporter;
use super::target::InvocationRequest;

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub root: PathBuf,
    pub processes: u32,
    pub output: PathBuf,
}

type OutputFn = Box<dyn Fn(u32) -> &'static str>;
type DurationFn = Box<dyn Fn(u32) -> Duration>;

/// Invoker that writes canned outputs instead of running anything.
#[derive(Default)]
pub struct ScriptedInvoker {
    outputs: HashMap<PathBuf, OutputFn>,
    /// (root, process count or any) -> exit code
    failures: HashMap<(PathBuf, Option<u32>), i32>,
    timing: Option<(Rc<FakeClock>, DurationFn)>,
    calls: RefCell<Vec<Call>>,
}

impl ScriptedInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Output written by invocations against `root`, as a function of the process count.
    pub fn output(mut self, root: &Path, f: impl Fn(u32) -> &'static str + 'static) -> Self {
        self.outputs.insert(root.to_path_buf(), Box::new(f));
        self
    }

    /// Every invocation against `root` exits with `code`.
    pub fn fail(mut self, root: &Path, code: i32) -> Self {
        self.failures.insert((root.to_path_buf(), None), code);
        self
    }

    /// Invocations against `root` at `processes` exit with `code`.
    pub fn fail_at(mut self, root: &Path, processes: u32, code: i32) -> Self {
        self.failures.insert((root.to_path_buf(), Some(processes)), code);
        self
    }

    /// Advance `clock` by `f(processes)` on every invocation.
    pub fn taking(mut self, clock: Rc<FakeClock>, f: impl Fn(u32) -> Duration + 'static) -> Self {
        self.timing = Some((clock, Box::new(f)));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl Invoker for ScriptedInvoker {
    fn invoke(&self, request: &InvocationRequest<'_>) -> InvocationResult {
        let root = request.target.root.clone();
        let processes = request.process_count.get();
        self.calls.borrow_mut().push(Call {
            root: root.clone(),
            processes,
            output: request.output.to_path_buf(),
        });

        if let Some((clock, f)) = &self.timing {
            clock.advance(f(processes));
        }

        let code = self
            .failures
            .get(&(root.clone(), Some(processes)))
            .or_else(|| self.failures.get(&(root.clone(), None)));
        if let Some(&code) = code {
            return Err(HarnessError::ExternalProcessFailure {
                target: root,
                process_count: request.process_count,
                code: Some(code),
            });
        }

        let contents = self.outputs.get(&root).map(|f| f(processes)).unwrap_or("");
        if let Some(parent) = request.output.parent() {
            fs::create_dir_all(parent).map_err(|e| HarnessError::io(parent, e))?;
        }
        fs::write(request.output, contents).map_err(|e| HarnessError::io(request.output, e))
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct FakeClock {
    now: Cell<Duration>,
}

impl FakeClock {
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Reporter that keeps every event.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub verified: Vec<ProcessCount>,
    pub verification_complete: bool,
    pub samples: Vec<BenchmarkSample>,
}

impl HarnessReporter for RecordingReporter {
    fn on_verified(&mut self, process_count: ProcessCount) {
        self.verified.push(process_count);
    }

    fn on_verification_complete(&mut self, _passed: &[ProcessCount]) {
        self.verification_complete = true;
    }

    fn on_sample(&mut self, sample: &BenchmarkSample) {
        self.samples.push(sample.clone());
    }
}
