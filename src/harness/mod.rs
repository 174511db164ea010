//! Correctness-and-scaling harness
//!
//! Drives two builds of the same program, a serial reference and a parallel version, through their launchers:
//!
//! - [`oracle`]: the parallel output at every process count must match the serial output line for line.
//! - [`benchmark`]: once that holds, the parallel version is timed at every process count.
//! - [`report`]: progress events during the run and the final rendering of the samples.
//!
//! ## Modules
//!
//! - `config` - User configuration and the validated [`RunPlan`]
//! - `target` - Target descriptor and invocation request
//! - `invoker` - Runs one launcher invocation as a scoped child process
//! - `compare` - Streaming file comparison
//! - `outputs` - Where each invocation writes its output
//! - `pipeline` - Phase ordering
//!
//! Everything runs strictly sequentially: one external invocation at a time.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod benchmark;
pub mod compare;
pub mod config;
pub mod error;
pub mod invoker;
pub mod oracle;
pub mod outputs;
pub mod pipeline;
pub mod report;
pub mod target;

#[cfg(test)]
mod testing;

pub use benchmark::{Clock, MonotonicClock, ScalingBenchmark};
pub use compare::compare_files;
pub use config::{HarnessConfig, RunPlan};
pub use error::HarnessError;
pub use invoker::{InvocationResult, Invoker, ProcessInvoker};
pub use oracle::CorrectnessOracle;
pub use outputs::{OutputPolicy, ScratchDir};
pub use pipeline::{Harness, HarnessOutcome};
pub use report::{
    ConsoleReporter, CsvRenderer, HarnessReporter, JsonRenderer, NullReporter, Phase, RenderFormat, RenderOptions,
    ReportRenderer, TerminalChart,
};
pub use target::{ExecutionTarget, InvocationRequest};
