#![deny(unsafe_code)]
//! parbench: correctness-and-scaling harness for parallel programs
//!
//! Given a serial build and a parallel build of the same program, parbench first checks that the parallel build
//! reproduces the serial output at every process count from 1 to a maximum, then measures its wall-clock time at
//! each of those counts and reports the scaling curve. The programs are opaque: they are driven through a launcher
//! script and observed only through their exit status and output file.
//!
//! The pure vocabulary (process counts, samples, line comparison) lives in `parbench_core`; this crate adds the
//! process handling, phases, rendering and CLI.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` and `harness` modules
//!   enforce `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Unsafe**: denied crate-wide. The one exception is the `killpg` call that tears down a timed-out launcher's
//!   process group in `harness::invoker`.

pub mod cli;
pub mod harness;

pub use harness::{Harness, HarnessConfig, HarnessError, HarnessOutcome, RunPlan};
pub use parbench_core::{BenchmarkSample, ComparisonOutcome, Divergence, ProcessCount, TargetLayout};
