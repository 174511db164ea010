//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::io::{self, Write};

use miette::Diagnostic;

use crate::harness::{ConsoleReporter, Harness, HarnessConfig, HarnessError, RenderOptions};

use super::{CliError, CliResult, ExitCode};

/// Verify the parallel target against the serial one, measure it, and render the report to stdout.
pub fn run_benchmark(
    config: &HarnessConfig,
    render: &RenderOptions,
    verbose: bool,
    color: bool,
) -> CliResult<ExitCode> {
    let plan = config.validate().map_err(cli_error)?;
    let harness = Harness::new(plan);

    let mut reporter = ConsoleReporter::new(verbose, color);
    let outcome = harness.run(&mut reporter).map_err(cli_error)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render
        .renderer()
        .render(&outcome.samples, &mut out)
        .and_then(|()| out.flush())
        .map_err(|e| CliError::failure(format!("error: could not write the report: {e}")))?;

    Ok(ExitCode::SUCCESS)
}

/// Exit code for a harness error.
pub fn exit_code_for(err: &HarnessError) -> ExitCode {
    match err {
        HarnessError::InvalidConfiguration(_) => ExitCode::INVALID_CONFIGURATION,
        HarnessError::OutputDivergence { .. } => ExitCode::OUTPUT_DIVERGENCE,
        HarnessError::Spawn { .. }
        | HarnessError::ExternalProcessFailure { .. }
        | HarnessError::Timeout { .. }
        | HarnessError::Io { .. } => ExitCode::FAILURE,
    }
}

/// Render a harness error as a user-facing message: code, message, source chain, then help.
pub fn format_harness_error(err: &HarnessError) -> String {
    let mut message = match err.code() {
        Some(code) => format!("error[{code}]: {err}"),
        None => format!("error: {err}"),
    };

    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(&format!("\n  caused by: {text}"));
        }
        source = cause.source();
    }

    if let HarnessError::OutputDivergence {
        serial_output,
        parallel_output,
        ..
    } = err
    {
        message.push_str(&format!("\n  serial output:   {}", serial_output.display()));
        message.push_str(&format!("\n  parallel output: {}", parallel_output.display()));
    }

    if let Some(help) = err.help() {
        message.push_str(&format!("\n  help: {help}"));
    }
    message
}

fn cli_error(err: HarnessError) -> CliError {
    CliError::new(format_harness_error(&err), exit_code_for(&err))
}
