//! Implementation of the `convert` and `spoof` subcommands.
//!
//! Both build the tool's argument list, start one supervised run and render
//! it until the tool exits. The returned value is the tool's exit code.

use crate::cli::{ConvertCommand, GlobalArgs, SpoofCommand};
use crate::commands::build_config;
use crate::error::{CliErrorContext, CliResult};
use crate::progress::{ConsoleReporter, JsonReporter};

use tgrun_core::tool_args::{ConvertArgs, Operation, SpoofArgs};
use tgrun_core::{Dispatcher, ModuleRegistry, ProgressEstimator, ToolRunner};

use log::{info, warn};

pub fn run_convert(
    global: &GlobalArgs,
    cmd: &ConvertCommand,
    registry: ModuleRegistry,
) -> CliResult<i32> {
    let mut args = ConvertArgs::new(&cmd.input);
    if let Some(output) = &cmd.output {
        args = args.output(output);
    }
    let args = args
        .extra(&cmd.extra)
        .cli_context("Could not parse --extra")?;
    args.validate().cli_context("Cannot convert")?;

    let args = args.to_args().cli_context("Cannot convert")?;
    run_tool(global, Operation::Convert, args, registry)
}

pub fn run_spoof(global: &GlobalArgs, cmd: &SpoofCommand, registry: ModuleRegistry) -> CliResult<i32> {
    let args = SpoofArgs::new(&cmd.input, &cmd.output)
        .extra(&cmd.extra)
        .cli_context("Could not parse --extra")?;
    args.validate().cli_context("Cannot spoof")?;

    let args = args.to_args().cli_context("Cannot spoof")?;
    run_tool(global, Operation::Spoof, args, registry)
}

/// Starts the tool with `args` and blocks until it exits.
pub fn run_tool(
    global: &GlobalArgs,
    operation: Operation,
    args: Vec<String>,
    registry: ModuleRegistry,
) -> CliResult<i32> {
    let config = build_config(global)?;
    let runner = ToolRunner::new(config, registry).cli_context("Invalid configuration")?;

    if operation == Operation::Convert && !runner.resolver().has_ffmpeg() {
        warn!("ffmpeg was not found; tgradish convert will likely fail");
    }

    let (dispatcher, sender) = Dispatcher::new();
    let (on_line, on_exit) = sender.callbacks();
    drop(sender);
    let plan = runner
        .start(args, on_line, on_exit)
        .cli_with_context(|| format!("Cannot start tgradish {operation}"))?;
    info!("Running {operation} ({:?} mode)", plan.mode());

    let estimator = ProgressEstimator::for_operation(operation);
    let outcome = if global.json {
        dispatcher.run_until_exit(&mut JsonReporter::new(estimator))
    } else {
        dispatcher.run_until_exit(&mut ConsoleReporter::new(estimator))
    }
    .cli_context("Lost contact with the running tool")?;

    info!("tgradish {operation} finished with exit code {}", outcome.exit_code);
    Ok(outcome.exit_code)
}
