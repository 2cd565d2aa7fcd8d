//! Implementation of the `check` subcommand.

use crate::cli::GlobalArgs;
use crate::commands::build_config;
use crate::error::{CliResult, EXIT_USAGE};

use console::style;
use tgrun_core::{CommandResolver, DependencyReport, ModuleRegistry};

use std::path::Path;

/// Prints the dependency report. Exits with [`EXIT_USAGE`] when the tool
/// cannot be run in either form.
pub fn run_check(global: &GlobalArgs, registry: ModuleRegistry) -> CliResult<i32> {
    let config = build_config(global)?;
    let report = CommandResolver::new(config, registry).dependency_report();

    if global.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(if report.tool_available() { 0 } else { EXIT_USAGE })
}

fn print_report(report: &DependencyReport) {
    println!(
        "{} executable: {}",
        report.tool_name,
        describe_path(report.tool_path.as_deref())
    );
    println!(
        "{} module:     {}",
        report.module_name,
        if report.module_registered {
            style("registered").green().to_string()
        } else {
            style("not registered").yellow().to_string()
        }
    );
    println!("ffmpeg:              {}", describe_path(report.ffmpeg_path.as_deref()));

    if !report.tool_available() {
        println!(
            "{}",
            style(format!("{} is not available; install it or pass --tool", report.tool_name)).red()
        );
    } else if !report.ffmpeg_available() {
        println!("{}", style("ffmpeg is missing; convert will fail").yellow());
    }
}

fn describe_path(path: Option<&Path>) -> String {
    match path {
        Some(path) => style(path.display().to_string()).green().to_string(),
        None => style("not found").red().to_string(),
    }
}
