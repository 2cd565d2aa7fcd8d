//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// `check`: dependency report.
pub mod check;
/// `convert` and `spoof`: supervised tool runs.
pub mod run;

use crate::cli::GlobalArgs;
use crate::error::{CliErrorContext, CliResult};

use tgrun_core::config::FFMPEG_TOOL_NAME;
use tgrun_core::discovery::{default_bundle_dirs, find_bundled_tool_dir};
use tgrun_core::{CommandResolver, CoreConfig, CoreConfigBuilder, ModuleRegistry};

use log::debug;

/// Builds the core configuration from the global flags.
///
/// A copy of ffmpeg bundled next to the binary is added to the search dirs
/// when ffmpeg is not already on `PATH`.
pub fn build_config(global: &GlobalArgs) -> CliResult<CoreConfig> {
    let mut config = CoreConfigBuilder::new()
        .tool_name(global.tool.clone())
        .module_name(global.module.clone())
        .extra_search_dirs(global.search_dirs.clone())
        .echo_command(!global.no_echo)
        .build();
    config.validate().cli_context("Invalid configuration")?;

    let resolver = CommandResolver::new(config.clone(), ModuleRegistry::new());
    if !resolver.has_ffmpeg() {
        if let Some(dir) = find_bundled_tool_dir(&default_bundle_dirs(), FFMPEG_TOOL_NAME) {
            debug!("Using bundled ffmpeg from {}", dir.display());
            config.extra_search_dirs.push(dir);
        }
    }
    Ok(config)
}
