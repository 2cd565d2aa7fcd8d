//! Configuration structures and constants for the tgrun-core library.
//!
//! This module provides the configuration that decides which tool is
//! resolved, where it is looked up and how a run is presented.

mod builder;

use std::path::PathBuf;

use crate::error::{CoreError, CoreResult};

pub use builder::CoreConfigBuilder;

// Default constants

/// Default executable name looked up on the search path.
pub const DEFAULT_TOOL_NAME: &str = "tgradish";

/// Default name of the in-process entry point.
pub const DEFAULT_MODULE_NAME: &str = "tgradish";

/// Helper binary the `convert` operation depends on.
pub const FFMPEG_TOOL_NAME: &str = "ffmpeg";

/// Main configuration structure for the tgrun-core library.
///
/// Typically created by the consumer of the library (e.g., tgrun-cli) and
/// handed to [`crate::ToolRunner::new`]. All fields have defaults; the builder
/// provides a fluent way to override them.
///
/// # Examples
///
/// ```rust
/// use tgrun_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .tool_name("tgradish")
///     .extra_search_dir(PathBuf::from("/opt/tgrun/ffmpeg"))
///     .echo_command(false)
///     .build();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Executable name searched for on `PATH` and in `extra_search_dirs`
    pub tool_name: String,

    /// Name the in-process entry point is registered under
    pub module_name: String,

    /// Directories searched before `PATH` and prepended to the child's `PATH`
    pub extra_search_dirs: Vec<PathBuf>,

    /// Working directory for external runs (inherits the current one if unset)
    pub working_directory: Option<PathBuf>,

    /// Emit `$ command args` as the first line of every run
    pub echo_command: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            tool_name: DEFAULT_TOOL_NAME.to_string(),
            module_name: DEFAULT_MODULE_NAME.to_string(),
            extra_search_dirs: Vec::new(),
            working_directory: None,
            echo_command: true,
        }
    }
}

impl CoreConfig {
    /// Checks that the configured names can be looked up.
    pub fn validate(&self) -> CoreResult<()> {
        validate_name("tool_name", &self.tool_name)?;
        validate_name("module_name", &self.module_name)?;

        if let Some(dir) = &self.working_directory {
            if !dir.is_dir() {
                return Err(CoreError::Config(format!(
                    "working_directory '{}' is not a directory",
                    dir.display()
                )));
            }
        }

        Ok(())
    }
}

fn validate_name(field: &str, value: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::Config(format!("{field} must not be empty")));
    }
    if value.contains('/') || value.contains('\\') {
        return Err(CoreError::Config(format!(
            "{field} '{value}' must be a bare name, not a path"
        )));
    }
    Ok(())
}
