// ============================================================================
// tgrun-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Fluent construction of CoreConfig starting from its defaults. Validation is
// left to CoreConfig::validate so callers decide when a bad value is fatal.

// ---- Standard library imports ----
use std::path::PathBuf;

// ---- Internal crate imports ----
use super::CoreConfig;

/// Builder for creating CoreConfig instances.
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    /// Creates a builder holding the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the executable name looked up on the search path.
    pub fn tool_name(mut self, name: impl Into<String>) -> Self {
        self.config.tool_name = name.into();
        self
    }

    /// Sets the name of the in-process entry point.
    pub fn module_name(mut self, name: impl Into<String>) -> Self {
        self.config.module_name = name.into();
        self
    }

    /// Adds one directory to search before `PATH`.
    pub fn extra_search_dir(mut self, dir: PathBuf) -> Self {
        self.config.extra_search_dirs.push(dir);
        self
    }

    /// Adds several directories to search before `PATH`.
    pub fn extra_search_dirs(mut self, dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        self.config.extra_search_dirs.extend(dirs);
        self
    }

    pub fn working_directory(mut self, dir: Option<PathBuf>) -> Self {
        self.config.working_directory = dir;
        self
    }

    pub fn echo_command(mut self, echo: bool) -> Self {
        self.config.echo_command = echo;
        self
    }

    /// Builds the CoreConfig instance.
    pub fn build(self) -> CoreConfig {
        self.config
    }
}
