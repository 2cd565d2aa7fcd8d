// ============================================================================
// tgrun-core/src/resolver.rs
// ============================================================================
//
// COMMAND RESOLUTION: Deciding how the tool can be invoked
//
// The resolver looks for the tool first as an executable (extra search dirs,
// then PATH) and then as a registered in-process entry point. It has no side
// effects and can be called before every run; the answer only changes when
// the environment or the registry changes.

// ---- External crate imports ----
use serde::Serialize;

// ---- Standard library imports ----
use std::ffi::OsString;
use std::path::PathBuf;

// ---- Internal crate imports ----
use crate::config::{CoreConfig, FFMPEG_TOOL_NAME};
use crate::module::ModuleRegistry;
use crate::plan::InvocationPlan;

/// Availability summary for `tgrun check` and pre-run warnings.
#[derive(Debug, Clone, Serialize)]
pub struct DependencyReport {
    pub tool_name: String,
    /// Resolved executable path, if the tool is on the search path.
    pub tool_path: Option<PathBuf>,
    pub module_name: String,
    pub module_registered: bool,
    pub ffmpeg_path: Option<PathBuf>,
}

impl DependencyReport {
    pub fn tool_available(&self) -> bool {
        self.tool_path.is_some() || self.module_registered
    }

    pub fn ffmpeg_available(&self) -> bool {
        self.ffmpeg_path.is_some()
    }
}

/// Resolves an [`InvocationPlan`] for the configured tool.
#[derive(Debug, Clone)]
pub struct CommandResolver {
    config: CoreConfig,
    registry: ModuleRegistry,
}

impl CommandResolver {
    pub fn new(config: CoreConfig, registry: ModuleRegistry) -> Self {
        Self { config, registry }
    }

    /// Picks External, then InProcess, then Unavailable.
    pub fn resolve(&self) -> InvocationPlan {
        if let Some(path) = self.find_tool() {
            log::debug!("Resolved {} as executable: {path}", self.config.tool_name);
            return InvocationPlan::external(path)
                .with_working_directory(self.config.working_directory.clone())
                .with_search_dirs(self.config.extra_search_dirs.clone());
        }

        if self.has_module() {
            log::debug!("Resolved {} as in-process module", self.config.module_name);
            return InvocationPlan::in_process(self.config.module_name.clone())
                .with_working_directory(self.config.working_directory.clone());
        }

        log::debug!(
            "Neither executable '{}' nor module '{}' found",
            self.config.tool_name,
            self.config.module_name
        );
        InvocationPlan::unavailable()
    }

    pub fn has_cli(&self) -> bool {
        self.find_tool().is_some()
    }

    pub fn has_module(&self) -> bool {
        self.registry.contains(&self.config.module_name)
    }

    pub fn is_available(&self) -> bool {
        self.has_cli() || self.has_module()
    }

    pub fn has_ffmpeg(&self) -> bool {
        self.find_executable(FFMPEG_TOOL_NAME).is_some()
    }

    pub fn dependency_report(&self) -> DependencyReport {
        DependencyReport {
            tool_name: self.config.tool_name.clone(),
            tool_path: self.find_tool().map(PathBuf::from),
            module_name: self.config.module_name.clone(),
            module_registered: self.has_module(),
            ffmpeg_path: self.find_executable(FFMPEG_TOOL_NAME),
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// The tool's executable, skipped when its path is not valid UTF-8.
    fn find_tool(&self) -> Option<String> {
        let path = self.find_executable(&self.config.tool_name)?;
        match path.into_os_string().into_string() {
            Ok(path) => Some(path),
            Err(path) => {
                log::warn!("Ignoring {}: path is not valid UTF-8: {path:?}", self.config.tool_name);
                None
            }
        }
    }

    /// Looks `name` up in the extra search dirs followed by `PATH`.
    pub fn find_executable(&self, name: &str) -> Option<PathBuf> {
        if self.config.extra_search_dirs.is_empty() {
            return which::which(name).ok();
        }

        let search_path = search_path_with(&self.config.extra_search_dirs)?;
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        which::which_in(name, Some(search_path), cwd).ok()
    }
}

fn search_path_with(extra: &[PathBuf]) -> Option<OsString> {
    let inherited = std::env::var_os("PATH").unwrap_or_default();
    let dirs = extra
        .iter()
        .cloned()
        .chain(std::env::split_paths(&inherited))
        .filter(|dir| !dir.as_os_str().is_empty());
    std::env::join_paths(dirs).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfigBuilder;
    use crate::plan::InvocationMode;

    const MISSING_TOOL: &str = "tgrun-test-surely-missing-tool-31337";

    #[test]
    fn missing_tool_and_module_is_unavailable() {
        let config = CoreConfigBuilder::new()
            .tool_name(MISSING_TOOL)
            .module_name(MISSING_TOOL)
            .build();
        let resolver = CommandResolver::new(config, ModuleRegistry::new());

        let plan = resolver.resolve();
        assert_eq!(plan.mode(), InvocationMode::Unavailable);
        assert!(plan.command().is_empty());
        assert!(!resolver.is_available());
        assert!(!resolver.dependency_report().tool_available());
    }

    #[test]
    fn registered_module_resolves_in_process() {
        let registry = ModuleRegistry::new();
        registry.register("tgradish_test_module", || Ok(()));
        let config = CoreConfigBuilder::new()
            .tool_name(MISSING_TOOL)
            .module_name("tgradish_test_module")
            .build();
        let resolver = CommandResolver::new(config, registry);

        let plan = resolver.resolve();
        assert_eq!(plan.mode(), InvocationMode::InProcess);
        assert_eq!(plan.command(), ["tgradish_test_module"]);
        // Resolution is repeatable.
        assert_eq!(resolver.resolve(), plan);
    }

    #[cfg(unix)]
    #[test]
    fn executable_wins_over_module() {
        let registry = ModuleRegistry::new();
        registry.register("sh", || Ok(()));
        let config = CoreConfigBuilder::new().tool_name("sh").module_name("sh").build();
        let resolver = CommandResolver::new(config, registry);

        let plan = resolver.resolve();
        assert_eq!(plan.mode(), InvocationMode::External);
        assert!(plan.program().is_some_and(|p| p.ends_with("sh")));
    }
}
