// ============================================================================
// tgrun-core/src/runner.rs
// ============================================================================
//
// TOOL RUNNER: Resolve once per run, then hand off to the right supervisor
//
// The runner owns a resolver and one supervisor per invocation mode. Each
// start resolves a fresh plan, so installing the tool or registering the
// module between runs takes effect immediately. terminate() and is_running()
// are forwarded to whichever supervisor holds the active run.

// ---- Internal crate imports ----
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::module::ModuleRegistry;
use crate::plan::{InvocationMode, InvocationPlan};
use crate::resolver::{CommandResolver, DependencyReport};
use crate::supervisor::{
    ExitCallback, InProcessSupervisor, LineCallback, ProcessSupervisor, Supervisor,
};

/// Entry point for running the tool with whatever invocation form is present.
///
/// # Examples
///
/// ```rust,no_run
/// use tgrun_core::{CoreConfig, Dispatcher, ModuleRegistry, ToolRunner};
/// use tgrun_core::tool_args::ConvertArgs;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let runner = ToolRunner::new(CoreConfig::default(), ModuleRegistry::new())?;
/// let (dispatcher, sender) = Dispatcher::new();
/// let (on_line, on_exit) = sender.callbacks();
/// runner.start(ConvertArgs::new("clip.mp4").to_args()?, on_line, on_exit)?;
/// # Ok(())
/// # }
/// ```
pub struct ToolRunner {
    resolver: CommandResolver,
    process: ProcessSupervisor,
    in_process: InProcessSupervisor,
}

impl ToolRunner {
    /// Validates `config` and builds both supervisors.
    pub fn new(config: CoreConfig, registry: ModuleRegistry) -> CoreResult<Self> {
        config.validate()?;
        let process = ProcessSupervisor::new(config.echo_command);
        let in_process =
            InProcessSupervisor::new(registry.clone(), config.module_name.clone(), config.echo_command);
        Ok(Self {
            resolver: CommandResolver::new(config, registry),
            process,
            in_process,
        })
    }

    pub fn resolve(&self) -> InvocationPlan {
        self.resolver.resolve()
    }

    pub fn resolver(&self) -> &CommandResolver {
        &self.resolver
    }

    pub fn dependency_report(&self) -> DependencyReport {
        self.resolver.dependency_report()
    }

    /// Resolves the tool and starts it with `args`.
    pub fn start(
        &self,
        args: Vec<String>,
        on_line: LineCallback,
        on_exit: ExitCallback,
    ) -> CoreResult<InvocationPlan> {
        if self.is_running() {
            return Err(CoreError::AlreadyRunning);
        }

        let plan = self.resolve().with_args(args);
        match plan.mode() {
            InvocationMode::External => self.process.start(&plan, on_line, on_exit)?,
            InvocationMode::InProcess => self.in_process.start(&plan, on_line, on_exit)?,
            InvocationMode::Unavailable => {
                let config = self.resolver.config();
                return Err(CoreError::ToolUnavailable(format!(
                    "{} (module '{}')",
                    config.tool_name, config.module_name
                )));
            }
        }
        Ok(plan)
    }

    pub fn terminate(&self) {
        self.process.terminate();
        self.in_process.terminate();
    }

    pub fn is_running(&self) -> bool {
        self.process.is_running() || self.in_process.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfigBuilder;

    #[test]
    fn unavailable_tool_is_rejected_synchronously() {
        let config = CoreConfigBuilder::new()
            .tool_name("tgrun-runner-missing-tool")
            .module_name("tgrun-runner-missing-module")
            .build();
        let runner = ToolRunner::new(config, ModuleRegistry::new()).unwrap();

        let result = runner.start(vec!["convert".into()], Box::new(|_| {}), Box::new(|_| {}));
        assert!(matches!(result, Err(CoreError::ToolUnavailable(_))));
        assert!(!runner.is_running());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = CoreConfigBuilder::new().tool_name("").build();
        assert!(matches!(
            ToolRunner::new(config, ModuleRegistry::new()),
            Err(CoreError::Config(_))
        ));
    }
}
