// ============================================================================
// tgrun-core/src/supervisor/in_process.rs
// ============================================================================
//
// IN-PROCESS MODE: Running the tool's entry point inside this process
//
// The entry point runs on a worker thread inside a RedirectGuard scope, so
// everything it writes to the ambient stdout/stderr reaches `on_line` and
// ambient::args() returns the run's command line. How the entry point ends
// decides the exit code:
//
//   Ok(())                 -> 0
//   ambient::exit(code)    -> code
//   Err(..) or a panic     -> 1, with one diagnostic line
//
// The guard is released before the outcome is reported, on every path.
// Termination is advisory only: the flag is visible through
// ambient::cancellation_requested() and the entry point decides when to stop.

// ---- Standard library imports ----
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

// ---- Internal crate imports ----
use super::{ExitCallback, LineCallback, RunOutcome, Supervisor};
use crate::ambient::{ExitRequest, LineSink, RedirectGuard, SharedLineSink};
use crate::error::{CoreError, CoreResult};
use crate::module::{EntryPoint, ModuleRegistry};
use crate::plan::{InvocationMode, InvocationPlan, display_command};

/// Line emitted when termination is requested for an in-process run.
pub const TERMINATE_NOTICE: &str =
    "Stopping the in-process tool is not fully supported; waiting for it to finish...";

struct ActiveRun {
    cancel: Arc<AtomicBool>,
    sink: SharedLineSink,
}

/// Supervises one in-process entry point invocation at a time.
pub struct InProcessSupervisor {
    registry: ModuleRegistry,
    module_name: String,
    echo_command: bool,
    active: Arc<Mutex<Option<ActiveRun>>>,
}

impl InProcessSupervisor {
    pub fn new(registry: ModuleRegistry, module_name: impl Into<String>, echo_command: bool) -> Self {
        Self {
            registry,
            module_name: module_name.into(),
            echo_command,
            active: Arc::new(Mutex::new(None)),
        }
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Runs the configured module with `args` as its command-line tail.
    pub fn start_with_args(
        &self,
        args: Vec<String>,
        on_line: LineCallback,
        on_exit: ExitCallback,
    ) -> CoreResult<()> {
        self.start_module(&self.module_name, args, on_line, on_exit)
    }

    fn start_module(
        &self,
        module: &str,
        args: Vec<String>,
        on_line: LineCallback,
        on_exit: ExitCallback,
    ) -> CoreResult<()> {
        let mut active = self.lock_active();
        if active.is_some() {
            return Err(CoreError::AlreadyRunning);
        }

        let entry = self
            .registry
            .get(module)
            .ok_or_else(|| CoreError::ToolUnavailable(module.to_string()))?;

        let argv: Vec<String> = std::iter::once(module.to_string()).chain(args).collect();
        let cancel = Arc::new(AtomicBool::new(false));
        let sink = LineSink::new(on_line);
        let worker = Worker {
            argv,
            entry,
            echo_command: self.echo_command,
            cancel: Arc::clone(&cancel),
            sink: Arc::clone(&sink),
            active: Arc::clone(&self.active),
        };

        log::info!("Starting in-process module '{module}'");
        thread::Builder::new()
            .name("tgrun-in-process".to_string())
            .spawn(move || worker.run(on_exit))?;

        *active = Some(ActiveRun { cancel, sink });
        Ok(())
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<ActiveRun>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Supervisor for InProcessSupervisor {
    fn start(
        &self,
        plan: &InvocationPlan,
        on_line: LineCallback,
        on_exit: ExitCallback,
    ) -> CoreResult<()> {
        match (plan.mode(), plan.program()) {
            (InvocationMode::InProcess, Some(module)) => {
                self.start_module(module, plan.args().to_vec(), on_line, on_exit)
            }
            (InvocationMode::Unavailable, _) | (_, None) => {
                Err(CoreError::ToolUnavailable(self.module_name.clone()))
            }
            (InvocationMode::External, _) => Err(CoreError::InvalidArguments(
                "an external plan cannot be run in-process".to_string(),
            )),
        }
    }

    /// Sets the advisory flag and emits [`TERMINATE_NOTICE`] once per run.
    ///
    /// Safe to call from the run's own `on_line` callback.
    fn terminate(&self) {
        let sink = {
            let active = self.lock_active();
            let Some(run) = active.as_ref() else {
                return;
            };
            if run.cancel.load(Ordering::SeqCst) {
                return;
            }
            log::warn!("{TERMINATE_NOTICE}");
            // Queued before the flag is raised, so output written in reaction
            // to the flag comes after the notice. The run cannot report its
            // exit before delivering it.
            run.sink.enqueue([TERMINATE_NOTICE.to_string()]);
            run.cancel.store(true, Ordering::SeqCst);
            Arc::clone(&run.sink)
        };
        sink.deliver();
    }

    fn is_running(&self) -> bool {
        self.lock_active().is_some()
    }
}

struct Worker {
    argv: Vec<String>,
    entry: Arc<dyn EntryPoint>,
    echo_command: bool,
    cancel: Arc<AtomicBool>,
    sink: SharedLineSink,
    active: Arc<Mutex<Option<ActiveRun>>>,
}

impl Worker {
    fn run(self, on_exit: ExitCallback) {
        if self.echo_command {
            self.emit(format!("$ {}", display_command(&self.argv)));
        }

        let result = {
            let _guard = RedirectGuard::install(
                self.argv.clone(),
                Arc::clone(&self.sink),
                Arc::clone(&self.cancel),
            );
            let entry = Arc::clone(&self.entry);
            panic::catch_unwind(AssertUnwindSafe(move || entry.run()))
        };

        let exit_code = match result {
            Ok(Ok(())) => 0,
            Ok(Err(e)) => self.runtime_failure(format!("{e:#}")),
            Err(payload) => match payload.downcast_ref::<ExitRequest>() {
                Some(ExitRequest(code)) => *code,
                None => self.runtime_failure(panic_message(payload.as_ref())),
            },
        };

        let outcome = RunOutcome::new(exit_code, self.cancel.load(Ordering::SeqCst));
        log::info!("In-process module finished with exit code {}", outcome.exit_code);

        *self.active.lock().unwrap_or_else(PoisonError::into_inner) = None;
        self.sink.flush();
        on_exit(outcome);
    }

    fn runtime_failure(&self, message: String) -> i32 {
        let err = CoreError::RuntimeFailure(message);
        log::error!("{err}");
        self.emit(err.to_string());
        1
    }

    fn emit(&self, line: String) {
        self.sink.send([line]);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}
