// ============================================================================
// tgrun-core/src/supervisor/mod.rs
// ============================================================================
//
// SUPERVISION: Running the tool and reporting what it does
//
// Two supervisors share one contract. Each owns at most one active run; a run
// reports every output line through `on_line`, in production order, and then
// reports exactly one RunOutcome through `on_exit`. Failures after launch are
// delivered the same way as success (a diagnostic line plus exit code 1), so
// callers have a single completion path.
//
// Callbacks normally run on the run's worker thread; an in-process run may
// also deliver lines on a thread that wrote output or called terminate(). A
// run never invokes its callbacks concurrently. Use crate::dispatch to move
// them onto a thread of your choosing.

// ---- External crate imports ----
use serde::Serialize;

// ---- Internal crate imports ----
use crate::error::CoreResult;
use crate::plan::InvocationPlan;

pub mod in_process;
pub mod process;

pub use in_process::InProcessSupervisor;
pub use process::ProcessSupervisor;

/// Receives one output line, without its terminator.
pub type LineCallback = Box<dyn FnMut(String) + Send>;

/// Receives the outcome of a run. Called exactly once.
pub type ExitCallback = Box<dyn FnOnce(RunOutcome) + Send>;

/// Final result of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub exit_code: i32,
    /// There is no timeout mechanism; always `false`.
    pub timed_out: bool,
    /// `terminate()` was called while the run was active.
    pub was_cancelled: bool,
}

impl RunOutcome {
    pub fn new(exit_code: i32, was_cancelled: bool) -> Self {
        Self {
            exit_code,
            timed_out: false,
            was_cancelled,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Common interface of [`ProcessSupervisor`] and [`InProcessSupervisor`].
pub trait Supervisor: Send + Sync {
    /// Starts a run of `plan`.
    ///
    /// Returns [`crate::CoreError::AlreadyRunning`] without side effects if a
    /// run is active. Everything that goes wrong after this returns `Ok` is
    /// reported through the callbacks.
    fn start(
        &self,
        plan: &InvocationPlan,
        on_line: LineCallback,
        on_exit: ExitCallback,
    ) -> CoreResult<()>;

    /// Requests the active run to stop. Idempotent, never blocks, no-op when
    /// nothing is running.
    fn terminate(&self);

    fn is_running(&self) -> bool;
}
