// ============================================================================
// tgrun-core/src/supervisor/process.rs
// ============================================================================
//
// EXTERNAL MODE: Running the tool as a child process
//
// The child's stdout and stderr share one pipe, so diagnostics and regular
// output arrive interleaved in the order the child wrote them. A worker
// thread per run spawns the child, forwards one line at a time, then reaps it
// and reports the exit code.
//
// Termination sends SIGTERM (a plain kill on other platforms). The child
// handle lives behind a mutex that the reaper releases between polls, so a
// signal can only ever reach a process that has not been reaped yet.

// ---- Standard library imports ----
use std::io::{self, BufRead, BufReader, PipeReader};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

// ---- Internal crate imports ----
use super::{ExitCallback, LineCallback, RunOutcome, Supervisor};
use crate::error::{CoreError, CoreResult, launch_error};
use crate::lines::{LineSplitter, next_terminator};
use crate::plan::{InvocationMode, InvocationPlan};

const REAP_POLL_INTERVAL: Duration = Duration::from_millis(25);

type ChildSlot = Arc<Mutex<Option<Child>>>;

struct ActiveRun {
    child: ChildSlot,
    cancel: Arc<AtomicBool>,
}

/// Supervises one external process at a time.
pub struct ProcessSupervisor {
    echo_command: bool,
    active: Arc<Mutex<Option<ActiveRun>>>,
}

impl Default for ProcessSupervisor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ProcessSupervisor {
    /// With `echo_command`, the first line of every run is `$ <command>`.
    pub fn new(echo_command: bool) -> Self {
        Self {
            echo_command,
            active: Arc::new(Mutex::new(None)),
        }
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<ActiveRun>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Supervisor for ProcessSupervisor {
    fn start(
        &self,
        plan: &InvocationPlan,
        on_line: LineCallback,
        on_exit: ExitCallback,
    ) -> CoreResult<()> {
        match plan.mode() {
            InvocationMode::External => {}
            InvocationMode::Unavailable => {
                return Err(CoreError::ToolUnavailable(
                    "no executable to start".to_string(),
                ));
            }
            InvocationMode::InProcess => {
                return Err(CoreError::InvalidArguments(
                    "an in-process plan cannot be run as a child process".to_string(),
                ));
            }
        }

        let mut active = self.lock_active();
        if active.is_some() {
            return Err(CoreError::AlreadyRunning);
        }

        let child: ChildSlot = Arc::new(Mutex::new(None));
        let cancel = Arc::new(AtomicBool::new(false));
        let worker = Worker {
            plan: plan.clone(),
            echo_command: self.echo_command,
            child: Arc::clone(&child),
            cancel: Arc::clone(&cancel),
            active: Arc::clone(&self.active),
        };

        log::info!("Starting {}", plan.display_command());
        thread::Builder::new()
            .name("tgrun-process".to_string())
            .spawn(move || worker.run(on_line, on_exit))?;

        *active = Some(ActiveRun { child, cancel });
        Ok(())
    }

    fn terminate(&self) {
        let active = self.lock_active();
        let Some(run) = active.as_ref() else {
            return;
        };
        if run.cancel.swap(true, Ordering::SeqCst) {
            return;
        }

        let mut child = run.child.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(child) = child.as_mut() {
            log::info!("Requesting termination of process {}", child.id());
            if let Err(e) = request_termination(child) {
                log::warn!("Failed to signal process {}: {}", child.id(), e);
            }
        }
    }

    fn is_running(&self) -> bool {
        self.lock_active().is_some()
    }
}

struct Worker {
    plan: InvocationPlan,
    echo_command: bool,
    child: ChildSlot,
    cancel: Arc<AtomicBool>,
    active: Arc<Mutex<Option<ActiveRun>>>,
}

impl Worker {
    fn run(self, mut on_line: LineCallback, on_exit: ExitCallback) {
        if self.echo_command {
            self.deliver(vec![format!("$ {}", self.plan.display_command())], &mut on_line);
        }

        let exit_code = match spawn_child(&self.plan) {
            Ok((child, output)) => {
                self.adopt(child);
                self.forward_lines(output, &mut on_line);
                self.reap()
            }
            Err(e) => {
                let err = launch_error(self.plan.program().unwrap_or_default(), &e);
                log::warn!("{err}");
                self.deliver(vec![err.to_string()], &mut on_line);
                1
            }
        };

        let outcome = RunOutcome::new(exit_code, self.cancel.load(Ordering::SeqCst));
        log::info!("Process finished with exit code {}", outcome.exit_code);

        // The slot is free before on_exit so the callback may start a new run.
        *self.active.lock().unwrap_or_else(PoisonError::into_inner) = None;
        on_exit(outcome);
    }

    fn adopt(&self, mut child: Child) {
        let mut slot = self.child.lock().unwrap_or_else(PoisonError::into_inner);
        log::debug!("Spawned process {}", child.id());
        // terminate() may have run before the child existed.
        if self.cancel.load(Ordering::SeqCst) {
            if let Err(e) = request_termination(&mut child) {
                log::warn!("Failed to signal process {}: {}", child.id(), e);
            }
        }
        *slot = Some(child);
    }

    /// Reads until every writer of the pipe is gone. After cancellation the
    /// output is still drained so the child never blocks on a full pipe, but
    /// nothing more is forwarded.
    fn forward_lines(&self, output: PipeReader, on_line: &mut LineCallback) {
        let mut reader = BufReader::new(output);
        let mut splitter = LineSplitter::new();

        loop {
            let chunk = match reader.fill_buf() {
                Ok(chunk) => chunk,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::debug!("Output pipe read failed: {e}");
                    break;
                }
            };
            if chunk.is_empty() {
                break;
            }

            let take = next_terminator(chunk).unwrap_or(chunk.len());
            let lines = splitter.push(&chunk[..take]);
            reader.consume(take);
            self.deliver(lines, on_line);
        }

        self.deliver(splitter.finish().into_iter().collect(), on_line);
    }

    fn deliver(&self, lines: Vec<String>, on_line: &mut LineCallback) {
        if self.cancel.load(Ordering::SeqCst) {
            return;
        }
        for line in lines {
            log::trace!(target: "tgrun::output", "{line}");
            on_line(line);
        }
    }

    fn reap(&self) -> i32 {
        loop {
            {
                let mut slot = self.child.lock().unwrap_or_else(PoisonError::into_inner);
                let Some(child) = slot.as_mut() else {
                    return 1;
                };
                match child.try_wait() {
                    Ok(Some(status)) => {
                        *slot = None;
                        return exit_code(status);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        log::error!("Error waiting for process {}: {}", child.id(), e);
                        *slot = None;
                        return 1;
                    }
                }
            }
            thread::sleep(REAP_POLL_INTERVAL);
        }
    }
}

/// Spawns the plan's command with stdout and stderr joined into one pipe.
fn spawn_child(plan: &InvocationPlan) -> io::Result<(Child, PipeReader)> {
    let program = plan
        .program()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "empty command"))?;

    let (reader, writer) = io::pipe()?;
    let mut command = Command::new(program);
    command
        .args(plan.args())
        .stdin(Stdio::null())
        .stdout(writer.try_clone()?)
        .stderr(writer);
    if let Some(dir) = plan.working_directory() {
        command.current_dir(dir);
    }
    if let Some(path) = plan.child_path_env() {
        command.env("PATH", path);
    }

    let child = command.spawn()?;
    // The command still owns our copies of the write end; EOF needs them gone.
    drop(command);
    Ok((child, reader))
}

/// Exit code as a shell reports it: `128 + signal` for a signalled child.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

#[cfg(unix)]
fn request_termination(child: &mut Child) -> io::Result<()> {
    let pid = libc::pid_t::try_from(child.id())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?;
    // SAFETY: the child has not been reaped (callers hold its slot), so the
    // pid still refers to it.
    let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn request_termination(child: &mut Child) -> io::Result<()> {
    child.kill()
}
