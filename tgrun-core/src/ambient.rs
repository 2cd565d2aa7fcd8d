// ============================================================================
// tgrun-core/src/ambient.rs
// ============================================================================
//
// AMBIENT I/O: Process-wide output channels and argument context
//
// In-process entry points do not receive their command line or output sinks
// as parameters; they use the functions in this module, the same way a
// standalone binary would use std::env::args and std::io::stdout. Outside an
// in-process run these fall through to the real process equivalents.
//
// While the InProcessSupervisor runs an entry point it installs a
// RedirectGuard, which swaps this state for captures that forward complete
// lines to the run's line callback. The guard also holds a process-wide
// region lock, so two redirected runs can never overlap, and puts back the
// previous state when dropped, whichever way the entry point finished.

// ---- External crate imports ----
use once_cell::sync::Lazy;

// ---- Standard library imports ----
use std::cell::Cell;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

// ---- Internal crate imports ----
use crate::lines::LineSplitter;
use crate::supervisor::LineCallback;

/// Line sink shared by the stdout and stderr captures of one run.
pub(crate) type SharedLineSink = Arc<LineSink>;

/// Payload carried by the unwind started in [`exit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitRequest(pub i32);

#[derive(Default)]
struct Pending {
    lines: VecDeque<String>,
    delivering: bool,
}

/// Ordered hand-off of a run's lines to its callback.
///
/// Writers only queue lines. Whichever thread finds no delivery in progress
/// drains the queue into the callback, and no lock a writer needs is held
/// while the callback runs, so the callback may call back into its
/// supervisor. The callback is never invoked concurrently.
pub(crate) struct LineSink {
    pending: Mutex<Pending>,
    callback: Mutex<LineCallback>,
}

impl LineSink {
    pub(crate) fn new(callback: LineCallback) -> SharedLineSink {
        Arc::new(Self {
            pending: Mutex::new(Pending::default()),
            callback: Mutex::new(callback),
        })
    }

    pub(crate) fn enqueue(&self, lines: impl IntoIterator<Item = String>) {
        self.lock_pending().lines.extend(lines);
    }

    pub(crate) fn send(&self, lines: impl IntoIterator<Item = String>) {
        self.enqueue(lines);
        self.deliver();
    }

    /// Drains the queue unless another delivery, possibly further up this
    /// thread's stack, is already doing so.
    pub(crate) fn deliver(&self) {
        {
            let mut pending = self.lock_pending();
            if pending.delivering || pending.lines.is_empty() {
                return;
            }
            pending.delivering = true;
        }
        let mut callback = self.callback.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            let line = {
                let mut pending = self.lock_pending();
                match pending.lines.pop_front() {
                    Some(line) => line,
                    None => {
                        pending.delivering = false;
                        return;
                    }
                }
            };
            log::trace!(target: "tgrun::output", "{line}");
            callback(line);
        }
    }

    /// Waits for any delivery in progress and delivers what is still queued.
    /// Nothing may be enqueued afterwards.
    pub(crate) fn flush(&self) {
        let mut callback = self.callback.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            let Some(line) = self.lock_pending().lines.pop_front() else {
                return;
            };
            log::trace!(target: "tgrun::output", "{line}");
            callback(line);
        }
    }

    fn lock_pending(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct Capture {
    splitter: LineSplitter,
    sink: SharedLineSink,
}

impl Capture {
    fn new(sink: SharedLineSink) -> Self {
        Self {
            splitter: LineSplitter::new(),
            sink,
        }
    }

    fn flush_partial(mut self) {
        self.sink.send(self.splitter.finish());
    }
}

#[derive(Default)]
struct AmbientState {
    stdout: Option<Capture>,
    stderr: Option<Capture>,
    args: Option<Vec<String>>,
    cancel: Option<Arc<AtomicBool>>,
}

static STATE: Lazy<Mutex<AmbientState>> = Lazy::new(|| Mutex::new(AmbientState::default()));

// Held for the whole lifetime of a RedirectGuard.
static REGION: Mutex<()> = Mutex::new(());

thread_local! {
    // Set on the thread that installed the active RedirectGuard.
    static OWNS_REDIRECT: Cell<bool> = const { Cell::new(false) };
}

fn lock_state() -> MutexGuard<'static, AmbientState> {
    STATE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Scoped redirection of the ambient state for one in-process run.
///
/// Dropping the guard flushes any unterminated output as a final line and
/// restores the state that was in place before [`RedirectGuard::install`].
pub struct RedirectGuard {
    saved: Option<AmbientState>,
    _region: MutexGuard<'static, ()>,
}

impl RedirectGuard {
    /// Blocks until no other redirection is active, then installs captures
    /// forwarding to `sink`, the argument vector `argv` and the run's
    /// cancellation flag.
    pub(crate) fn install(argv: Vec<String>, sink: SharedLineSink, cancel: Arc<AtomicBool>) -> Self {
        let region = REGION.lock().unwrap_or_else(PoisonError::into_inner);
        let redirected = AmbientState {
            stdout: Some(Capture::new(Arc::clone(&sink))),
            stderr: Some(Capture::new(sink)),
            args: Some(argv),
            cancel: Some(cancel),
        };
        let saved = std::mem::replace(&mut *lock_state(), redirected);
        OWNS_REDIRECT.with(|owns| owns.set(true));
        log::debug!("Ambient output redirected");
        Self {
            saved: Some(saved),
            _region: region,
        }
    }
}

impl Drop for RedirectGuard {
    fn drop(&mut self) {
        let previous = self.saved.take().unwrap_or_default();
        let redirected = std::mem::replace(&mut *lock_state(), previous);
        OWNS_REDIRECT.with(|owns| owns.set(false));
        for capture in [redirected.stdout, redirected.stderr].into_iter().flatten() {
            capture.flush_partial();
        }
        log::debug!("Ambient output restored");
    }
}

#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Writer for the ambient stdout or stderr. See [`stdout`] and [`stderr`].
pub struct AmbientWriter {
    stream: Stream,
}

impl Write for AmbientWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = lock_state();
        let capture = match self.stream {
            Stream::Stdout => state.stdout.as_mut(),
            Stream::Stderr => state.stderr.as_mut(),
        };
        match capture {
            Some(capture) => {
                // Queued under the state lock so concurrent writers keep their order.
                capture.sink.enqueue(capture.splitter.push(buf));
                let sink = Arc::clone(&capture.sink);
                drop(state);
                sink.deliver();
                Ok(buf.len())
            }
            None => {
                drop(state);
                match self.stream {
                    Stream::Stdout => io::stdout().write(buf),
                    Stream::Stderr => io::stderr().write(buf),
                }
            }
        }
    }

    /// Unterminated output stays buffered until its line ends or the run
    /// finishes; only the uncaptured streams are flushed here.
    fn flush(&mut self) -> io::Result<()> {
        match self.stream {
            Stream::Stdout => io::stdout().flush(),
            Stream::Stderr => io::stderr().flush(),
        }
    }
}

pub fn stdout() -> AmbientWriter {
    AmbientWriter {
        stream: Stream::Stdout,
    }
}

pub fn stderr() -> AmbientWriter {
    AmbientWriter {
        stream: Stream::Stderr,
    }
}

/// The current argument vector, program name first.
pub fn args() -> Vec<String> {
    lock_state()
        .args
        .clone()
        .unwrap_or_else(|| std::env::args().collect())
}

/// Whether an in-process run currently owns the ambient state.
pub fn is_redirected() -> bool {
    lock_state().args.is_some()
}

/// Whether the supervisor asked the running entry point to stop.
pub fn cancellation_requested() -> bool {
    lock_state()
        .cancel
        .as_ref()
        .is_some_and(|flag| flag.load(Ordering::SeqCst))
}

fn redirected_on_this_thread() -> bool {
    OWNS_REDIRECT.with(Cell::get)
}

/// Ends the current entry point with `code`.
///
/// On the thread running an in-process entry point this unwinds back to the
/// supervisor, which reports `code` as the exit code. Anywhere else,
/// including threads the entry point spawned, it exits the process.
pub fn exit(code: i32) -> ! {
    if redirected_on_this_thread() {
        std::panic::resume_unwind(Box::new(ExitRequest(code)));
    }
    std::process::exit(code)
}
