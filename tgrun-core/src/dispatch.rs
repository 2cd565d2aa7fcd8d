//! Moving run events from a supervisor's worker thread onto a thread of the
//! caller's choosing.
//!
//! A [`DispatchSender`] turns into the `(on_line, on_exit)` callback pair a
//! supervisor expects; every event goes into an unbounded channel, so nothing
//! is dropped and the worker never waits on the consumer. The [`Dispatcher`]
//! stays on the designated thread and hands events to an [`EventHandler`] in
//! the order they were produced.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::error::{CoreError, CoreResult};
use crate::supervisor::{ExitCallback, LineCallback, RunOutcome};

/// One event of a run. `Exit` is always the last event of its run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    Line(String),
    Exit(RunOutcome),
}

/// Consumer of run events on the designated thread.
pub trait EventHandler {
    fn on_line(&mut self, line: &str);
    fn on_exit(&mut self, outcome: &RunOutcome);
}

/// Producer half. Cheap to clone and safe to move to any thread.
#[derive(Debug, Clone)]
pub struct DispatchSender {
    tx: Sender<RunEvent>,
}

impl DispatchSender {
    pub fn send(&self, event: RunEvent) {
        // Fails only once the dispatcher is gone, when nobody is listening.
        let _ = self.tx.send(event);
    }

    /// Callbacks for [`crate::supervisor::Supervisor::start`].
    pub fn callbacks(&self) -> (LineCallback, ExitCallback) {
        let line_tx = self.clone();
        let exit_tx = self.clone();
        (
            Box::new(move |line| line_tx.send(RunEvent::Line(line))),
            Box::new(move |outcome| exit_tx.send(RunEvent::Exit(outcome))),
        )
    }
}

/// Consumer half, owned by the designated thread.
#[derive(Debug)]
pub struct Dispatcher {
    rx: Receiver<RunEvent>,
}

impl Dispatcher {
    pub fn new() -> (Dispatcher, DispatchSender) {
        let (tx, rx) = mpsc::channel();
        (Dispatcher { rx }, DispatchSender { tx })
    }

    /// Delivers every event already queued without blocking. Returns the
    /// outcome if an `Exit` event was among them; delivery stops after it.
    pub fn try_dispatch(&self, handler: &mut dyn EventHandler) -> Option<RunOutcome> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    if let Some(outcome) = deliver(handler, event) {
                        return Some(outcome);
                    }
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return None,
            }
        }
    }

    /// Blocks, delivering events as they arrive, until the run exits.
    pub fn run_until_exit(&self, handler: &mut dyn EventHandler) -> CoreResult<RunOutcome> {
        for event in self.rx.iter() {
            if let Some(outcome) = deliver(handler, event) {
                return Ok(outcome);
            }
        }
        Err(CoreError::RuntimeFailure(
            "event channel closed before the run exited".to_string(),
        ))
    }
}

fn deliver(handler: &mut dyn EventHandler, event: RunEvent) -> Option<RunOutcome> {
    match event {
        RunEvent::Line(line) => {
            handler.on_line(&line);
            None
        }
        RunEvent::Exit(outcome) => {
            handler.on_exit(&outcome);
            Some(outcome)
        }
    }
}
