// ============================================================================
// tgrun-cli/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: Rendering a run on the terminal or as JSON lines
//
// Both reporters are EventHandlers driven by the Dispatcher on the main
// thread, and both feed every line through a ProgressEstimator.
//
// KEY COMPONENTS:
// - ConsoleReporter: tool output on stdout, an indicatif spinner/bar on stderr
// - JsonReporter: one JSON object per line, progress change and exit
//
// The console bar never moves backwards even if the tool's reported position
// does; the JSON stream reports the estimator's values unchanged.

// ---- External crate imports ----
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tgrun_core::{EventHandler, ProgressEstimator, ProgressMode, ProgressState, RunOutcome};

// ---- Standard library imports ----
use std::io::{self, Write};
use std::time::Duration;

const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {msg} [{elapsed_precise}]";
const BAR_TEMPLATE: &str =
    "{spinner:.cyan} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% (eta {eta})";

// ============================================================================
// CONSOLE REPORTER
// ============================================================================

/// Prints tool output as-is and shows progress below it.
pub struct ConsoleReporter {
    estimator: ProgressEstimator,
    bar: ProgressBar,
    determinate: bool,
}

impl ConsoleReporter {
    pub fn new(estimator: ProgressEstimator) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template(SPINNER_TEMPLATE) {
            bar.set_style(style);
        }
        bar.set_message(estimator.state().status_text.clone());
        bar.enable_steady_tick(Duration::from_millis(120));
        Self {
            estimator,
            bar,
            determinate: false,
        }
    }

    fn switch_to_bar(&mut self) {
        self.bar.set_length(100);
        if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
            self.bar.set_style(style.progress_chars("=> "));
        }
        self.determinate = true;
    }
}

impl EventHandler for ConsoleReporter {
    fn on_line(&mut self, line: &str) {
        self.bar.suspend(|| println!("{line}"));

        let state = self.estimator.observe(line).clone();
        if state.mode == ProgressMode::Determinate {
            if !self.determinate {
                self.switch_to_bar();
            }
            let percent = u64::from(state.percent);
            if percent > self.bar.position() {
                self.bar.set_position(percent);
            }
        }
        self.bar.set_message(state.status_text);
    }

    fn on_exit(&mut self, outcome: &RunOutcome) {
        let state = self.estimator.finish(outcome.exit_code);
        let message = state.status_text.clone();
        if outcome.success() {
            if self.determinate {
                self.bar.set_position(100);
            }
            self.bar.finish_with_message(message);
        } else {
            self.bar.abandon_with_message(message);
        }
    }
}

// ============================================================================
// JSON REPORTER
// ============================================================================

/// Writes structured events for consumption by other programs.
pub struct JsonReporter {
    estimator: ProgressEstimator,
    output: Box<dyn Write + Send>,
    last: ProgressState,
}

impl JsonReporter {
    /// Create a JSON reporter that writes to stdout
    pub fn new(estimator: ProgressEstimator) -> Self {
        Self::with_writer(estimator, Box::new(io::stdout()))
    }

    /// Create a JSON reporter with a custom writer
    pub fn with_writer(estimator: ProgressEstimator, output: Box<dyn Write + Send>) -> Self {
        let last = estimator.state().clone();
        Self {
            estimator,
            output,
            last,
        }
    }

    fn timestamp() -> i64 {
        chrono::Utc::now().timestamp()
    }

    fn write_json(&mut self, value: serde_json::Value) {
        if let Ok(json_str) = serde_json::to_string(&value) {
            let _ = writeln!(self.output, "{json_str}");
            let _ = self.output.flush();
        }
    }
}

impl EventHandler for JsonReporter {
    fn on_line(&mut self, line: &str) {
        self.write_json(json!({
            "type": "line",
            "text": line,
            "timestamp": Self::timestamp(),
        }));

        let state = self.estimator.observe(line).clone();
        if state != self.last {
            self.write_json(json!({
                "type": "progress",
                "mode": state.mode,
                "percent": state.percent,
                "current_seconds": state.current_seconds,
                "total_seconds": state.total_seconds,
                "status": state.status_text,
                "timestamp": Self::timestamp(),
            }));
            self.last = state;
        }
    }

    fn on_exit(&mut self, outcome: &RunOutcome) {
        let status = self.estimator.finish(outcome.exit_code).status_text.clone();
        self.write_json(json!({
            "type": "exit",
            "exit_code": outcome.exit_code,
            "was_cancelled": outcome.was_cancelled,
            "timed_out": outcome.timed_out,
            "status": status,
            "timestamp": Self::timestamp(),
        }));
    }
}
