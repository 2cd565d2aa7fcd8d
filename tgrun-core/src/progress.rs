//! Progress estimation from the tool's output.
//!
//! The tool forwards ffmpeg's diagnostics, which announce the input length
//! once (`Duration: 00:01:40.00, start: ...`) and then report the encoder
//! position repeatedly (`frame=  12 ... time=00:00:50.00 ...`). The estimator
//! turns those markers into a percentage. Anything else is opaque text.
//!
//! Parsing is isolated in [`advance`], a side-effect free function of the
//! prior state and one line, so a change in the marker format only touches
//! this module.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::tool_args::Operation;

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Duration:\s*(\d+:\d+:\d+(?:\.\d*)?)").expect("duration marker regex")
});

static POSITION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"time=(\d+:\d+:\d+(?:\.\d*)?)").expect("position marker regex"));

pub const STATUS_PREPARING: &str = "Preparing…";
pub const STATUS_CONVERTING: &str = "Converting…";
pub const STATUS_RUNNING: &str = "Running…";
pub const STATUS_DONE: &str = "Done";

/// Whether a total duration is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressMode {
    /// No total known; render an activity indicator, not `percent`.
    Indeterminate,
    Determinate,
}

/// Progress of one run as inferred from its output so far.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressState {
    pub mode: ProgressMode,
    pub total_seconds: Option<f64>,
    pub current_seconds: f64,
    /// 0–100; only meaningful in [`ProgressMode::Determinate`].
    pub percent: u8,
    pub status_text: String,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::with_status(STATUS_PREPARING)
    }
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_status(status: &str) -> Self {
        Self {
            mode: ProgressMode::Indeterminate,
            total_seconds: None,
            current_seconds: 0.0,
            percent: 0,
            status_text: status.to_string(),
        }
    }

    pub fn is_determinate(&self) -> bool {
        self.mode == ProgressMode::Determinate
    }
}

/// Computes the state after observing `line`.
///
/// The first well-formed `Duration:` marker fixes the total and switches to
/// determinate mode; later ones are ignored. A `time=` marker updates the
/// position once the total is known. Malformed markers change nothing.
pub fn advance(prior: &ProgressState, line: &str) -> ProgressState {
    let mut next = prior.clone();

    if next.total_seconds.is_none() {
        if let Some(total) = find_marker(&DURATION_RE, line).filter(|total| *total > 0.0) {
            next.total_seconds = Some(total);
            next.mode = ProgressMode::Determinate;
            next.current_seconds = 0.0;
            next.percent = 0;
            next.status_text = STATUS_CONVERTING.to_string();
        }
    }

    if let Some(total) = next.total_seconds {
        if let Some(current) = find_marker(&POSITION_RE, line) {
            next.current_seconds = current;
            next.percent = percent_of(current, total);
        }
    }

    next
}

/// `clamp(round(current / total * 100), 0, 100)`.
pub fn percent_of(current_seconds: f64, total_seconds: f64) -> u8 {
    if total_seconds <= 0.0 {
        return 0;
    }
    (current_seconds / total_seconds * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Parses `H:MM:SS` or `H:MM:SS.frac` into seconds.
///
/// Hours may have any width; minutes and seconds must be exactly two digits
/// and a decimal point must be followed by at least one digit.
pub fn parse_timestamp(text: &str) -> Option<f64> {
    let mut parts = text.split(':');
    let (hours, minutes, seconds) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let (whole_secs, fraction) = match seconds.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (seconds, None),
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(hours)
        || minutes.len() != 2
        || !all_digits(minutes)
        || whole_secs.len() != 2
        || !all_digits(whole_secs)
        || fraction.is_some_and(|f| !all_digits(f))
    {
        return None;
    }

    let hours = hours.parse::<u64>().ok()? as f64;
    let minutes = minutes.parse::<u32>().ok()?;
    let seconds = seconds.parse::<f64>().ok()?;
    Some(hours * 3600.0 + f64::from(minutes) * 60.0 + seconds)
}

fn find_marker(re: &Regex, line: &str) -> Option<f64> {
    let caps = re.captures(line)?;
    parse_timestamp(caps.get(1)?.as_str())
}

/// Formats seconds as `HH:MM:SS` for log output.
pub fn format_duration_seconds(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

/// Stateful wrapper around [`advance`] owned by whoever consumes a run's lines.
#[derive(Debug, Clone)]
pub struct ProgressEstimator {
    state: ProgressState,
    enabled: bool,
    last_logged_threshold: i32,
}

impl Default for ProgressEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressEstimator {
    /// An estimator that parses progress markers.
    pub fn new() -> Self {
        Self {
            state: ProgressState::new(),
            enabled: true,
            last_logged_threshold: -1,
        }
    }

    /// `convert` runs report ffmpeg markers; `spoof` runs have nothing to
    /// measure and stay indeterminate.
    pub fn for_operation(operation: Operation) -> Self {
        match operation {
            Operation::Convert => Self::new(),
            Operation::Spoof => Self {
                state: ProgressState::with_status(STATUS_RUNNING),
                enabled: false,
                last_logged_threshold: -1,
            },
        }
    }

    pub fn observe(&mut self, line: &str) -> &ProgressState {
        if !self.enabled {
            return &self.state;
        }

        let next = advance(&self.state, line);
        if next.is_determinate() && !self.state.is_determinate() {
            log::debug!(
                "Total duration discovered: {}",
                format_duration_seconds(next.total_seconds.unwrap_or_default())
            );
        }
        self.state = next;
        self.log_progress_if_needed();
        &self.state
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    /// Records the run's exit code in the status.
    pub fn finish(&mut self, exit_code: i32) -> &ProgressState {
        if exit_code == 0 {
            self.state.percent = 100;
            self.state.status_text = STATUS_DONE.to_string();
        } else {
            self.state.status_text = format!("Failed (code {exit_code})");
        }
        &self.state
    }

    /// Logs at every 10% step and at completion.
    fn log_progress_if_needed(&mut self) {
        if !self.state.is_determinate() {
            return;
        }
        let threshold = i32::from(self.state.percent / 10) * 10;
        if threshold > self.last_logged_threshold {
            log::info!(
                target: "tgrun::progress",
                "Conversion progress: {}% complete | Time: {} / {}",
                self.state.percent,
                format_duration_seconds(self.state.current_seconds),
                format_duration_seconds(self.state.total_seconds.unwrap_or_default()),
            );
            self.last_logged_threshold = threshold;
        }
    }
}
