// ============================================================================
// tgrun-core/src/file_logging.rs
// ============================================================================
//
// FILE LOGGING: Persisting a session's log records
//
// `tgrun --log-file` sends every record to a file instead of the console.
// Tool output is logged at trace level under the `tgrun::output` target, so a
// file at trace level doubles as a transcript of the run.

// ---- External crate imports ----
use anyhow::{Context, Result};
use log::LevelFilter;
use log4rs::{
    append::file::FileAppender,
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};

// ---- Standard library imports ----
use std::path::{Path, PathBuf};

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} [{l}] {m}{n}";
const APPENDER: &str = "session_file";

/// Installs the global logger, appending records at `log_level` and above
/// to `log_file`. Missing parent directories are created.
///
/// Fails if a global logger is already installed.
pub fn setup_file_logging(log_file: &Path, log_level: LevelFilter) -> Result<()> {
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create log directory {}", parent.display()))?;
    }

    let appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(log_file)
        .with_context(|| format!("Cannot open log file {}", log_file.display()))?;

    let config = Config::builder()
        .appender(Appender::builder().build(APPENDER, Box::new(appender)))
        .build(Root::builder().appender(APPENDER).build(log_level))?;
    log4rs::init_config(config)?;

    log::debug!("Logging to {}", log_file.display());
    Ok(())
}

/// `<dir>/tgrun_<YYYYmmdd_HHMMSS>.log`
pub fn default_log_path(dir: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("tgrun_{stamp}.log"))
}
