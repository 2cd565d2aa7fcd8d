// ============================================================================
// tgrun-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console or file logging for the tgrun binary
//
// Console logging uses env_logger and honours RUST_LOG; without it the level
// is `info` (`debug` with -v). With --log-file, everything goes to the file
// through tgrun-core's log4rs setup instead.
//
// The tool's own output lines are logged at trace level under the target
// `tgrun::output`, so RUST_LOG=tgrun::output=trace mirrors them into the log.

use anyhow::Result;
use log::LevelFilter;
use std::io::Write;
use std::path::Path;

pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Initializes logging for the process. Call once, before any run starts.
///
/// A `log_file` naming an existing directory gets a timestamped file inside it.
pub fn init_logging(log_file: Option<&Path>, verbose: bool) -> Result<()> {
    let level = level_for(verbose);
    match log_file {
        Some(dir) if dir.is_dir() => {
            let path = tgrun_core::file_logging::default_log_path(dir);
            tgrun_core::file_logging::setup_file_logging(&path, level)
        }
        Some(path) => tgrun_core::file_logging::setup_file_logging(path, level),
        None => {
            env_logger::Builder::new()
                .filter_level(level)
                .parse_default_env()
                .format(|buf, record| {
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                })
                .try_init()?;
            Ok(())
        }
    }
}
