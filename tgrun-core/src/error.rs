// ============================================================================
// tgrun-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error types for the tgrun core library
//
// Resolution and exclusivity errors are returned synchronously from `start`.
// Launch and runtime failures never escape a supervisor: they are turned into
// a diagnostic line plus exit code 1 on the run's callback channel, and only
// their message text is built from the variants below.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the tgrun core library.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Neither an executable nor an in-process entry point was found.
    #[error("{0} is not available as an executable or as an in-process module")]
    ToolUnavailable(String),

    /// A run is already active on this supervisor.
    #[error("A run is already in progress. Stop it before starting a new one.")]
    AlreadyRunning,

    /// The external command could not be spawned.
    #[error("Failed to launch process: {0}")]
    LaunchFailure(String),

    /// The in-process entry point failed.
    #[error("Runtime failure: {0}")]
    RuntimeFailure(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for tgrun core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds a launch failure from the program name and the spawn error.
pub(crate) fn launch_error(program: &str, err: &std::io::Error) -> CoreError {
    let reason = match err.kind() {
        std::io::ErrorKind::NotFound => format!("{program}: command not found"),
        std::io::ErrorKind::PermissionDenied => format!("{program}: permission denied"),
        _ => format!("{program}: {err}"),
    };
    CoreError::LaunchFailure(reason)
}
