// ============================================================================
// tgrun-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Error types and utilities for the CLI
//
// Commands return anyhow errors; core errors keep their type underneath the
// added context so the process exit code can still be derived from them.
//
// KEY COMPONENTS:
// - CliResult: Type alias for CLI operations
// - CliErrorContext: context strings on core results
// - exit_code_for: error -> process exit code

// ---- External crate imports ----
use anyhow::anyhow;

// ---- Internal crate imports ----
use tgrun_core::CoreError;

// ---- Standard library imports ----
use std::fmt;

/// Exit code for usage errors and a tool that cannot be run at all.
pub const EXIT_USAGE: i32 = 2;

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

pub type CliResult<T> = anyhow::Result<T>;

// ============================================================================
// ERROR CONVERSION UTILITIES
// ============================================================================

/// Extension trait for adding context to errors in the CLI.
pub trait CliErrorContext<T> {
    /// Add context to an error.
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display;

    /// Add context using a closure (for lazy evaluation).
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: Into<CoreError>,
{
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.map_err(|e| anyhow::Error::new(e.into()).context(context.to_string()))
    }

    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| anyhow::Error::new(e.into()).context(f().to_string()))
    }
}

impl<T> CliErrorContext<T> for Option<T> {
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.ok_or_else(|| anyhow!(context.to_string()))
    }

    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| anyhow!(f().to_string()))
    }
}

/// Maps an error to the process exit code: [`EXIT_USAGE`] when the request
/// itself cannot be honoured, 1 for everything else.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<CoreError>() {
        Some(
            CoreError::ToolUnavailable(_)
            | CoreError::InvalidArguments(_)
            | CoreError::InputNotFound(_)
            | CoreError::Config(_)
            | CoreError::AlreadyRunning,
        ) => EXIT_USAGE,
        _ => 1,
    }
}
