// tgrun-cli/src/lib.rs
//
// Library portion of the tgrun CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod progress;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, ConvertCommand, GlobalArgs, SpoofCommand};
pub use commands::check::run_check;
pub use commands::run::{run_convert, run_spoof, run_tool};
