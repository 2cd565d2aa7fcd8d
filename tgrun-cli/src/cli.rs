// tgrun-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tgrun_core::config::{DEFAULT_MODULE_NAME, DEFAULT_TOOL_NAME};

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "tgrun: run the tgradish sticker converter with live progress",
    long_about = "Resolves tgradish as an executable or in-process module, runs convert/spoof \
                  with its output streamed line by line and estimates progress from ffmpeg's \
                  Duration/time markers."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Executable name looked up on the search path
    #[arg(long, global = true, env = "TGRUN_TOOL", default_value = DEFAULT_TOOL_NAME, value_name = "NAME")]
    pub tool: String,

    /// In-process module name used when no executable is found
    #[arg(long, global = true, env = "TGRUN_MODULE", default_value = DEFAULT_MODULE_NAME, value_name = "NAME")]
    pub module: String,

    /// Extra directory searched before PATH and added to the tool's PATH (repeatable)
    #[arg(long = "search-dir", global = true, value_name = "DIR")]
    pub search_dirs: Vec<PathBuf>,

    /// Do not print the `$ command` line before the tool's output
    #[arg(long, global = true)]
    pub no_echo: bool,

    /// Emit JSON lines instead of a progress bar
    #[arg(long, global = true)]
    pub json: bool,

    /// Write logs to this file instead of the console
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Converts a video or image into a sticker
    Convert(ConvertCommand),
    /// Rewrites a WebM sticker's metadata
    Spoof(SpoofCommand),
    /// Reports whether tgradish and ffmpeg can be found
    Check,
}

#[derive(Args, Debug)]
pub struct ConvertCommand {
    /// Input file
    #[arg(short = 'i', long = "input", required = true, value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file (tgradish picks a name when omitted)
    #[arg(short = 'o', long = "output", value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Extra tgradish arguments, split with shell quoting rules
    #[arg(long, default_value = "", allow_hyphen_values = true, value_name = "ARGS")]
    pub extra: String,
}

#[derive(Args, Debug)]
pub struct SpoofCommand {
    /// Input WebM file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output WebM file
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Extra tgradish arguments, split with shell quoting rules
    #[arg(long, default_value = "", allow_hyphen_values = true, value_name = "ARGS")]
    pub extra: String,
}
