//! Core library for supervising the `tgradish` sticker converter and
//! estimating its progress.
//!
//! This crate resolves how the tool can be invoked (external executable or a
//! registered in-process entry point), runs it with its output streamed line
//! by line, infers a completion percentage from the ffmpeg diagnostics it
//! forwards, and reports exactly one outcome per run.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use tgrun_core::{CoreConfig, Dispatcher, EventHandler, ModuleRegistry, ProgressEstimator, RunOutcome, ToolRunner};
//! use tgrun_core::tool_args::{ConvertArgs, Operation};
//!
//! struct Printer(ProgressEstimator);
//!
//! impl EventHandler for Printer {
//!     fn on_line(&mut self, line: &str) {
//!         let state = self.0.observe(line);
//!         println!("[{:>3}%] {}", state.percent, line);
//!     }
//!     fn on_exit(&mut self, outcome: &RunOutcome) {
//!         println!("{}", self.0.finish(outcome.exit_code).status_text);
//!     }
//! }
//!
//! let runner = ToolRunner::new(CoreConfig::default(), ModuleRegistry::new()).unwrap();
//! let args = ConvertArgs::new("clip.mp4").output("sticker.webm");
//! args.validate().unwrap();
//!
//! let (dispatcher, sender) = Dispatcher::new();
//! let (on_line, on_exit) = sender.callbacks();
//! runner.start(args.to_args().unwrap(), on_line, on_exit).unwrap();
//!
//! let mut printer = Printer(ProgressEstimator::for_operation(Operation::Convert));
//! let outcome = dispatcher.run_until_exit(&mut printer).unwrap();
//! std::process::exit(outcome.exit_code);
//! ```

pub mod ambient;
pub mod config;
pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod file_logging;
pub mod lines;
pub mod module;
pub mod plan;
pub mod progress;
pub mod resolver;
pub mod runner;
pub mod supervisor;
pub mod tool_args;

// Re-exports for public API
pub use config::{CoreConfig, CoreConfigBuilder};
pub use dispatch::{DispatchSender, Dispatcher, EventHandler, RunEvent};
pub use error::{CoreError, CoreResult};
pub use module::{EntryPoint, ModuleRegistry};
pub use plan::{InvocationMode, InvocationPlan};
pub use progress::{ProgressEstimator, ProgressMode, ProgressState, advance};
pub use resolver::{CommandResolver, DependencyReport};
pub use runner::ToolRunner;
pub use supervisor::{
    ExitCallback, InProcessSupervisor, LineCallback, ProcessSupervisor, RunOutcome, Supervisor,
};
