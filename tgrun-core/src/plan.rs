//! Invocation plans produced by the [`crate::resolver::CommandResolver`].

use std::ffi::OsString;
use std::path::PathBuf;

/// How the tool will be invoked for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationMode {
    /// A separate operating-system process.
    External,
    /// The registered entry point, called inline in this process.
    InProcess,
    /// Neither form was found; nothing can be started.
    Unavailable,
}

/// A resolved, immutable description of how to run the tool once.
///
/// For [`InvocationMode::External`] the command head is the executable path,
/// for [`InvocationMode::InProcess`] it is the module name, and for
/// [`InvocationMode::Unavailable`] the command is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationPlan {
    mode: InvocationMode,
    command: Vec<String>,
    working_directory: Option<PathBuf>,
    search_dirs: Vec<PathBuf>,
}

impl InvocationPlan {
    pub fn external(program: impl Into<String>) -> Self {
        Self {
            mode: InvocationMode::External,
            command: vec![program.into()],
            working_directory: None,
            search_dirs: Vec::new(),
        }
    }

    pub fn in_process(module_name: impl Into<String>) -> Self {
        Self {
            mode: InvocationMode::InProcess,
            command: vec![module_name.into()],
            working_directory: None,
            search_dirs: Vec::new(),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            mode: InvocationMode::Unavailable,
            command: Vec::new(),
            working_directory: None,
            search_dirs: Vec::new(),
        }
    }

    /// Returns a copy with `args` appended after the existing command.
    pub fn with_args<I, S>(&self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut plan = self.clone();
        plan.command.extend(args.into_iter().map(Into::into));
        plan
    }

    pub fn with_working_directory(mut self, dir: Option<PathBuf>) -> Self {
        self.working_directory = dir;
        self
    }

    pub fn with_search_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.search_dirs = dirs;
        self
    }

    pub fn mode(&self) -> InvocationMode {
        self.mode
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    /// The executable path or module name.
    pub fn program(&self) -> Option<&str> {
        self.command.first().map(String::as_str)
    }

    /// Everything after the command head.
    pub fn args(&self) -> &[String] {
        self.command.get(1..).unwrap_or(&[])
    }

    pub fn working_directory(&self) -> Option<&PathBuf> {
        self.working_directory.as_ref()
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// `PATH` value for the child: the plan's search dirs followed by the
    /// inherited `PATH`. `None` when there is nothing to prepend.
    pub fn child_path_env(&self) -> Option<OsString> {
        if self.search_dirs.is_empty() {
            return None;
        }
        let inherited = std::env::var_os("PATH").unwrap_or_default();
        let dirs = self
            .search_dirs
            .iter()
            .cloned()
            .chain(std::env::split_paths(&inherited));
        std::env::join_paths(dirs).ok()
    }

    /// Shell-quoted rendering of the command, used for the echoed first line.
    pub fn display_command(&self) -> String {
        display_command(&self.command)
    }
}

/// Joins `parts` with spaces, quoting each one for a POSIX shell.
pub fn display_command(parts: &[String]) -> String {
    // Only a NUL byte can fail to quote, and no such argument reaches exec.
    shlex::try_join(parts.iter().map(String::as_str)).unwrap_or_else(|_| parts.join(" "))
}
