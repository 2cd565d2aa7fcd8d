//! In-process entry points.
//!
//! An entry point is the tool's `main` compiled into the current binary. It
//! reads its command line from [`crate::ambient::args`], writes through
//! [`crate::ambient::stdout`] / [`crate::ambient::stderr`] and may request a
//! specific exit status with [`crate::ambient::exit`]. The registry is what the
//! resolver consults when deciding whether the tool is "importable".

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// The tool's entry point, invoked inline by the in-process supervisor.
pub trait EntryPoint: Send + Sync {
    /// Runs the tool to completion. `Ok` maps to exit code 0, `Err` to 1.
    fn run(&self) -> anyhow::Result<()>;
}

impl<F> EntryPoint for F
where
    F: Fn() -> anyhow::Result<()> + Send + Sync,
{
    fn run(&self) -> anyhow::Result<()> {
        self()
    }
}

/// Name-indexed table of entry points available in this process.
///
/// Cloning is cheap and clones share the same table.
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    modules: Arc<RwLock<HashMap<String, Arc<dyn EntryPoint>>>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a `main`-like closure under `name`, replacing any previous
    /// registration.
    pub fn register<F>(&self, name: impl Into<String>, main: F)
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register_entry(name, Arc::new(main));
    }

    pub fn register_entry(&self, name: impl Into<String>, entry: Arc<dyn EntryPoint>) {
        let name = name.into();
        log::debug!("Registering in-process module '{name}'");
        self.modules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, entry);
    }

    pub fn unregister(&self, name: &str) -> bool {
        self.modules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn EntryPoint>> {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modules = self.modules.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<&String> = modules.keys().collect();
        names.sort();
        f.debug_struct("ModuleRegistry").field("modules", &names).finish()
    }
}
