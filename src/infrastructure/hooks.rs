use crate::domain::Entry;
use anyhow::Result;
use std::path::PathBuf;

/// Context provided to write hooks
#[derive(Debug, Clone)]
pub struct WriteContext {
    pub entries_path: PathBuf,
    pub data_dir: PathBuf,
    pub entry_count: usize,
    pub bytes_written: usize,
}

/// Trait for plugins that respond to the entry collection being saved
pub trait WriteHook: Send + Sync {
    /// Called after the collection has been successfully written to disk
    fn on_entries_written(&self, context: &WriteContext, entries: &[Entry]) -> Result<()>;

    /// Human-readable name for this hook
    fn name(&self) -> &str;
}

/// Registry for managing write hooks
pub struct HookRegistry {
    hooks: Vec<Box<dyn WriteHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    pub fn register<H>(&mut self, hook: H)
    where
        H: WriteHook + 'static,
    {
        self.hooks.push(Box::new(hook));
    }

    /// Runs every hook. A failing hook is logged and the rest still run.
    pub fn execute_write_hooks(&self, context: &WriteContext, entries: &[Entry]) {
        for hook in &self.hooks {
            if let Err(e) = hook.on_entries_written(context, entries) {
                log::warn!("Hook '{}' failed: {:#}", hook.name(), e);
            }
        }
    }

    pub fn list_hooks(&self) -> Vec<&str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}
