use crate::domain::Entry;
use crate::infrastructure::{EntryRepository, HookRegistry, WriteContext};
use anyhow::{Context, Result};
use std::path::PathBuf;

pub const ENTRIES_FILE: &str = "entries.json";

/// Local persistence: the whole collection as one JSON array file.
pub struct JsonFileRepository {
    data_dir: PathBuf,
    hook_registry: HookRegistry,
}

impl JsonFileRepository {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            hook_registry: HookRegistry::new(),
        }
    }

    pub fn with_hooks(data_dir: PathBuf, hook_registry: HookRegistry) -> Self {
        log::debug!("Write hooks: {:?}", hook_registry.list_hooks());
        Self {
            data_dir,
            hook_registry,
        }
    }

    pub fn entries_path(&self) -> PathBuf {
        self.data_dir.join(ENTRIES_FILE)
    }
}

impl EntryRepository for JsonFileRepository {
    fn load_all(&self) -> Result<Vec<Entry>> {
        let path = self.entries_path();

        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        // Left in place on failure so the next save cannot overwrite it.
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn save_all(&self, entries: &[Entry]) -> Result<()> {
        let path = self.entries_path();

        std::fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("Failed to create {}", self.data_dir.display()))?;

        let content =
            serde_json::to_string_pretty(entries).context("Failed to serialize entries")?;
        std::fs::write(&path, &content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Saved {} entries to {}", entries.len(), path.display());

        let context = WriteContext {
            entries_path: path,
            data_dir: self.data_dir.clone(),
            entry_count: entries.len(),
            bytes_written: content.len(),
        };
        self.hook_registry.execute_write_hooks(&context, entries);

        Ok(())
    }

    fn describe(&self) -> String {
        self.entries_path().display().to_string()
    }
}
