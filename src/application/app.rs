use crate::application::{Backend, Config};
use crate::domain::{
    DailyTotal, Entry, EntryId, EntryStore, ImportSummary, Summary, daily_totals, summarize, today,
};
use crate::infrastructure::{
    CsvCodec, DuckDbRepository, EntryRepository, HookRegistry, JsonFileRepository, WriteLogHook,
};
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

pub struct CalorieApp {
    store: EntryStore,
    codec: CsvCodec,
}

impl CalorieApp {
    pub fn new() -> Result<Self> {
        let config = Config::from_env()?;
        if config.write_log {
            Self::with_default_plugins(config)
        } else {
            Self::without_plugins(config)
        }
    }

    pub fn with_default_plugins(config: Config) -> Result<Self> {
        let repository: Box<dyn EntryRepository> = match config.backend {
            Backend::File => {
                let mut hook_registry = HookRegistry::new();
                hook_registry.register(WriteLogHook);
                Box::new(JsonFileRepository::with_hooks(
                    config.data_dir.clone(),
                    hook_registry,
                ))
            }
            Backend::DuckDb => Box::new(DuckDbRepository::open(&config.db_path, &config.user)?),
        };
        Self::with_repository(repository)
    }

    pub fn without_plugins(config: Config) -> Result<Self> {
        let repository: Box<dyn EntryRepository> = match config.backend {
            Backend::File => Box::new(JsonFileRepository::new(config.data_dir.clone())),
            Backend::DuckDb => Box::new(DuckDbRepository::open(&config.db_path, &config.user)?),
        };
        Self::with_repository(repository)
    }

    pub fn with_repository(repository: Box<dyn EntryRepository>) -> Result<Self> {
        let store = EntryStore::open(repository).context("Failed to load entries")?;
        Ok(Self {
            store,
            codec: CsvCodec::new(),
        })
    }

    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    pub fn add(&mut self, name: &str, calories: &str, date: Option<&str>) -> Result<Entry> {
        Ok(self.store.add(name, calories, date)?)
    }

    pub fn edit(&mut self, id: &str, name: &str, calories: &str) -> Result<Entry> {
        Ok(self.store.edit(&EntryId::from(id), name, calories)?)
    }

    pub fn delete(&mut self, id: &str) -> Result<bool> {
        Ok(self.store.delete(&EntryId::from(id))?)
    }

    pub fn clear(&mut self) -> Result<()> {
        Ok(self.store.clear()?)
    }

    pub fn list(&self) -> Vec<&Entry> {
        self.store.list()
    }

    pub fn summary(&self) -> Summary {
        summarize(self.store.entries())
    }

    pub fn daily_totals(&self) -> Vec<DailyTotal> {
        daily_totals(self.store.entries())
    }

    /// Default export file name, `calories-<today>.csv`.
    pub fn default_export_path() -> PathBuf {
        PathBuf::from(format!("calories-{}.csv", today().format("%Y-%m-%d")))
    }

    pub fn export_csv(&self, path: &Path) -> Result<usize> {
        if self.store.is_empty() {
            bail!("No entries to export");
        }

        let csv = self.codec.encode(self.store.entries());
        std::fs::write(path, csv)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Exported {} entries to {}", self.store.len(), path.display());
        Ok(self.store.len())
    }

    /// Lines the codec drops and rows the store rejects both count as skipped.
    pub fn import_csv(&mut self, path: &Path) -> Result<ImportSummary> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let decoded = self.codec.decode(&text);

        let mut summary = self.store.import_many(decoded.rows)?;
        summary.skipped += decoded.skipped;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{StoreError, ValidationError};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn app_in(temp_dir: &TempDir, backend: Backend) -> CalorieApp {
        let config = Config::rooted_at(temp_dir.path().to_path_buf(), backend, "tester");
        CalorieApp::with_default_plugins(config).unwrap()
    }

    #[test]
    fn entries_survive_restart_with_file_backend() {
        let temp_dir = TempDir::new().unwrap();
        {
            let mut app = app_in(&temp_dir, Backend::File);
            app.add("Apple", "95", Some("2024-01-01")).unwrap();
            app.add("Bread", "120", Some("2024-01-02")).unwrap();
        }

        let app = app_in(&temp_dir, Backend::File);

        assert_eq!(app.summary().total_calories, 215);
        assert_eq!(app.list()[0].name, "Bread");
        assert!(temp_dir.path().join("data").join("write_log.txt").exists());
    }

    #[test]
    fn entries_survive_restart_with_duckdb_backend() {
        let temp_dir = TempDir::new().unwrap();
        let id = {
            let mut app = app_in(&temp_dir, Backend::DuckDb);
            app.add("Soup", "250", Some("2024-01-01")).unwrap().id
        };

        let mut app = app_in(&temp_dir, Backend::DuckDb);
        app.edit(id.as_str(), "Tomato soup", "260").unwrap();

        assert_eq!(app.list()[0].name, "Tomato soup");
        assert!(temp_dir.path().join("caltrack.db").exists());
    }

    #[test]
    fn validation_errors_reach_the_caller() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = app_in(&temp_dir, Backend::File);

        let err = app.add("Apple", "-1", None).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::Validation(ValidationError::NegativeCalories(-1)))
        ));
        assert_eq!(app.summary().entry_count, 0);
    }

    #[test]
    fn export_then_import_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let csv_path = temp_dir.path().join("export.csv");
        {
            let mut app = app_in(&temp_dir, Backend::File);
            app.add("Apple", "95", Some("2024-01-01")).unwrap();
            app.add("Bread", "120", Some("2024-01-01")).unwrap();
            assert_eq!(app.export_csv(&csv_path).unwrap(), 2);
            app.clear().unwrap();
        }

        let exported = std::fs::read_to_string(&csv_path).unwrap();
        assert_eq!(
            exported,
            "date,name,calories\n\"2024-01-01\",\"Apple\",\"95\"\n\"2024-01-01\",\"Bread\",\"120\""
        );

        let mut app = app_in(&temp_dir, Backend::File);
        let summary = app.import_csv(&csv_path).unwrap();

        assert_eq!(
            summary,
            ImportSummary {
                imported: 2,
                skipped: 0
            }
        );
        assert_eq!(
            app.daily_totals(),
            vec![DailyTotal {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                total: 215
            }]
        );
    }

    #[test]
    fn import_counts_codec_and_store_rejections() {
        let temp_dir = TempDir::new().unwrap();
        let csv_path = temp_dir.path().join("import.csv");
        std::fs::write(
            &csv_path,
            "date,name,calories\n2024-01-01,Apple,95\n2024-01-01,Bread\n2024-01-01,Ghost,-5\nsoon,Tea,2\n",
        )
        .unwrap();
        let mut app = app_in(&temp_dir, Backend::File);

        let summary = app.import_csv(&csv_path).unwrap();

        assert_eq!(
            summary,
            ImportSummary {
                imported: 1,
                skipped: 3
            }
        );
    }

    #[test]
    fn without_plugins_skips_write_log() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::rooted_at(temp_dir.path().to_path_buf(), Backend::File, "tester");
        let mut app = CalorieApp::without_plugins(config).unwrap();

        app.add("Tea", "2", None).unwrap();

        let data_dir = temp_dir.path().join("data");
        assert!(data_dir.join("entries.json").exists());
        assert!(!data_dir.join("write_log.txt").exists());
    }

    #[test]
    fn export_of_empty_store_is_refused() {
        let temp_dir = TempDir::new().unwrap();
        let app = app_in(&temp_dir, Backend::File);

        assert!(app.export_csv(&temp_dir.path().join("out.csv")).is_err());
        assert!(!temp_dir.path().join("out.csv").exists());
    }

    #[test]
    fn multi_line_names_never_reach_an_export() {
        let temp_dir = TempDir::new().unwrap();
        let csv_path = temp_dir.path().join("export.csv");
        let mut app = app_in(&temp_dir, Backend::File);
        app.add("Apple", "95", Some("2024-01-01")).unwrap();

        assert!(app.add("Apple\npie", "300", Some("2024-01-01")).is_err());
        let id = app.list()[0].id.clone();
        assert!(app.edit(id.as_str(), "Green\napple", "80").is_err());

        app.export_csv(&csv_path).unwrap();
        app.clear().unwrap();
        let summary = app.import_csv(&csv_path).unwrap();

        assert_eq!(summary.imported, 1);
        assert_eq!(summary.skipped, 0);
        assert_eq!(app.list()[0].name, "Apple");
    }

    #[test]
    fn corrupt_entries_file_blocks_startup_and_survives() {
        let temp_dir = TempDir::new().unwrap();
        let entries_path = temp_dir.path().join("data").join("entries.json");
        {
            let mut app = app_in(&temp_dir, Backend::File);
            app.add("Apple", "95", Some("2024-01-01")).unwrap();
            app.add("Soup", "250", Some("2024-01-02")).unwrap();
        }
        let mut content = std::fs::read_to_string(&entries_path).unwrap();
        content.insert(content.rfind(']').unwrap(), ',');
        std::fs::write(&entries_path, &content).unwrap();

        let config = Config::rooted_at(temp_dir.path().to_path_buf(), Backend::File, "tester");
        let err = CalorieApp::with_default_plugins(config).err().unwrap();

        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::Persistence(_))
        ));
        assert_eq!(std::fs::read_to_string(&entries_path).unwrap(), content);
    }

    #[test]
    fn default_export_path_is_dated() {
        let path = CalorieApp::default_export_path();
        let name = path.to_string_lossy();
        assert!(name.starts_with("calories-"));
        assert!(name.ends_with(".csv"));
    }
}
