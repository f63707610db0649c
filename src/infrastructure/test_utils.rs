//! Test utilities shared by store and repository tests
//!
//! `MemoryRepository` keeps the saved collection in shared memory so a test can
//! inspect what the store wrote, count writes, and make loads or saves fail on
//! demand.
//! `test_harness::TestStorage` creates a fresh DuckDB file per test inside a
//! temporary directory that is removed when the harness is dropped.
use crate::domain::Entry;
use crate::infrastructure::EntryRepository;
use anyhow::{Result, anyhow};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct MemoryState {
    entries: Vec<Entry>,
    saves: usize,
    fail_loads: bool,
    fail_saves: bool,
}

#[derive(Clone, Default)]
pub struct MemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<Entry>) -> Self {
        let repository = Self::new();
        repository.state.lock().unwrap().entries = entries;
        repository
    }

    /// The collection as of the last successful save
    pub fn saved(&self) -> Vec<Entry> {
        self.state.lock().unwrap().entries.clone()
    }

    pub fn save_count(&self) -> usize {
        self.state.lock().unwrap().saves
    }

    pub fn fail_loads(&self, fail: bool) {
        self.state.lock().unwrap().fail_loads = fail;
    }

    pub fn fail_saves(&self, fail: bool) {
        self.state.lock().unwrap().fail_saves = fail;
    }
}

impl EntryRepository for MemoryRepository {
    fn load_all(&self) -> Result<Vec<Entry>> {
        let state = self.state.lock().unwrap();
        if state.fail_loads {
            return Err(anyhow!("simulated read failure"));
        }
        Ok(state.entries.clone())
    }

    fn save_all(&self, entries: &[Entry]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_saves {
            return Err(anyhow!("simulated write failure"));
        }
        state.entries = entries.to_vec();
        state.saves += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

pub mod test_harness {
    use crate::infrastructure::DuckDbRepository;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Fresh DuckDB database in a temporary directory
    pub struct TestStorage {
        repository: DuckDbRepository,
        temp_dir: TempDir,
    }

    impl TestStorage {
        pub fn new(user: &str) -> Self {
            let temp_dir = TempDir::new().expect("Failed to create temp directory");
            let repository = DuckDbRepository::open(temp_dir.path().join("test.db"), user)
                .expect("Failed to initialize test DuckDB storage");

            Self {
                repository,
                temp_dir,
            }
        }

        pub fn repository(&self) -> &DuckDbRepository {
            &self.repository
        }

        pub fn db_path(&self) -> PathBuf {
            self.temp_dir.path().join("test.db")
        }

        /// Closes the connection and opens the same file again as the same user
        pub fn reopen(self) -> Self {
            let Self {
                repository,
                temp_dir,
            } = self;
            let user = repository.user().to_string();
            drop(repository);

            let repository = DuckDbRepository::open(temp_dir.path().join("test.db"), user)
                .expect("Failed to reopen test DuckDB storage");
            Self {
                repository,
                temp_dir,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_harness::*;
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn memory_repository_shares_state_between_clones() {
        let repository = MemoryRepository::new();
        let clone = repository.clone();
        let entry = Entry::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), "Tea", 2);

        clone.save_all(&[entry.clone()]).unwrap();

        assert_eq!(repository.load_all().unwrap(), vec![entry]);
        assert_eq!(repository.save_count(), 1);
    }

    #[test]
    fn memory_repository_can_fail_saves() {
        let repository = MemoryRepository::with_entries(Vec::new());
        repository.fail_saves(true);

        assert!(repository.save_all(&[]).is_err());
        assert_eq!(repository.save_count(), 0);
    }

    #[test]
    fn memory_repository_can_fail_loads() {
        let repository = MemoryRepository::new();
        repository.fail_loads(true);
        assert!(repository.load_all().is_err());

        repository.fail_loads(false);
        assert!(repository.load_all().unwrap().is_empty());
    }

    #[test]
    fn harness_databases_are_isolated() {
        let first = TestStorage::new("alice");
        let second = TestStorage::new("alice");
        let entry = Entry::new(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(), "Rice", 200);

        first.repository().save_all(&[entry]).unwrap();

        assert!(first.db_path().exists());
        assert_ne!(first.db_path(), second.db_path());
        assert!(second.repository().load_all().unwrap().is_empty());
    }
}
