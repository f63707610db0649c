use crate::domain::entry::{
    CandidateRow, Entry, EntryId, ValidationError, check_calories, parse_calories, parse_date,
    validate_name,
};
use crate::infrastructure::EntryRepository;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid entry: {0}")]
    Validation(#[from] ValidationError),
    #[error("no entry with id {0}")]
    NotFound(EntryId),
    #[error("persistence failed: {0:#}")]
    Persistence(anyhow::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// The session's collection of calorie entries, kept in insertion order and
/// written through to its repository after every mutation.
pub struct EntryStore {
    entries: Vec<Entry>,
    repository: Box<dyn EntryRepository>,
}

impl EntryStore {
    pub fn open(repository: Box<dyn EntryRepository>) -> StoreResult<Self> {
        let entries = repository.load_all().map_err(StoreError::Persistence)?;
        log::info!(
            "Loaded {} entries from {}",
            entries.len(),
            repository.describe()
        );
        Ok(Self {
            entries,
            repository,
        })
    }

    pub fn add(&mut self, name: &str, cal: &str, date: Option<&str>) -> StoreResult<Entry> {
        let name = validate_name(name)?;
        let cal = parse_calories(cal)?;
        let date = parse_date(date)?;

        let entry = Entry::new(date, name, cal);
        log::debug!("Adding entry {} ({} kcal on {})", entry.id, entry.cal, entry.date);
        self.entries.push(entry.clone());
        self.persist()?;
        Ok(entry)
    }

    /// Replaces name and calories. The date and id stay fixed.
    pub fn edit(&mut self, id: &EntryId, name: &str, cal: &str) -> StoreResult<Entry> {
        let index = self
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let name = validate_name(name)?;
        let cal = parse_calories(cal)?;

        let entry = &mut self.entries[index];
        entry.name = name;
        entry.cal = cal;
        let updated = entry.clone();
        log::debug!("Edited entry {}", updated.id);
        self.persist()?;
        Ok(updated)
    }

    pub fn delete(&mut self, id: &EntryId) -> StoreResult<bool> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        self.entries.remove(index);
        log::debug!("Deleted entry {}", id);
        self.persist()?;
        Ok(true)
    }

    pub fn clear(&mut self) -> StoreResult<()> {
        log::debug!("Clearing {} entries", self.entries.len());
        self.entries.clear();
        self.persist()
    }

    /// Display order: newest date first, and within a date the most recently
    /// added entry first.
    pub fn list(&self) -> Vec<&Entry> {
        let mut indexed: Vec<(usize, &Entry)> = self.entries.iter().enumerate().collect();
        indexed.sort_by(|(ia, a), (ib, b)| b.date.cmp(&a.date).then(ib.cmp(ia)));
        indexed.into_iter().map(|(_, entry)| entry).collect()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, id: &EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends every valid row and persists them with a single write. Rows that
    /// fail entry validation are only counted.
    pub fn import_many<I>(&mut self, rows: I) -> StoreResult<ImportSummary>
    where
        I: IntoIterator<Item = CandidateRow>,
    {
        let mut summary = ImportSummary::default();
        let mut imported = Vec::new();

        for row in rows {
            match Self::validate_row(&row) {
                Ok(entry) => imported.push(entry),
                Err(e) => {
                    log::debug!("Skipping import row {:?}: {}", row, e);
                    summary.skipped += 1;
                }
            }
        }

        summary.imported = imported.len();
        if imported.is_empty() {
            return Ok(summary);
        }

        self.entries.extend(imported);
        log::info!(
            "Imported {} entries, skipped {}",
            summary.imported,
            summary.skipped
        );
        self.persist()?;
        Ok(summary)
    }

    fn validate_row(row: &CandidateRow) -> Result<Entry, ValidationError> {
        let name = validate_name(&row.name)?;
        let cal = check_calories(row.cal)?;
        if row.date.trim().is_empty() {
            return Err(ValidationError::InvalidDate(row.date.clone()));
        }
        let date = parse_date(Some(row.date.as_str()))?;
        Ok(Entry::new(date, name, cal))
    }

    fn position(&self, id: &EntryId) -> Option<usize> {
        self.entries.iter().position(|e| &e.id == id)
    }

    fn persist(&self) -> StoreResult<()> {
        self.repository.save_all(&self.entries).map_err(|e| {
            log::warn!("Failed to save entries to {}: {:#}", self.repository.describe(), e);
            StoreError::Persistence(e)
        })
    }
}
