use crate::domain::Entry;
use anyhow::Result;

/// Durable backing for an `EntryStore`. Implementations receive the whole
/// collection in insertion order and must hand it back in the same order.
pub trait EntryRepository {
    fn load_all(&self) -> Result<Vec<Entry>>;
    fn save_all(&self, entries: &[Entry]) -> Result<()>;

    /// Short human-readable location, used in log lines.
    fn describe(&self) -> String;
}
