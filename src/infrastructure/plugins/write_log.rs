use crate::domain::Entry;
use crate::infrastructure::{WriteContext, WriteHook};
use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;

pub const WRITE_LOG_FILE: &str = "write_log.txt";

/// Appends one audit line per save to `write_log.txt` in the data directory
pub struct WriteLogHook;

impl WriteHook for WriteLogHook {
    fn on_entries_written(&self, context: &WriteContext, _entries: &[Entry]) -> Result<()> {
        let log_path = context.data_dir.join(WRITE_LOG_FILE);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        writeln!(
            file,
            "[{}] Saved {} entries to {} ({} bytes)",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
            context.entry_count,
            context.entries_path.display(),
            context.bytes_written
        )?;

        Ok(())
    }

    fn name(&self) -> &str {
        "Write Log"
    }
}
