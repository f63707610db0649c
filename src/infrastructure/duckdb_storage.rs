use crate::domain::{DATE_FORMAT, Entry, EntryId};
use crate::infrastructure::EntryRepository;
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use duckdb::{Connection, params};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Versioned schema, applied in order and recorded in the `migrations` table.
const MIGRATIONS: &[(i32, &str, &str)] = &[(
    1,
    "001_create_entries",
    include_str!("../../migrations/001_create_entries.sql"),
)];

/// Relational persistence. Every read and write is scoped to one user, so
/// several people can share a database file without seeing each other's entries.
pub struct DuckDbRepository {
    conn: Mutex<Connection>,
    user: String,
    location: Option<PathBuf>,
}

impl DuckDbRepository {
    pub fn open<P: AsRef<Path>>(db_path: P, user: impl Into<String>) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(db_path).context("Failed to open DuckDB connection")?;

        let repository = Self {
            conn: Mutex::new(conn),
            user: user.into(),
            location: Some(db_path.to_path_buf()),
        };
        repository.initialize()?;
        Ok(repository)
    }

    pub fn in_memory(user: impl Into<String>) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .context("Failed to create in-memory DuckDB connection")?;

        let repository = Self {
            conn: Mutex::new(conn),
            user: user.into(),
            location: None,
        };
        repository.initialize()?;
        Ok(repository)
    }

    /// Another view of the same database scoped to `user`.
    pub fn for_user(&self, user: impl Into<String>) -> Result<Self> {
        let conn = self
            .connection()?
            .try_clone()
            .context("Failed to clone DuckDB connection")?;

        Ok(Self {
            conn: Mutex::new(conn),
            user: user.into(),
            location: self.location.clone(),
        })
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("DuckDB connection lock poisoned"))
    }

    fn initialize(&self) -> Result<()> {
        self.setup_migration_system()?;
        self.run_migrations()
    }

    fn setup_migration_system(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );
        "#,
        )
        .context("Failed to create migrations table")?;
        Ok(())
    }

    fn run_migrations(&self) -> Result<()> {
        let applied = self.get_applied_migrations()?;

        for (version, name, sql_content) in MIGRATIONS {
            if !applied.contains(version) {
                self.apply_migration(*version, name, sql_content)
                    .with_context(|| format!("Failed to apply migration {}: {}", version, name))?;
            }
        }

        Ok(())
    }

    fn get_applied_migrations(&self) -> Result<HashSet<i32>> {
        let conn = self.connection()?;
        let mut stmt = conn
            .prepare("SELECT version FROM migrations ORDER BY version")
            .context("Failed to prepare migration query")?;

        let rows = stmt.query_map([], |row| row.get::<_, i32>(0))?;

        let mut applied = HashSet::new();
        for version in rows {
            applied.insert(version?);
        }

        Ok(applied)
    }

    fn apply_migration(&self, version: i32, name: &str, sql_content: &str) -> Result<()> {
        let conn = self.connection()?;

        conn.execute_batch(sql_content)
            .with_context(|| format!("Failed to execute migration SQL for {}", name))?;

        conn.execute(
            "INSERT INTO migrations (version, name) VALUES (?, ?)",
            params![version, name],
        )
        .with_context(|| format!("Failed to record migration {} as applied", name))?;

        log::debug!("Applied migration {}", name);
        Ok(())
    }

    fn row_to_entry(id: String, date: String, name: String, cal: i64) -> Result<Entry> {
        let date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
            .with_context(|| format!("Failed to parse date {:?} from database", date))?;
        let cal = u32::try_from(cal)
            .with_context(|| format!("Calorie value {} out of range in database", cal))?;

        Ok(Entry {
            id: EntryId::from(id),
            date,
            name,
            cal,
        })
    }
}

impl EntryRepository for DuckDbRepository {
    fn load_all(&self) -> Result<Vec<Entry>> {
        let conn = self.connection()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, date, name, cal FROM entries WHERE user_name = ? ORDER BY position",
            )
            .context("Failed to prepare select statement")?;

        let rows = stmt.query_map(params![self.user], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, date, name, cal) = row?;
            entries.push(Self::row_to_entry(id, date, name, cal)?);
        }

        Ok(entries)
    }

    /// Replaces the user's rows with `entries` in one transaction.
    fn save_all(&self, entries: &[Entry]) -> Result<()> {
        let mut conn = self.connection()?;
        let tx = conn
            .transaction()
            .context("Failed to begin transaction")?;

        tx.execute("DELETE FROM entries WHERE user_name = ?", params![self.user])
            .context("Failed to clear previous entries")?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO entries (user_name, id, position, date, name, cal) VALUES (?, ?, ?, ?, ?, ?)",
                )
                .context("Failed to prepare insert statement")?;

            for (position, entry) in entries.iter().enumerate() {
                stmt.execute(params![
                    self.user,
                    entry.id.as_str(),
                    position as i64,
                    entry.date_string(),
                    entry.name,
                    i64::from(entry.cal)
                ])
                .with_context(|| format!("Failed to save entry {}", entry.id))?;
            }
        }

        tx.commit().context("Failed to commit entries")?;
        log::info!("Saved {} entries for user {}", entries.len(), self.user);
        Ok(())
    }

    fn describe(&self) -> String {
        match &self.location {
            Some(path) => format!("{} (user {})", path.display(), self.user),
            None => format!("in-memory DuckDB (user {})", self.user),
        }
    }
}
