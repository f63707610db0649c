use anyhow::{Result, bail};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// JSON file in the data directory
    File,
    /// DuckDB database shared by several users
    DuckDb,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" | "json" => Ok(Backend::File),
            "duckdb" | "db" => Ok(Backend::DuckDb),
            other => bail!("Unknown storage backend {:?} (expected \"file\" or \"duckdb\")", other),
        }
    }
}

pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub backend: Backend,
    pub user: String,
    /// Append an audit line to `write_log.txt` after every save (file backend only)
    pub write_log: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let root_dir = lookup("CALTRACK_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::data_local_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("caltrack")
            });

        let backend = match lookup("CALTRACK_BACKEND") {
            Some(value) => value.parse()?,
            None => Backend::File,
        };

        let user = lookup("CALTRACK_USER")
            .or_else(|| lookup("USER"))
            .filter(|user| !user.trim().is_empty())
            .unwrap_or_else(|| "default".to_string());

        let write_log = lookup("CALTRACK_WRITE_LOG")
            .map(|value| matches!(value.trim(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        let mut config = Self::rooted_at(root_dir, backend, user);
        config.write_log = write_log;
        Ok(config)
    }

    pub fn rooted_at(root_dir: PathBuf, backend: Backend, user: impl Into<String>) -> Self {
        let data_dir = root_dir.join("data");
        let db_path = root_dir.join("caltrack.db");

        Self {
            data_dir,
            db_path,
            backend,
            user: user.into(),
            write_log: false,
        }
    }
}
