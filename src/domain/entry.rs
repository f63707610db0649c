use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Opaque identifier assigned to an entry when it is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// UUID v7: millisecond timestamp plus random bits, monotonic within the process,
    /// so ids handed out inside one import batch never collide.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub date: NaiveDate,
    pub name: String,
    pub cal: u32,
}

impl Entry {
    pub fn new(date: NaiveDate, name: impl Into<String>, cal: u32) -> Self {
        Self {
            id: EntryId::generate(),
            date,
            name: name.into(),
            cal,
        }
    }

    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

/// A row read from an import file, not yet checked against entry rules.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRow {
    pub date: String,
    pub name: String,
    pub cal: i64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("name must be a single line without control characters, got {0:?}")]
    ControlCharacterInName(String),
    #[error("calories must be a whole number, got {0:?}")]
    InvalidCalories(String),
    #[error("calories must not be negative, got {0}")]
    NegativeCalories(i64),
    #[error("date must be YYYY-MM-DD, got {0:?}")]
    InvalidDate(String),
}

pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    // Exported rows are one per line.
    if trimmed.chars().any(char::is_control) {
        return Err(ValidationError::ControlCharacterInName(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}

pub fn parse_calories(raw: &str) -> Result<u32, ValidationError> {
    let trimmed = raw.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_| ValidationError::InvalidCalories(raw.to_string()))?;
    check_calories(value)
}

pub fn check_calories(value: i64) -> Result<u32, ValidationError> {
    if value < 0 {
        return Err(ValidationError::NegativeCalories(value));
    }
    u32::try_from(value).map_err(|_| ValidationError::InvalidCalories(value.to_string()))
}

/// Blank or missing dates fall back to today's local date.
pub fn parse_date(raw: Option<&str>) -> Result<NaiveDate, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(today()),
        Some(value) => NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map_err(|_| ValidationError::InvalidDate(value.to_string())),
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
