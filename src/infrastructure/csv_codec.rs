use crate::domain::{CandidateRow, Entry};

pub const CSV_HEADER: &str = "date,name,calories";

/// Rows recovered from a CSV document, plus how many data lines were dropped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Decoded {
    pub rows: Vec<CandidateRow>,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FieldState {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

pub struct CsvCodec;

impl CsvCodec {
    pub fn new() -> Self {
        Self
    }

    /// Writes entries in the order given, every field quoted.
    pub fn encode(&self, entries: &[Entry]) -> String {
        let mut lines = Vec::with_capacity(entries.len() + 1);
        lines.push(CSV_HEADER.to_string());

        for entry in entries {
            lines.push(format!(
                "{},{},{}",
                quote(&entry.date_string()),
                quote(&entry.name),
                quote(&entry.cal.to_string())
            ));
        }

        lines.join("\n")
    }

    /// Never fails: malformed lines are counted in `skipped` and left out.
    pub fn decode(&self, text: &str) -> Decoded {
        let mut decoded = Decoded::default();

        let lines = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).trim())
            .filter(|line| !line.is_empty())
            .skip(1);

        for line in lines {
            match tokenize(line).and_then(to_candidate) {
                Some(row) => decoded.rows.push(row),
                None => {
                    log::debug!("Dropping malformed CSV line {:?}", line);
                    decoded.skipped += 1;
                }
            }
        }

        decoded
    }
}

impl Default for CsvCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Splits one line into trimmed fields. `None` when a quoted field is never closed.
fn tokenize(line: &str) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut state = FieldState::FieldStart;

    for c in line.chars() {
        state = match (state, c) {
            (FieldState::FieldStart, '"') => FieldState::Quoted,
            (FieldState::FieldStart | FieldState::Unquoted | FieldState::QuoteInQuoted, ',') => {
                fields.push(field.trim().to_string());
                field.clear();
                FieldState::FieldStart
            }
            (FieldState::FieldStart, c) if c.is_whitespace() => FieldState::FieldStart,
            (FieldState::FieldStart | FieldState::Unquoted, c) => {
                field.push(c);
                FieldState::Unquoted
            }
            (FieldState::Quoted, '"') => FieldState::QuoteInQuoted,
            (FieldState::Quoted, c) => {
                field.push(c);
                FieldState::Quoted
            }
            (FieldState::QuoteInQuoted, '"') => {
                field.push('"');
                FieldState::Quoted
            }
            (FieldState::QuoteInQuoted, c) if c.is_whitespace() => FieldState::QuoteInQuoted,
            (FieldState::QuoteInQuoted, c) => {
                field.push(c);
                FieldState::Unquoted
            }
        };
    }

    if state == FieldState::Quoted {
        return None;
    }
    fields.push(field.trim().to_string());
    Some(fields)
}

fn to_candidate(fields: Vec<String>) -> Option<CandidateRow> {
    let mut fields = fields.into_iter();
    let (date, name, cal) = (fields.next()?, fields.next()?, fields.next()?);

    if date.is_empty() || name.is_empty() {
        return None;
    }
    let cal = cal.parse::<i64>().ok()?;

    Some(CandidateRow { date, name, cal })
}
