use crate::domain::Entry;
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub total_calories: u64,
    pub entry_count: usize,
}

pub fn total_calories(entries: &[Entry]) -> u64 {
    entries.iter().map(|e| u64::from(e.cal)).sum()
}

pub fn entry_count(entries: &[Entry]) -> usize {
    entries.len()
}

/// Per-date sums in chronological order. Dates without entries are absent.
pub fn daily_totals(entries: &[Entry]) -> Vec<DailyTotal> {
    let mut by_date: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for entry in entries {
        *by_date.entry(entry.date).or_default() += u64::from(entry.cal);
    }

    by_date
        .into_iter()
        .map(|(date, total)| DailyTotal { date, total })
        .collect()
}

pub fn summarize(entries: &[Entry]) -> Summary {
    Summary {
        total_calories: total_calories(entries),
        entry_count: entry_count(entries),
    }
}
