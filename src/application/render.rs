use crate::domain::{DailyTotal, Entry, Summary};
use std::io::{self, Write};

pub const DEFAULT_CHART_WIDTH: usize = 40;

/// Plain-text views of the store: entry table, summary panel, daily bar chart.
pub struct ConsoleRenderer {
    chart_width: usize,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self {
            chart_width: DEFAULT_CHART_WIDTH,
        }
    }

    pub fn with_chart_width(chart_width: usize) -> Self {
        Self { chart_width }
    }

    pub fn render_entries<W: Write>(&self, out: &mut W, entries: &[&Entry]) -> io::Result<()> {
        if entries.is_empty() {
            return writeln!(out, "No entries yet.");
        }

        let name_width = entries
            .iter()
            .map(|e| e.name.chars().count())
            .max()
            .unwrap_or(0)
            .max("Food".len());

        writeln!(
            out,
            "{:<10}  {:<name_width$}  {:>8}  Id",
            "Date", "Food", "Calories"
        )?;
        for entry in entries {
            writeln!(
                out,
                "{:<10}  {:<name_width$}  {:>8}  {}",
                entry.date_string(),
                entry.name,
                entry.cal,
                entry.id
            )?;
        }
        Ok(())
    }

    pub fn render_summary<W: Write>(&self, out: &mut W, summary: &Summary) -> io::Result<()> {
        writeln!(out, "Total calories: {}", summary.total_calories)?;
        writeln!(out, "Entries: {}", summary.entry_count)
    }

    /// One bar per day, scaled so the largest day fills the chart width.
    pub fn render_chart<W: Write>(&self, out: &mut W, totals: &[DailyTotal]) -> io::Result<()> {
        let Some(max) = totals.iter().map(|t| t.total).max() else {
            return writeln!(out, "No data to chart.");
        };

        for daily in totals {
            let bar = "█".repeat(self.bar_length(daily.total, max));
            writeln!(out, "{} | {} {}", daily.date.format("%Y-%m-%d"), bar, daily.total)?;
        }
        Ok(())
    }

    fn bar_length(&self, total: u64, max: u64) -> usize {
        if max == 0 {
            return 0;
        }
        let width = self.chart_width as u64;
        // Round up so any non-zero day gets at least one cell.
        ((total * width).div_ceil(max)) as usize
    }
}

impl Default for ConsoleRenderer {
    fn default() -> Self {
        Self::new()
    }
}
