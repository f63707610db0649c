use crate::application::{CalorieApp, ConsoleRenderer};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "caltrack")]
#[command(about = "Track daily food calories from the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a food entry
    Add {
        /// Food name
        name: String,
        /// Calorie count (whole number, 0 or more)
        calories: String,
        /// Specific date (YYYY-MM-DD format, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Change the name and calories of an entry
    Edit {
        id: String,
        name: String,
        calories: String,
    },
    /// Remove an entry
    Delete { id: String },
    /// Show entries, newest first
    List,
    /// Show total calories and entry count
    Summary,
    /// Bar chart of calories per day
    Chart,
    /// Write all entries to a CSV file
    Export {
        /// Output path (defaults to calories-<today>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Append entries from a CSV file
    Import { path: PathBuf },
    /// Remove every entry
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl Cli {
    pub fn run() -> anyhow::Result<()> {
        let cli = Self::parse();
        let mut app = CalorieApp::new()?;
        let renderer = ConsoleRenderer::new();
        let mut out = io::stdout().lock();

        match cli.command {
            Some(Commands::Add {
                name,
                calories,
                date,
            }) => {
                let entry = app.add(&name, &calories, date.as_deref())?;
                writeln!(
                    out,
                    "Added {} ({} kcal) on {} [{}]",
                    entry.name,
                    entry.cal,
                    entry.date_string(),
                    entry.id
                )?;
            }
            Some(Commands::Edit { id, name, calories }) => {
                let entry = app.edit(&id, &name, &calories)?;
                writeln!(out, "Updated {}: {} ({} kcal)", entry.id, entry.name, entry.cal)?;
            }
            Some(Commands::Delete { id }) => {
                if app.delete(&id)? {
                    writeln!(out, "Deleted {}", id)?;
                } else {
                    writeln!(out, "No entry with id {}", id)?;
                }
            }
            Some(Commands::List) => {
                renderer.render_entries(&mut out, &app.list())?;
            }
            Some(Commands::Summary) => {
                renderer.render_summary(&mut out, &app.summary())?;
            }
            Some(Commands::Chart) => {
                renderer.render_chart(&mut out, &app.daily_totals())?;
            }
            Some(Commands::Export { output }) => {
                let path = output.unwrap_or_else(CalorieApp::default_export_path);
                let count = app.export_csv(&path)?;
                writeln!(out, "Exported {} entries to {}", count, path.display())?;
            }
            Some(Commands::Import { path }) => {
                let summary = app.import_csv(&path)?;
                if summary.imported == 0 {
                    writeln!(out, "No valid rows found ({} skipped)", summary.skipped)?;
                } else {
                    writeln!(
                        out,
                        "Imported {} entries ({} skipped)",
                        summary.imported, summary.skipped
                    )?;
                }
            }
            Some(Commands::Clear { yes }) => {
                let count = app.store().len();
                let question = format!("Clear all {} entries?", count);
                if !yes && !confirm(&mut io::stdin().lock(), &mut out, &question)? {
                    writeln!(out, "Nothing cleared")?;
                    return Ok(());
                }
                app.clear()?;
                writeln!(out, "Cleared {} entries", count)?;
            }
            None => {
                // Default: entries followed by the summary panel
                renderer.render_entries(&mut out, &app.list())?;
                writeln!(out)?;
                renderer.render_summary(&mut out, &app.summary())?;
            }
        }

        Ok(())
    }
}

/// Asks a yes/no question; anything but `y` or `yes` counts as no.
fn confirm<R, W>(input: &mut R, out: &mut W, question: &str) -> io::Result<bool>
where
    R: BufRead,
    W: Write,
{
    write!(out, "{} [y/N] ", question)?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
