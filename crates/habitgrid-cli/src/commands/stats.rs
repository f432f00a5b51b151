//! Completion statistics commands for CLI.

use chrono::NaiveDate;
use clap::Subcommand;
use serde_json::json;

use super::common::{day_range, identity, open_db, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Per-habit completion counts within a date range
    Range {
        /// Range start date (inclusive)
        #[arg(long)]
        from: NaiveDate,
        /// Range end date (inclusive)
        #[arg(long)]
        to: NaiveDate,
    },
}

pub fn run(action: StatsAction, user: Option<String>) -> CliResult {
    let caller = identity(user)?;
    let db = open_db()?;

    match action {
        StatsAction::Range { from, to } => {
            let (from_ms, _) = day_range(from);
            let (_, to_ms) = day_range(to);
            let counts = db.completion_counts(&caller, from_ms, to_ms)?;

            // Resolve habit names for display.
            let habits = db.list_habits(&caller, None)?;
            let rows: Vec<serde_json::Value> = counts
                .iter()
                .map(|(habit_id, count)| {
                    let name = habits
                        .iter()
                        .find(|h| &h.id == habit_id)
                        .map(|h| h.name.as_str())
                        .unwrap_or("(deleted)");
                    json!({ "habit_id": habit_id, "name": name, "completions": count })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }

    Ok(())
}
