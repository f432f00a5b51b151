//! Completion tracking commands for CLI.

use chrono::NaiveDate;
use clap::Subcommand;
use habitgrid_core::ToggleOutcome;

use super::common::{day_range, identity, open_db, resolve_timestamp, CliResult};

#[derive(Subcommand)]
pub enum CompletionAction {
    /// Toggle a completion for an exact timestamp
    Toggle {
        /// Habit ID
        habit_id: String,
        /// Epoch milliseconds of the completion event
        #[arg(long)]
        at: Option<i64>,
        /// Calendar date (UTC midnight) instead of --at
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Set the completion count for one day
    SetCount {
        /// Habit ID
        habit_id: String,
        /// Calendar date
        date: NaiveDate,
        /// Target number of completions for that day
        count: u32,
    },
    /// List completions within a date range
    List {
        /// Range start date (inclusive)
        #[arg(long)]
        from: NaiveDate,
        /// Range end date (inclusive)
        #[arg(long)]
        to: NaiveDate,
    },
}

pub fn run(action: CompletionAction, user: Option<String>) -> CliResult {
    let caller = identity(user)?;
    let db = open_db()?;

    match action {
        CompletionAction::Toggle { habit_id, at, date } => {
            let at = resolve_timestamp(at, date)?;
            match db.mark_completion(&caller, &habit_id, at)? {
                ToggleOutcome::Added => println!("Completion added at {at}"),
                ToggleOutcome::Removed => println!("Completion removed at {at}"),
            }
        }
        CompletionAction::SetCount {
            habit_id,
            date,
            count,
        } => {
            let (from, to) = day_range(date);
            let delta = db.set_completion_count(&caller, &habit_id, from, to, from, count)?;
            println!(
                "Completions set to {count} for {date}: +{} / -{}",
                delta.inserted, delta.deleted
            );
        }
        CompletionAction::List { from, to } => {
            let (from_ms, _) = day_range(from);
            let (_, to_ms) = day_range(to);
            let completions = db.list_completions(&caller, from_ms, to_ms)?;
            println!("{}", serde_json::to_string_pretty(&completions)?);
        }
    }

    Ok(())
}
