//! Habit management commands for CLI.

use clap::Subcommand;
use habitgrid_core::model::Habit;

use super::common::{identity, open_db, CliResult};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit under a calendar
    Create {
        /// Parent calendar ID
        calendar_id: String,
        /// Habit name
        name: String,
        /// Countdown length in minutes for timed completions
        #[arg(long)]
        timer: Option<u32>,
        /// 1-based position within the calendar
        #[arg(long)]
        position: Option<i64>,
    },
    /// List habits
    List {
        /// Restrict to one calendar
        #[arg(long)]
        calendar: Option<String>,
    },
    /// Get habit details
    Get {
        /// Habit ID
        id: String,
    },
    /// Update a habit
    Update {
        /// Habit ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New countdown length in minutes
        #[arg(long)]
        timer: Option<u32>,
        /// Remove the countdown timer
        #[arg(long, conflicts_with = "timer")]
        clear_timer: bool,
        /// New 1-based position
        #[arg(long)]
        position: Option<i64>,
        /// Move to a different calendar
        #[arg(long)]
        calendar: Option<String>,
    },
    /// Delete a habit and its completions
    Delete {
        /// Habit ID
        id: String,
    },
}

pub fn run(action: HabitAction, user: Option<String>) -> CliResult {
    let caller = identity(user)?;
    let db = open_db()?;

    match action {
        HabitAction::Create {
            calendar_id,
            name,
            timer,
            position,
        } => {
            let mut habit = Habit::new(caller.user_id(), calendar_id, name);
            habit.timer_duration_min = timer;
            habit.position = position;
            db.create_habit(&caller, &habit)?;
            println!("Habit created: {}", habit.id);
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::List { calendar } => {
            let habits = db.list_habits(&caller, calendar.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&habits)?);
        }
        HabitAction::Get { id } => {
            let habit = db.get_habit(&caller, &id)?;
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::Update {
            id,
            name,
            timer,
            clear_timer,
            position,
            calendar,
        } => {
            let mut habit = db.get_habit(&caller, &id)?;
            if let Some(n) = name {
                habit.name = n;
            }
            if let Some(t) = timer {
                habit.timer_duration_min = Some(t);
            }
            if clear_timer {
                habit.timer_duration_min = None;
            }
            if let Some(p) = position {
                habit.position = Some(p);
            }
            if let Some(c) = calendar {
                habit.calendar_id = c;
            }
            db.update_habit(&caller, &habit)?;
            println!("Habit updated:");
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::Delete { id } => {
            db.delete_habit(&caller, &id)?;
            println!("Habit deleted: {id}");
        }
    }

    Ok(())
}
