//! Calendar management commands for CLI.

use clap::Subcommand;
use habitgrid_core::model::Calendar;
use habitgrid_core::Config;

use super::common::{identity, open_db, CliResult};

#[derive(Subcommand)]
pub enum CalendarAction {
    /// Create a new calendar
    Create {
        /// Calendar name
        name: String,
        /// Color theme token (defaults to ui.default_color_theme)
        #[arg(long)]
        color: Option<String>,
        /// 1-based position among your calendars
        #[arg(long)]
        position: Option<i64>,
    },
    /// List calendars
    List,
    /// Get calendar details
    Get {
        /// Calendar ID
        id: String,
    },
    /// Update a calendar
    Update {
        /// Calendar ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New color theme token
        #[arg(long)]
        color: Option<String>,
        /// New 1-based position
        #[arg(long)]
        position: Option<i64>,
    },
    /// Delete a calendar and everything in it
    Delete {
        /// Calendar ID
        id: String,
    },
}

pub fn run(action: CalendarAction, user: Option<String>) -> CliResult {
    let caller = identity(user)?;
    let db = open_db()?;

    match action {
        CalendarAction::Create {
            name,
            color,
            position,
        } => {
            let color = color.unwrap_or_else(|| Config::load_or_default().ui.default_color_theme);
            let mut cal = Calendar::new(caller.user_id(), name, color);
            cal.position = position;
            db.create_calendar(&caller, &cal)?;
            println!("Calendar created: {}", cal.id);
            println!("{}", serde_json::to_string_pretty(&cal)?);
        }
        CalendarAction::List => {
            let calendars = db.list_calendars(&caller)?;
            println!("{}", serde_json::to_string_pretty(&calendars)?);
        }
        CalendarAction::Get { id } => {
            let cal = db.get_calendar(&caller, &id)?;
            println!("{}", serde_json::to_string_pretty(&cal)?);
        }
        CalendarAction::Update {
            id,
            name,
            color,
            position,
        } => {
            let mut cal = db.get_calendar(&caller, &id)?;
            if let Some(n) = name {
                cal.name = n;
            }
            if let Some(c) = color {
                cal.color_theme = c;
            }
            if let Some(p) = position {
                cal.position = Some(p);
            }
            db.update_calendar(&caller, &cal)?;
            println!("Calendar updated:");
            println!("{}", serde_json::to_string_pretty(&cal)?);
        }
        CalendarAction::Delete { id } => {
            db.delete_calendar(&caller, &id)?;
            println!("Calendar deleted: {id}");
        }
    }

    Ok(())
}
