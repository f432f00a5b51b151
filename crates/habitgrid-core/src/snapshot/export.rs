//! Snapshot export.
//!
//! Walks the caller's calendars, habits, and completions into the snapshot
//! JSON shape. Export is best-effort below the top level: if one calendar's
//! habits cannot be fetched, that calendar degrades to an empty habit list
//! instead of aborting the whole export. A top-level failure surfaces to
//! the caller.

use crate::error::Result;
use crate::identity::Identity;
use crate::storage::HabitDb;

use super::{CalendarSnapshot, CompletionSnapshot, HabitSnapshot, Snapshot};

/// Export the caller's full calendar graph.
///
/// # Errors
/// Returns an error if the top-level calendar listing fails.
pub fn export(db: &HabitDb, caller: &Identity) -> Result<Snapshot> {
    let calendars = db.list_calendars(caller)?;
    let mut out = Vec::with_capacity(calendars.len());

    for cal in &calendars {
        let habits = match export_habits(db, caller, &cal.id) {
            Ok(habits) => habits,
            Err(err) => {
                tracing::warn!(
                    calendar = %cal.name,
                    error = %err,
                    "failed to export calendar's habits, degrading to empty list"
                );
                Vec::new()
            }
        };
        out.push(CalendarSnapshot {
            name: cal.name.clone(),
            color_theme: cal.color_theme.clone(),
            position: cal.position,
            habits,
        });
    }

    tracing::debug!(calendars = out.len(), "exported snapshot");
    Ok(Snapshot { calendars: out })
}

fn export_habits(
    db: &HabitDb,
    caller: &Identity,
    calendar_id: &str,
) -> Result<Vec<HabitSnapshot>> {
    let habits = db.list_habits(caller, Some(calendar_id))?;
    let mut out = Vec::with_capacity(habits.len());
    for habit in &habits {
        let completions = db
            .list_habit_completions(caller, &habit.id)?
            .into_iter()
            .map(|c| CompletionSnapshot {
                completed_at: c.completed_at,
            })
            .collect();
        out.push(HabitSnapshot {
            name: habit.name.clone(),
            timer_duration: habit.timer_duration_min,
            position: habit.position,
            completions,
        });
    }
    Ok(out)
}
