//! Snapshot import (reconciliation).
//!
//! Merges a previously-exported snapshot into the caller's store. Calendars
//! and habits are matched **by exact name** (case-sensitive, first match in
//! list order), never by id; matched records get their mutable fields
//! overwritten, unmatched ones are inserted. Completions are strictly
//! additive: the engine inserts a completion only when the habit has no
//! completion with the identical timestamp, and it never deletes one.
//!
//! The import runs as a sequence of independent read/write calls, not one
//! transaction. A failure partway through leaves earlier calendars, habits,
//! and completions committed.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::identity::Identity;
use crate::model::{Calendar, Completion, Habit};
use crate::storage::HabitDb;

use super::{CalendarSnapshot, HabitSnapshot, Snapshot};

/// Counts of what an import pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub calendars_created: usize,
    pub calendars_updated: usize,
    pub habits_created: usize,
    pub habits_updated: usize,
    pub completions_inserted: usize,
    pub completions_skipped: usize,
}

impl ImportSummary {
    /// Get a human-readable summary message.
    pub fn message(&self) -> String {
        format!(
            "Imported {} calendar(s) ({} updated), {} habit(s) ({} updated), {} completion(s) ({} duplicates skipped).",
            self.calendars_created,
            self.calendars_updated,
            self.habits_created,
            self.habits_updated,
            self.completions_inserted,
            self.completions_skipped,
        )
    }
}

/// Order snapshot entries by `position` ascending; entries without a
/// position sort last, keeping their snapshot order among themselves.
fn sorted_by_position<'a, T>(items: &'a [T], position: impl Fn(&T) -> Option<i64>) -> Vec<&'a T> {
    let mut ordered: Vec<&T> = items.iter().collect();
    ordered.sort_by_key(|item| position(item).unwrap_or(i64::MAX));
    ordered
}

/// Merge a snapshot into the caller's store.
///
/// # Errors
/// Propagates the first accessor failure; earlier writes stay committed.
pub fn import(db: &HabitDb, caller: &Identity, snapshot: &Snapshot) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();
    let mut existing_calendars = db.list_calendars(caller)?;

    for cal_snap in sorted_by_position(&snapshot.calendars, |c| c.position) {
        let calendar_id =
            reconcile_calendar(db, caller, cal_snap, &mut existing_calendars, &mut summary)?;

        let mut existing_habits = db.list_habits(caller, Some(&calendar_id))?;
        for habit_snap in sorted_by_position(&cal_snap.habits, |h| h.position) {
            let habit_id = reconcile_habit(
                db,
                caller,
                &calendar_id,
                habit_snap,
                &mut existing_habits,
                &mut summary,
            )?;
            reconcile_completions(db, caller, &habit_id, habit_snap, &mut summary)?;
        }
    }

    tracing::info!(
        calendars_created = summary.calendars_created,
        calendars_updated = summary.calendars_updated,
        habits_created = summary.habits_created,
        habits_updated = summary.habits_updated,
        completions_inserted = summary.completions_inserted,
        completions_skipped = summary.completions_skipped,
        "imported snapshot"
    );
    Ok(summary)
}

fn reconcile_calendar(
    db: &HabitDb,
    caller: &Identity,
    snap: &CalendarSnapshot,
    existing: &mut Vec<Calendar>,
    summary: &mut ImportSummary,
) -> Result<String> {
    // Absent position coalesces to end-of-list, for updates and inserts alike.
    let fallback = existing.len() as i64 + 1;

    match existing.iter().position(|c| c.name == snap.name) {
        Some(idx) => {
            let mut cal = existing[idx].clone();
            cal.color_theme = snap.color_theme.clone();
            cal.position = Some(snap.position.unwrap_or(fallback));
            db.update_calendar(caller, &cal)?;
            let id = cal.id.clone();
            existing[idx] = cal;
            summary.calendars_updated += 1;
            Ok(id)
        }
        None => {
            let mut cal = Calendar::new(caller.user_id(), &snap.name, &snap.color_theme);
            cal.position = Some(snap.position.unwrap_or(fallback));
            db.create_calendar(caller, &cal)?;
            let id = cal.id.clone();
            existing.push(cal);
            summary.calendars_created += 1;
            Ok(id)
        }
    }
}

fn reconcile_habit(
    db: &HabitDb,
    caller: &Identity,
    calendar_id: &str,
    snap: &HabitSnapshot,
    existing: &mut Vec<Habit>,
    summary: &mut ImportSummary,
) -> Result<String> {
    match existing.iter().position(|h| h.name == snap.name) {
        Some(idx) => {
            // Absent position keeps the matched habit's 1-based slot, not
            // end-of-list as at the calendar level.
            let fallback = idx as i64 + 1;
            let mut habit = existing[idx].clone();
            habit.timer_duration_min = snap.timer_duration;
            habit.position = Some(snap.position.unwrap_or(fallback));
            db.update_habit(caller, &habit)?;
            let id = habit.id.clone();
            existing[idx] = habit;
            summary.habits_updated += 1;
            Ok(id)
        }
        None => {
            let fallback = existing.len() as i64 + 1;
            let mut habit = Habit::new(caller.user_id(), calendar_id, &snap.name);
            habit.timer_duration_min = snap.timer_duration;
            habit.position = Some(snap.position.unwrap_or(fallback));
            db.create_habit(caller, &habit)?;
            let id = habit.id.clone();
            existing.push(habit);
            summary.habits_created += 1;
            Ok(id)
        }
    }
}

fn reconcile_completions(
    db: &HabitDb,
    caller: &Identity,
    habit_id: &str,
    snap: &HabitSnapshot,
    summary: &mut ImportSummary,
) -> Result<()> {
    // Linear scan per habit; fine at personal-data scale. Inserted
    // timestamps join the scan list so the habit ends the pass without
    // duplicate timestamps even if the snapshot repeats one.
    let mut seen: Vec<i64> = db
        .list_habit_completions(caller, habit_id)?
        .into_iter()
        .map(|c| c.completed_at)
        .collect();

    for completion in &snap.completions {
        if seen.iter().any(|&t| t == completion.completed_at) {
            summary.completions_skipped += 1;
            continue;
        }
        db.insert_completion(&Completion::new(
            caller.user_id(),
            habit_id,
            completion.completed_at,
        ))?;
        seen.push(completion.completed_at);
        summary.completions_inserted += 1;
    }
    Ok(())
}
