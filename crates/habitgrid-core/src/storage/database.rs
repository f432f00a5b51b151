//! SQLite-based storage for calendars, habits, and completions.
//!
//! Every accessor takes the caller's [`Identity`] and verifies record
//! ownership before touching data. Multi-step operations (cascade deletes)
//! run as independent statements without a wrapping transaction; a failure
//! partway through leaves the earlier deletions committed.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{CoreError, DatabaseError, Result};
use crate::identity::Identity;
use crate::model::{Calendar, Completion, Habit};

use super::data_dir;
use super::migrations;

/// Parse datetime from RFC3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Build a Calendar from a database row
fn row_to_calendar(row: &rusqlite::Row) -> Result<Calendar, rusqlite::Error> {
    Ok(Calendar {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        color_theme: row.get(3)?,
        position: row.get(4)?,
        created_at: parse_datetime_fallback(&row.get::<_, String>(5)?),
        updated_at: parse_datetime_fallback(&row.get::<_, String>(6)?),
    })
}

/// Build a Habit from a database row
fn row_to_habit(row: &rusqlite::Row) -> Result<Habit, rusqlite::Error> {
    Ok(Habit {
        id: row.get(0)?,
        user_id: row.get(1)?,
        calendar_id: row.get(2)?,
        name: row.get(3)?,
        timer_duration_min: row.get(4)?,
        position: row.get(5)?,
        created_at: parse_datetime_fallback(&row.get::<_, String>(6)?),
        updated_at: parse_datetime_fallback(&row.get::<_, String>(7)?),
    })
}

/// Build a Completion from a database row
fn row_to_completion(row: &rusqlite::Row) -> Result<Completion, rusqlite::Error> {
    Ok(Completion {
        id: row.get(0)?,
        user_id: row.get(1)?,
        habit_id: row.get(2)?,
        completed_at: row.get(3)?,
    })
}

const CALENDAR_COLUMNS: &str =
    "id, user_id, name, color_theme, position, created_at, updated_at";
const HABIT_COLUMNS: &str =
    "id, user_id, calendar_id, name, timer_duration_min, position, created_at, updated_at";
const COMPLETION_COLUMNS: &str = "id, user_id, habit_id, completed_at";

/// Result of toggling a completion for an exact `(habit, timestamp)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// No completion existed for the pair; one was inserted.
    Added,
    /// A completion existed for the pair; it was deleted.
    Removed,
}

/// Rows inserted/deleted by a count-based completion update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionDelta {
    pub inserted: u32,
    pub deleted: u32,
}

/// SQLite database for the habit store.
///
/// Stores calendars, habits, completions, and a small key-value table for
/// client view preferences.
pub struct HabitDb {
    conn: Connection,
}

impl HabitDb {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/habitgrid/habitgrid.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()
            .map_err(|e| CoreError::Custom(e.to_string()))?
            .join("habitgrid.db");
        Self::open_at(&path)
    }

    /// Open the database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &std::path::Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| {
            CoreError::Database(DatabaseError::OpenFailed {
                path: path.to_path_buf(),
                source,
            })
        })?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| CoreError::Database(DatabaseError::MigrationFailed(e.to_string())))?;
        Ok(db)
    }

    /// Open an in-memory database (tests and ephemeral runs).
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| CoreError::Database(DatabaseError::MigrationFailed(e.to_string())))?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        // Create base tables (v1 schema) first
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS calendars (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL,
                name        TEXT NOT NULL,
                color_theme TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS habits (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL,
                calendar_id TEXT NOT NULL,
                name        TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS completions (
                id           TEXT PRIMARY KEY,
                user_id      TEXT NOT NULL,
                habit_id     TEXT NOT NULL,
                completed_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;

        // Run incremental migrations (v1 -> v2, etc.)
        migrations::migrate(&self.conn)?;

        // Indexes for common query patterns (idempotent, after migrations)
        self.conn.execute_batch(
            "CREATE INDEX IF NOT EXISTS idx_calendars_user ON calendars(user_id);
             CREATE INDEX IF NOT EXISTS idx_habits_calendar ON habits(calendar_id);
             CREATE INDEX IF NOT EXISTS idx_completions_habit_completed_at
                 ON completions(habit_id, completed_at);
             CREATE INDEX IF NOT EXISTS idx_completions_user_completed_at
                 ON completions(user_id, completed_at);",
        )?;

        Ok(())
    }

    // === Calendar accessors ===

    fn fetch_calendar(&self, id: &str) -> Result<Option<Calendar>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CALENDAR_COLUMNS} FROM calendars WHERE id = ?1"
        ))?;
        stmt.query_row(params![id], row_to_calendar).optional()
    }

    /// List the caller's calendars, ordered by position (absent last).
    pub fn list_calendars(&self, caller: &Identity) -> Result<Vec<Calendar>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CALENDAR_COLUMNS} FROM calendars
             WHERE user_id = ?1
             ORDER BY position IS NULL, position ASC, created_at ASC"
        ))?;
        let rows = stmt.query_map(params![caller.user_id()], row_to_calendar)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Get a calendar by id, verifying ownership.
    ///
    /// # Errors
    /// `NotFound` if no such record exists; `Unauthorized` if it belongs to
    /// another user.
    pub fn get_calendar(&self, caller: &Identity, id: &str) -> Result<Calendar> {
        let cal = self.fetch_calendar(id)?.ok_or(CoreError::NotFound {
            entity: "calendar",
            id: id.to_string(),
        })?;
        if cal.user_id != caller.user_id() {
            return Err(CoreError::Unauthorized {
                entity: "calendar",
                id: id.to_string(),
            });
        }
        Ok(cal)
    }

    /// Create a new calendar owned by the caller.
    pub fn create_calendar(&self, caller: &Identity, cal: &Calendar) -> Result<()> {
        if cal.user_id != caller.user_id() {
            return Err(CoreError::Unauthorized {
                entity: "calendar",
                id: cal.id.clone(),
            });
        }
        self.conn.execute(
            "INSERT INTO calendars (id, user_id, name, color_theme, position, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                cal.id,
                cal.user_id,
                cal.name,
                cal.color_theme,
                cal.position,
                cal.created_at.to_rfc3339(),
                cal.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Update a calendar's name, color theme, and position.
    ///
    /// Re-fetches the target and verifies ownership first. `updated_at` is
    /// stamped by the store.
    pub fn update_calendar(&self, caller: &Identity, cal: &Calendar) -> Result<()> {
        self.get_calendar(caller, &cal.id)?;
        self.conn.execute(
            "UPDATE calendars
             SET name = ?1, color_theme = ?2, position = ?3, updated_at = ?4
             WHERE id = ?5",
            params![
                cal.name,
                cal.color_theme,
                cal.position,
                Utc::now().to_rfc3339(),
                cal.id,
            ],
        )?;
        Ok(())
    }

    /// Delete a calendar and cascade to its habits and their completions.
    ///
    /// The cascade runs as a sequence of independent deletes with no
    /// transaction; if a step fails, earlier deletions stay committed.
    pub fn delete_calendar(&self, caller: &Identity, id: &str) -> Result<()> {
        self.get_calendar(caller, id)?;
        let habits = self.list_habits(caller, Some(id))?;
        for habit in &habits {
            let completions = self.list_habit_completions(caller, &habit.id)?;
            for completion in &completions {
                self.conn
                    .execute("DELETE FROM completions WHERE id = ?1", params![completion.id])?;
            }
            self.conn
                .execute("DELETE FROM habits WHERE id = ?1", params![habit.id])?;
        }
        self.conn
            .execute("DELETE FROM calendars WHERE id = ?1", params![id])?;
        tracing::debug!(calendar_id = id, habits = habits.len(), "deleted calendar");
        Ok(())
    }

    // === Habit accessors ===

    fn fetch_habit(&self, id: &str) -> Result<Option<Habit>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1"
        ))?;
        stmt.query_row(params![id], row_to_habit).optional()
    }

    /// List the caller's habits, optionally restricted to one calendar,
    /// ordered by position (absent last).
    pub fn list_habits(&self, caller: &Identity, calendar_id: Option<&str>) -> Result<Vec<Habit>> {
        let habits = if let Some(cal_id) = calendar_id {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT {HABIT_COLUMNS} FROM habits
                 WHERE user_id = ?1 AND calendar_id = ?2
                 ORDER BY position IS NULL, position ASC, created_at ASC"
            ))?;
            let rows = stmt.query_map(params![caller.user_id(), cal_id], row_to_habit)?;
            rows.collect::<Result<Vec<_>, _>>()?
        } else {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT {HABIT_COLUMNS} FROM habits
                 WHERE user_id = ?1
                 ORDER BY position IS NULL, position ASC, created_at ASC"
            ))?;
            let rows = stmt.query_map(params![caller.user_id()], row_to_habit)?;
            rows.collect::<Result<Vec<_>, _>>()?
        };
        Ok(habits)
    }

    /// Get a habit by id, verifying ownership.
    pub fn get_habit(&self, caller: &Identity, id: &str) -> Result<Habit> {
        let habit = self.fetch_habit(id)?.ok_or(CoreError::NotFound {
            entity: "habit",
            id: id.to_string(),
        })?;
        if habit.user_id != caller.user_id() {
            return Err(CoreError::Unauthorized {
                entity: "habit",
                id: id.to_string(),
            });
        }
        Ok(habit)
    }

    /// Create a new habit under a calendar.
    ///
    /// The habit does not exist yet, so ownership of the *parent calendar*
    /// is checked instead.
    pub fn create_habit(&self, caller: &Identity, habit: &Habit) -> Result<()> {
        if habit.user_id != caller.user_id() {
            return Err(CoreError::Unauthorized {
                entity: "habit",
                id: habit.id.clone(),
            });
        }
        self.get_calendar(caller, &habit.calendar_id)?;
        self.conn.execute(
            "INSERT INTO habits (id, user_id, calendar_id, name, timer_duration_min, position, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                habit.id,
                habit.user_id,
                habit.calendar_id,
                habit.name,
                habit.timer_duration_min,
                habit.position,
                habit.created_at.to_rfc3339(),
                habit.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Update a habit's name, timer, position, and parent calendar.
    ///
    /// Moving to a different calendar re-checks ownership of the target
    /// calendar. `updated_at` is stamped by the store.
    pub fn update_habit(&self, caller: &Identity, habit: &Habit) -> Result<()> {
        let existing = self.get_habit(caller, &habit.id)?;
        if existing.calendar_id != habit.calendar_id {
            self.get_calendar(caller, &habit.calendar_id)?;
        }
        self.conn.execute(
            "UPDATE habits
             SET calendar_id = ?1, name = ?2, timer_duration_min = ?3, position = ?4, updated_at = ?5
             WHERE id = ?6",
            params![
                habit.calendar_id,
                habit.name,
                habit.timer_duration_min,
                habit.position,
                Utc::now().to_rfc3339(),
                habit.id,
            ],
        )?;
        Ok(())
    }

    /// Delete a habit and cascade to its completions.
    ///
    /// Same non-transactional sequencing as [`HabitDb::delete_calendar`].
    pub fn delete_habit(&self, caller: &Identity, id: &str) -> Result<()> {
        self.get_habit(caller, id)?;
        let completions = self.list_habit_completions(caller, id)?;
        for completion in &completions {
            self.conn
                .execute("DELETE FROM completions WHERE id = ?1", params![completion.id])?;
        }
        self.conn
            .execute("DELETE FROM habits WHERE id = ?1", params![id])?;
        tracing::debug!(habit_id = id, completions = completions.len(), "deleted habit");
        Ok(())
    }

    // === Completion accessors ===

    /// Toggle a completion for an exact `(habit, completed_at)` pair.
    ///
    /// If one exists it is deleted (decrement); otherwise one is inserted
    /// (increment). Calling twice in succession restores the original set.
    pub fn mark_completion(
        &self,
        caller: &Identity,
        habit_id: &str,
        completed_at: i64,
    ) -> Result<ToggleOutcome> {
        self.get_habit(caller, habit_id)?;
        let existing: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM completions WHERE habit_id = ?1 AND completed_at = ?2 LIMIT 1",
                params![habit_id, completed_at],
                |row| row.get(0),
            )
            .optional()?;

        match existing {
            Some(id) => {
                self.conn
                    .execute("DELETE FROM completions WHERE id = ?1", params![id])?;
                Ok(ToggleOutcome::Removed)
            }
            None => {
                let completion = Completion::new(caller.user_id(), habit_id, completed_at);
                self.insert_completion(&completion)?;
                Ok(ToggleOutcome::Added)
            }
        }
    }

    /// Bring the number of completions within `[from_ms, to_ms]` to `target`.
    ///
    /// New rows are stamped with `completed_at`; surplus rows are deleted
    /// newest-first. This backs the count-based completion control.
    pub fn set_completion_count(
        &self,
        caller: &Identity,
        habit_id: &str,
        from_ms: i64,
        to_ms: i64,
        completed_at: i64,
        target: u32,
    ) -> Result<CompletionDelta> {
        self.get_habit(caller, habit_id)?;
        let current: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM completions
             WHERE habit_id = ?1 AND completed_at >= ?2 AND completed_at <= ?3",
            params![habit_id, from_ms, to_ms],
            |row| row.get(0),
        )?;

        let mut delta = CompletionDelta::default();
        if target > current {
            for _ in 0..(target - current) {
                let completion = Completion::new(caller.user_id(), habit_id, completed_at);
                self.insert_completion(&completion)?;
                delta.inserted += 1;
            }
        } else if target < current {
            let mut stmt = self.conn.prepare(
                "SELECT id FROM completions
                 WHERE habit_id = ?1 AND completed_at >= ?2 AND completed_at <= ?3
                 ORDER BY completed_at DESC
                 LIMIT ?4",
            )?;
            let ids = stmt
                .query_map(params![habit_id, from_ms, to_ms, current - target], |row| {
                    row.get::<_, String>(0)
                })?
                .collect::<Result<Vec<_>, _>>()?;
            for id in ids {
                self.conn
                    .execute("DELETE FROM completions WHERE id = ?1", params![id])?;
                delta.deleted += 1;
            }
        }
        Ok(delta)
    }

    pub(crate) fn insert_completion(&self, completion: &Completion) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO completions (id, user_id, habit_id, completed_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                completion.id,
                completion.user_id,
                completion.habit_id,
                completion.completed_at,
            ],
        )?;
        Ok(())
    }

    /// List the caller's completions across all habits within a range
    /// (inclusive), ordered by timestamp.
    pub fn list_completions(
        &self,
        caller: &Identity,
        from_ms: i64,
        to_ms: i64,
    ) -> Result<Vec<Completion>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COMPLETION_COLUMNS} FROM completions
             WHERE user_id = ?1 AND completed_at >= ?2 AND completed_at <= ?3
             ORDER BY completed_at ASC"
        ))?;
        let rows = stmt.query_map(params![caller.user_id(), from_ms, to_ms], row_to_completion)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// List all completions for one habit, verifying ownership, ordered by
    /// timestamp.
    pub fn list_habit_completions(
        &self,
        caller: &Identity,
        habit_id: &str,
    ) -> Result<Vec<Completion>> {
        self.get_habit(caller, habit_id)?;
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COMPLETION_COLUMNS} FROM completions
             WHERE habit_id = ?1
             ORDER BY completed_at ASC"
        ))?;
        let rows = stmt.query_map(params![habit_id], row_to_completion)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Per-habit completion counts within a range (inclusive).
    pub fn completion_counts(
        &self,
        caller: &Identity,
        from_ms: i64,
        to_ms: i64,
    ) -> Result<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT habit_id, COUNT(*) FROM completions
             WHERE user_id = ?1 AND completed_at >= ?2 AND completed_at <= ?3
             GROUP BY habit_id
             ORDER BY habit_id",
        )?;
        let rows = stmt.query_map(params![caller.user_id(), from_ms, to_ms], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // === View preference store ===

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt
            .query_row(params![key], |row| row.get::<_, String>(0))
            .optional()?;
        Ok(result)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller() -> Identity {
        Identity::new("user-1").unwrap()
    }

    fn other_caller() -> Identity {
        Identity::new("user-2").unwrap()
    }

    fn make_calendar(caller: &Identity) -> Calendar {
        Calendar::new(caller.user_id(), "Fitness", "red").with_position(1)
    }

    fn seed_habit(db: &HabitDb, caller: &Identity) -> Habit {
        let cal = make_calendar(caller);
        db.create_calendar(caller, &cal).unwrap();
        let habit = Habit::new(caller.user_id(), &cal.id, "Run").with_position(1);
        db.create_habit(caller, &habit).unwrap();
        habit
    }

    #[test]
    fn create_and_get_calendar() {
        let db = HabitDb::open_memory().unwrap();
        let me = caller();
        let cal = make_calendar(&me);
        db.create_calendar(&me, &cal).unwrap();

        let retrieved = db.get_calendar(&me, &cal.id).unwrap();
        assert_eq!(retrieved.name, "Fitness");
        assert_eq!(retrieved.color_theme, "red");
        assert_eq!(retrieved.position, Some(1));
    }

    #[test]
    fn list_calendars_orders_by_position_absent_last() {
        let db = HabitDb::open_memory().unwrap();
        let me = caller();
        let unranked = Calendar::new(me.user_id(), "Unranked", "zinc");
        let second = Calendar::new(me.user_id(), "Second", "blue").with_position(2);
        let first = Calendar::new(me.user_id(), "First", "red").with_position(1);
        db.create_calendar(&me, &unranked).unwrap();
        db.create_calendar(&me, &second).unwrap();
        db.create_calendar(&me, &first).unwrap();

        let names: Vec<String> = db
            .list_calendars(&me)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["First", "Second", "Unranked"]);
    }

    #[test]
    fn cross_user_calendar_access_fails() {
        let db = HabitDb::open_memory().unwrap();
        let me = caller();
        let them = other_caller();
        let cal = make_calendar(&me);
        db.create_calendar(&me, &cal).unwrap();

        assert!(matches!(
            db.get_calendar(&them, &cal.id),
            Err(CoreError::Unauthorized { .. })
        ));
        assert!(matches!(
            db.update_calendar(&them, &cal),
            Err(CoreError::Unauthorized { .. })
        ));
        assert!(matches!(
            db.delete_calendar(&them, &cal.id),
            Err(CoreError::Unauthorized { .. })
        ));
        assert!(db.list_calendars(&them).unwrap().is_empty());
    }

    #[test]
    fn get_missing_calendar_is_not_found() {
        let db = HabitDb::open_memory().unwrap();
        assert!(matches!(
            db.get_calendar(&caller(), "missing"),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn create_habit_checks_parent_ownership() {
        let db = HabitDb::open_memory().unwrap();
        let me = caller();
        let them = other_caller();
        let cal = make_calendar(&me);
        db.create_calendar(&me, &cal).unwrap();

        let habit = Habit::new(them.user_id(), &cal.id, "Run");
        assert!(matches!(
            db.create_habit(&them, &habit),
            Err(CoreError::Unauthorized { .. })
        ));
    }

    #[test]
    fn update_habit_can_move_between_calendars() {
        let db = HabitDb::open_memory().unwrap();
        let me = caller();
        let mut habit = seed_habit(&db, &me);
        let target = Calendar::new(me.user_id(), "Mind", "blue").with_position(2);
        db.create_calendar(&me, &target).unwrap();

        habit.calendar_id = target.id.clone();
        db.update_habit(&me, &habit).unwrap();

        let moved = db.get_habit(&me, &habit.id).unwrap();
        assert_eq!(moved.calendar_id, target.id);
    }

    #[test]
    fn mark_completion_toggles() {
        let db = HabitDb::open_memory().unwrap();
        let me = caller();
        let habit = seed_habit(&db, &me);

        assert_eq!(
            db.mark_completion(&me, &habit.id, 1_700_000_000_000).unwrap(),
            ToggleOutcome::Added
        );
        assert_eq!(
            db.mark_completion(&me, &habit.id, 1_700_000_000_000).unwrap(),
            ToggleOutcome::Removed
        );
        assert!(db.list_habit_completions(&me, &habit.id).unwrap().is_empty());
    }

    #[test]
    fn set_completion_count_inserts_and_deletes_delta() {
        let db = HabitDb::open_memory().unwrap();
        let me = caller();
        let habit = seed_habit(&db, &me);
        let day_start = 1_700_000_000_000;
        let day_end = day_start + 86_400_000 - 1;

        let delta = db
            .set_completion_count(&me, &habit.id, day_start, day_end, day_start, 3)
            .unwrap();
        assert_eq!(delta, CompletionDelta { inserted: 3, deleted: 0 });

        let delta = db
            .set_completion_count(&me, &habit.id, day_start, day_end, day_start, 1)
            .unwrap();
        assert_eq!(delta, CompletionDelta { inserted: 0, deleted: 2 });

        let remaining = db.list_habit_completions(&me, &habit.id).unwrap();
        assert_eq!(remaining.len(), 1);
    }

    #[test]
    fn list_completions_respects_range_and_user() {
        let db = HabitDb::open_memory().unwrap();
        let me = caller();
        let habit = seed_habit(&db, &me);
        db.mark_completion(&me, &habit.id, 100).unwrap();
        db.mark_completion(&me, &habit.id, 200).unwrap();
        db.mark_completion(&me, &habit.id, 300).unwrap();

        let in_range = db.list_completions(&me, 150, 250).unwrap();
        assert_eq!(in_range.len(), 1);
        assert_eq!(in_range[0].completed_at, 200);

        assert!(db.list_completions(&other_caller(), 0, 1000).unwrap().is_empty());
    }

    #[test]
    fn completion_counts_groups_by_habit() {
        let db = HabitDb::open_memory().unwrap();
        let me = caller();
        let habit = seed_habit(&db, &me);
        let cal = db.list_calendars(&me).unwrap().remove(0);
        let other_habit = Habit::new(me.user_id(), &cal.id, "Read").with_position(2);
        db.create_habit(&me, &other_habit).unwrap();

        db.mark_completion(&me, &habit.id, 100).unwrap();
        db.mark_completion(&me, &habit.id, 200).unwrap();
        db.mark_completion(&me, &other_habit.id, 100).unwrap();

        let mut counts = db.completion_counts(&me, 0, 1000).unwrap();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        assert_eq!(counts[0], (habit.id.clone(), 2));
        assert_eq!(counts[1], (other_habit.id.clone(), 1));
    }

    #[test]
    fn delete_calendar_cascades_to_habits_and_completions() {
        let db = HabitDb::open_memory().unwrap();
        let me = caller();
        let habit = seed_habit(&db, &me);
        let cal_id = habit.calendar_id.clone();
        db.mark_completion(&me, &habit.id, 100).unwrap();
        db.mark_completion(&me, &habit.id, 200).unwrap();

        db.delete_calendar(&me, &cal_id).unwrap();

        assert!(matches!(
            db.get_calendar(&me, &cal_id),
            Err(CoreError::NotFound { .. })
        ));
        assert!(matches!(
            db.get_habit(&me, &habit.id),
            Err(CoreError::NotFound { .. })
        ));
        let orphans: u64 = db
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM completions WHERE habit_id = ?1",
                params![habit.id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn kv_store() {
        let db = HabitDb::open_memory().unwrap();
        assert!(db.kv_get("view_mode").unwrap().is_none());
        db.kv_set("view_mode", "month-grid").unwrap();
        assert_eq!(db.kv_get("view_mode").unwrap().unwrap(), "month-grid");
    }
}
