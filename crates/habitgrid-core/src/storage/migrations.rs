//! Database schema migrations for habitgrid.
//!
//! Migrations are versioned and applied automatically when opening the
//! database. The `schema_version` table tracks the current migration
//! version.

use rusqlite::{Connection, Result as SqliteResult};

/// Apply all pending migrations to bring the database to the current schema
/// version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

/// Create the schema_version table if it doesn't exist.
fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or(0)
}

/// Set the schema version in the database.
fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Migration v1: Initial schema (baseline).
///
/// A no-op since the base tables are created by HabitDb::migrate() directly.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    set_schema_version(conn, 1)?;
    Ok(())
}

/// Migration v2: manual ordering and timed habits.
///
/// Adds the following columns:
/// - calendars.position: 1-based rank among a user's calendars
/// - calendars.updated_at: last update timestamp
/// - habits.position: 1-based rank within the calendar
/// - habits.timer_duration_min: countdown length for timed completions
/// - habits.updated_at: last update timestamp
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "ALTER TABLE calendars ADD COLUMN position INTEGER;
         ALTER TABLE calendars ADD COLUMN updated_at TEXT NOT NULL DEFAULT '';
         ALTER TABLE habits ADD COLUMN position INTEGER;
         ALTER TABLE habits ADD COLUMN timer_duration_min INTEGER;
         ALTER TABLE habits ADD COLUMN updated_at TEXT NOT NULL DEFAULT '';",
    )?;

    // Backfill updated_at from created_at for pre-migration rows
    tx.execute_batch(
        "UPDATE calendars SET updated_at = created_at WHERE updated_at = '';
         UPDATE habits SET updated_at = created_at WHERE updated_at = '';",
    )?;

    set_schema_version(&tx, 2)?;
    tx.commit()?;
    Ok(())
}
