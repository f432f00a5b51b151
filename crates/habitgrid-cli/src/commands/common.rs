//! Shared helpers for CLI commands.

use chrono::NaiveDate;
use habitgrid_core::{HabitDb, Identity};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Resolve the acting identity from the `--user` flag or `HABITGRID_USER`.
pub fn identity(user: Option<String>) -> Result<Identity, Box<dyn std::error::Error>> {
    let user = user.or_else(|| std::env::var("HABITGRID_USER").ok());
    Ok(Identity::resolve(user)?)
}

pub fn open_db() -> Result<HabitDb, Box<dyn std::error::Error>> {
    Ok(HabitDb::open()?)
}

/// UTC day window `[start, end]` in epoch milliseconds for a calendar date.
pub fn day_range(date: NaiveDate) -> (i64, i64) {
    let start = date
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc()
        .timestamp_millis();
    (start, start + 86_400_000 - 1)
}

/// Resolve an explicit millisecond timestamp or a calendar date (UTC
/// midnight) into epoch milliseconds.
pub fn resolve_timestamp(
    at_ms: Option<i64>,
    date: Option<NaiveDate>,
) -> Result<i64, Box<dyn std::error::Error>> {
    match (at_ms, date) {
        (Some(ms), _) => Ok(ms),
        (None, Some(date)) => Ok(day_range(date).0),
        (None, None) => Err("pass either --at <epoch_ms> or --date <YYYY-MM-DD>".into()),
    }
}
