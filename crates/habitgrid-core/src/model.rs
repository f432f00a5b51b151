//! Entity records for the habit store.
//!
//! Three collections make up a user's data: calendars group habits, habits
//! collect completions. Every record carries the owning `user_id`; the
//! storage layer rejects any access where that owner differs from the
//! caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named, colored grouping of habits owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calendar {
    /// Unique identifier
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Display name; also the match key during snapshot import
    pub name: String,
    /// Theme identifier (a CSS-color-class-like token, e.g. "emerald")
    pub color_theme: String,
    /// Optional 1-based rank among the user's calendars; `None` sorts last
    pub position: Option<i64>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Calendar {
    /// Create a new calendar with a fresh id.
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        color_theme: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Calendar {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            name: name.into(),
            color_theme: color_theme.into(),
            position: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder-style position setter.
    pub fn with_position(mut self, position: i64) -> Self {
        self.position = Some(position);
        self
    }
}

/// A trackable recurring activity belonging to one calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Parent calendar; must be owned by the same user
    pub calendar_id: String,
    /// Display name; also the match key during snapshot import
    pub name: String,
    /// Optional countdown length in minutes for timed completions
    pub timer_duration_min: Option<u32>,
    /// Optional 1-based rank within the calendar; `None` sorts last
    pub position: Option<i64>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Habit {
    /// Create a new habit under a calendar with a fresh id.
    pub fn new(
        user_id: impl Into<String>,
        calendar_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Habit {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            calendar_id: calendar_id.into(),
            name: name.into(),
            timer_duration_min: None,
            position: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder-style position setter.
    pub fn with_position(mut self, position: i64) -> Self {
        self.position = Some(position);
        self
    }

    /// Builder-style timer setter.
    pub fn with_timer(mut self, minutes: u32) -> Self {
        self.timer_duration_min = Some(minutes);
        self
    }
}

/// One recorded instance of performing a habit.
///
/// `completed_at` is an epoch-millisecond key. The presentation layer
/// truncates it to local-day boundaries; the store treats it as opaque.
/// Several completions may share a habit and day to express a repeat count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// Unique identifier
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Parent habit; must be owned by the same user
    pub habit_id: String,
    /// Epoch milliseconds of the completion event
    pub completed_at: i64,
}

impl Completion {
    /// Create a new completion with a fresh id.
    pub fn new(
        user_id: impl Into<String>,
        habit_id: impl Into<String>,
        completed_at: i64,
    ) -> Self {
        Completion {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            habit_id: habit_id.into(),
            completed_at,
        }
    }
}
