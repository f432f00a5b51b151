//! Snapshot types for import/export.
//!
//! The JSON shape is the external contract: it is both what export produces
//! and what import accepts, enabling round-trip reload. Keys are camelCase
//! and optional fields are omitted when absent. Internal ids and user ids
//! never appear in a snapshot.

mod export;
mod import;

pub use export::export;
pub use import::{import, ImportSummary};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A user's full calendar graph in export/import form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub calendars: Vec<CalendarSnapshot>,
}

/// One calendar with its habits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSnapshot {
    pub name: String,
    pub color_theme: String,
    /// 1-based rank; absent entries sort after ranked ones on import.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(default)]
    pub habits: Vec<HabitSnapshot>,
}

/// One habit with its completions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitSnapshot {
    pub name: String,
    /// Countdown length in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_duration: Option<u32>,
    /// 1-based rank within the calendar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(default)]
    pub completions: Vec<CompletionSnapshot>,
}

/// One completion event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionSnapshot {
    /// Epoch milliseconds.
    pub completed_at: i64,
}

impl Snapshot {
    /// Parse a snapshot from JSON.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
