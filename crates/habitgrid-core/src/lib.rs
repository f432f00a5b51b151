//! # Habitgrid Core Library
//!
//! This library provides the core business logic for the Habitgrid habit
//! tracker: users group habits into calendars and record daily completions.
//! All operations are available via a standalone CLI binary; any GUI is a
//! thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Entity Store**: SQLite-backed storage for calendars, habits, and
//!   completions, with every accessor verifying record ownership against
//!   the caller's [`Identity`]
//! - **Snapshot**: JSON import/export of a user's full calendar graph;
//!   import reconciles by name and keeps completions duplicate-free
//! - **Config**: TOML-based application configuration plus a kv table for
//!   client view preferences
//!
//! ## Key Components
//!
//! - [`HabitDb`]: Entity storage and accessors
//! - [`snapshot::import`] / [`snapshot::export`]: Snapshot reconciliation
//! - [`Config`]: Application configuration management
//! - [`Identity`]: Authenticated caller identity

pub mod error;
pub mod identity;
pub mod model;
pub mod snapshot;
pub mod storage;

pub use error::{ConfigError, CoreError, DatabaseError, Result};
pub use identity::Identity;
pub use model::{Calendar, Completion, Habit};
pub use snapshot::{ImportSummary, Snapshot};
pub use storage::{CompletionDelta, Config, HabitDb, ToggleOutcome};
