//! Client view preference commands for CLI.
//!
//! Preferences are runtime view choices (e.g. which heatmap layout the
//! user last picked) persisted in the database kv table, as opposed to the
//! defaults in the TOML config.

use clap::Subcommand;

use super::common::{open_db, CliResult};

#[derive(Subcommand)]
pub enum PrefAction {
    /// Get a preference value
    Get {
        /// Preference key, e.g. view_mode
        key: String,
    },
    /// Set a preference value
    Set {
        /// Preference key
        key: String,
        /// New value
        value: String,
    },
}

pub fn run(action: PrefAction) -> CliResult {
    let db = open_db()?;

    match action {
        PrefAction::Get { key } => match db.kv_get(&key)? {
            Some(value) => println!("{value}"),
            None => println!("(unset)"),
        },
        PrefAction::Set { key, value } => {
            db.kv_set(&key, &value)?;
            println!("{key} = {value}");
        }
    }

    Ok(())
}
