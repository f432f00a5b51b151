//! Snapshot export/import commands for CLI.

use std::path::{Path, PathBuf};

use habitgrid_core::snapshot::{export, import};
use habitgrid_core::Snapshot;

use super::common::{identity, open_db, CliResult};

pub fn run_export(out: Option<PathBuf>, user: Option<String>) -> CliResult {
    let caller = identity(user)?;
    let db = open_db()?;

    let snapshot = export(&db, &caller)?;
    let json = snapshot.to_json()?;
    match out {
        Some(path) => {
            std::fs::write(&path, &json)?;
            println!(
                "Exported {} calendar(s) to {}",
                snapshot.calendars.len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}

pub fn run_import(file: &Path, user: Option<String>) -> CliResult {
    let caller = identity(user)?;
    let db = open_db()?;

    let json = std::fs::read_to_string(file)?;
    let snapshot = Snapshot::from_json(&json)?;
    tracing::debug!(file = %file.display(), calendars = snapshot.calendars.len(), "parsed snapshot");
    let summary = import(&db, &caller, &snapshot)?;
    println!("{}", summary.message());
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
