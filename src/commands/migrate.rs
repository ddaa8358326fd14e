use crate::context::{write_snapshot, AppContext};
use crate::migration::MigrationReport;
use anyhow::Result;
use log::info;
use std::path::Path;

/// Rewrite the journal in the current shape, in place or to `output`.
pub fn run(app: &AppContext, output: Option<&Path>) -> Result<MigrationReport> {
    let loaded = app.load_journal()?;
    let destination = output.unwrap_or_else(|| app.journal_path());

    if output.is_none() && !loaded.report.changed_shape() {
        info!(
            "{} is already in the current format; nothing to migrate",
            destination.display()
        );
        return Ok(loaded.report);
    }

    write_snapshot(destination, &loaded.journal, &loaded.file_settings)?;
    info!(
        "Migrated {} trade(s) from version {} into {}",
        loaded.report.trades_loaded,
        loaded.report.source_version,
        destination.display()
    );
    Ok(loaded.report)
}
