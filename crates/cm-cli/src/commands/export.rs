//! Export the full event log as a JSON document.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cm_db::{Database, EXPORT_FILE_NAME};

/// Writes the export document to a file (default `code-metrics.json`) or
/// stdout. Failures surface as errors, never as a silent empty document.
pub fn run(db: &Database, output: Option<&Path>, to_stdout: bool) -> Result<()> {
    let document = db.export_all().context("export unavailable")?;
    if to_stdout {
        println!("{document}");
        return Ok(());
    }

    let path: PathBuf = output.map_or_else(|| PathBuf::from(EXPORT_FILE_NAME), Path::to_path_buf);
    std::fs::write(&path, document)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("exported event log to {}", path.display());
    Ok(())
}
