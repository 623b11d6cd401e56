// Dated CSV output files, one per stat kind.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use crate::output::format::{render_table, RenderedTable};
use crate::output::OutputError;
use crate::projections::table::ProjectionTable;

/// Builds `{league}_{custom}_{kind}_{date}.csv`, dropping absent prefixes.
/// The date is the UTC day of the run.
pub fn projections_file_name(
    kind_id: &str,
    league_name: Option<&str>,
    custom: Option<&str>,
) -> String {
    let date = Utc::now().format("%Y-%m-%d");
    let mut parts: Vec<String> = Vec::new();
    if let Some(league) = league_name {
        parts.push(league.to_string());
    }
    if let Some(custom) = custom {
        parts.push(custom.to_string());
    }
    parts.push(kind_id.to_string());
    parts.push(date.to_string());
    format!("{}.csv", parts.join("_"))
}

fn write_rendered(path: &Path, rendered: &RenderedTable) -> Result<(), OutputError> {
    let file = std::fs::File::create(path).map_err(|e| OutputError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut writer = csv::Writer::from_writer(file);

    let csv_err = |e: csv::Error| OutputError::Csv {
        path: path.to_path_buf(),
        source: e,
    };
    // A table with no live columns still produces a (valid, empty) file.
    if !rendered.header.is_empty() {
        writer.write_record(&rendered.header).map_err(csv_err)?;
        for row in &rendered.rows {
            writer.write_record(row).map_err(csv_err)?;
        }
    }
    writer.flush().map_err(|e| OutputError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

/// Render one table through its schema and write it under `output_dir`,
/// creating the directory when needed. Returns the written path.
pub fn write_projections_file(
    table: &ProjectionTable,
    output_dir: &Path,
    league_name: Option<&str>,
    custom: Option<&str>,
) -> Result<PathBuf, OutputError> {
    std::fs::create_dir_all(output_dir).map_err(|e| OutputError::Io {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    let path = output_dir.join(projections_file_name(table.kind.id(), league_name, custom));
    let rendered = render_table(table);
    write_rendered(&path, &rendered)?;

    info!(path = %path.display(), rows = rendered.rows.len(), "wrote projections file");
    Ok(path)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
