// Projection ingestion and table maintenance: CSV loading, mean-projection
// synthesis, and position upkeep. Valuation math lives in `crate::valuation`.

pub mod aggregate;
pub mod loader;
pub mod positions;
pub mod table;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse CSV {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("invalid projection data: {0}")]
    Validation(String),
}
