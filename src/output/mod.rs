// Output shaping and file writing for augmented projection tables.

pub mod format;
pub mod writer;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write CSV {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}
