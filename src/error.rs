use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PamError {
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error(
        "malformed row {line} in {}: expected {expected} fields, found {found}",
        path.display()
    )]
    RaggedRow {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("required column '{column}' not present")]
    MissingColumn { column: String },

    #[error("column '{column}' appears more than once after header cleanup")]
    DuplicateColumn { column: String },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PamError>;
