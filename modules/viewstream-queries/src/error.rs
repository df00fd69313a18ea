use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("No statements found in {0}")]
    Empty(PathBuf),

    #[error("Unresolved placeholders in {label}: {}", .names.join(", "))]
    Unresolved { label: String, names: Vec<String> },
}
