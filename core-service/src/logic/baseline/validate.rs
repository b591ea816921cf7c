use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BaselineError {
    #[error("baseline file not found: {0}")]
    NotFound(PathBuf),

    #[error("baseline IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("baseline file has no header row")]
    MissingHeader,

    #[error("baseline is missing column '{0}'")]
    MissingColumn(String),

    #[error("baseline has no data rows")]
    Empty,
}

/// Header names are matched case-sensitively after trimming
pub fn column_index(header: &[String], name: &str) -> Result<usize, BaselineError> {
    header
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| BaselineError::MissingColumn(name.to_string()))
}
