use std::path::PathBuf;

use thiserror::Error;

/// Error type shared by the extraction and classification pipelines.
///
/// Per-line parse problems never surface here; the parser absorbs them and
/// reports them through `ParseStats` instead.
#[derive(Debug, Error)]
pub enum BirthmarkError {
    /// Corpus root, archive, or firmware file is missing or holds no usable input.
    #[error("Input not found: {path} ({reason})")]
    InputNotFound { path: PathBuf, reason: String },

    /// Classification was requested without a readable unique-feature table.
    #[error("Unique-feature table missing or unreadable at {path}: {reason}")]
    StoreMissing { path: PathBuf, reason: String },

    /// The unique-feature table was read but names no projects.
    #[error("Unique-feature table at {0} contains no projects to compare against")]
    EmptyStore(String),

    /// Configuration could not be read or failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Archive error in {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

impl BirthmarkError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BirthmarkError::Io { path: path.into(), source }
    }

    pub fn input_not_found(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        BirthmarkError::InputNotFound { path: path.into(), reason: reason.into() }
    }

    pub fn store_missing(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        BirthmarkError::StoreMissing { path: path.into(), reason: reason.into() }
    }
}

/// Convenience result type for core operations.
pub type BirthmarkResult<T> = Result<T, BirthmarkError>;
