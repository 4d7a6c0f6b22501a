use std::path::PathBuf;

use thiserror::Error;

use super::categories::Dimension;

/// Errors raised by the data layer.
///
/// Configuration mistakes (`UnknownYear`, `UnknownLabel`) fail loudly instead
/// of silently defaulting; they should never happen through the UI, which
/// only offers values from the same static tables.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("unknown exam year {0}; known years are 2020..=2024")]
    UnknownYear(u16),

    #[error("unknown label {label:?} for dimension \"{dimension}\"")]
    UnknownLabel { dimension: Dimension, label: String },

    #[error("{kind} file not found: {path}")]
    NotFound { kind: &'static str, path: PathBuf },

    #[error("malformed dataset {path}: {message}")]
    MalformedTable { path: PathBuf, message: String },

    #[error("malformed boundary document {path}: {message}")]
    MalformedBoundaries { path: PathBuf, message: String },
}
