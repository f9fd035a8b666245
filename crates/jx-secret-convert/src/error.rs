//! Converter error types

use std::path::PathBuf;
use thiserror::Error;

/// Converter error
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{path}: Secret has no metadata.name")]
    MissingName { path: String },

    #[error("{path}: invalid {field}: {message}")]
    InvalidField {
        path: String,
        field: String,
        message: String,
    },

    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
