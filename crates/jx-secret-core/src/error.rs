//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid value {value:?} for environment variable {key}: {message}")]
    InvalidConfig {
        key: String,
        value: String,
        message: String,
    },

    #[error("failed to get secret data field '{field}': {message}")]
    InvalidSecretData { field: String, message: String },

    #[error("failed to convert Secret: {0}")]
    Conversion(String),

    #[error("failed to read converted ExternalSecret: {0}")]
    InvalidExternalSecret(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
