//! CLI error types with exit code handling
//!
//! Only setup failures surface here. Errors on individual documents or
//! while populating the store are logged by the pipeline instead.

use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Environment or option processing failed
    #[error("failed to process environment options: {message}")]
    #[diagnostic(code(jx_secret::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (stdin unreadable, stdout closed, etc.)
    #[error("{context}: {source}")]
    #[diagnostic(code(jx_secret::cli::io))]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Internal error (unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(jx_secret::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a configuration error with help text
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<jx_secret_core::CoreError> for CliError {
    fn from(err: jx_secret_core::CoreError) -> Self {
        match err {
            jx_secret_core::CoreError::InvalidConfig { .. } => CliError::config_with_help(
                err.to_string(),
                "boolean variables accept 1, t, T, TRUE, true, True, 0, f, F, FALSE, false or False",
            ),
            jx_secret_core::CoreError::Io(source) => CliError::io("IO error", source),
            other => CliError::internal(other.to_string()),
        }
    }
}

impl From<jx_secret_convert::ConvertError> for CliError {
    fn from(err: jx_secret_convert::ConvertError) -> Self {
        CliError::config(format!("failed to validate options: {}", err))
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
