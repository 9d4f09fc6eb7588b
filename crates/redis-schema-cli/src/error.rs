//! Error types for the Redis schema CLI

use redis_schema_core::ConfigError;
use thiserror::Error;

use crate::cli::ExitCode;

/// Errors that stop a command before a validation verdict is reached
#[derive(Error, Debug)]
pub enum CliError {
    /// Arguments or document contents are unusable
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File not found or unreadable
    #[error("File error: {0}")]
    FileError(String),

    /// Document is not valid JSON, YAML or TOML
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Schema configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Result could not be rendered
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Unexpected failure
    #[error("Internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        CliError::InvalidInput(msg.into())
    }

    pub fn file_error(msg: impl Into<String>) -> Self {
        CliError::FileError(msg.into())
    }

    pub fn parse_error(msg: impl Into<String>) -> Self {
        CliError::ParseError(msg.into())
    }

    /// Check if this is a user-facing error (vs internal)
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            CliError::InvalidInput(_)
                | CliError::FileError(_)
                | CliError::ParseError(_)
                | CliError::Config(_)
        )
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::FileError(_) | CliError::Config(ConfigError::Io(_)) => ExitCode::FileError,
            _ if self.is_user_error() => ExitCode::InvalidInput,
            _ => ExitCode::InternalError,
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::SerializationError(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        CliError::SerializationError(format!("YAML error: {}", err))
    }
}
