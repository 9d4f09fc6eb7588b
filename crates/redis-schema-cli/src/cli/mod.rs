//! CLI module for the Redis schema validator

pub mod commands;
pub mod output;

pub use commands::{DocumentKind, SchemaCli, SchemaCommands};
pub use output::{OutputFormat, ValidationReport};

use anyhow::Context;
use redis_schema_core::telemetry::ValidationMetricsRegistry;

use crate::error::CliError;

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Document is valid
    Success = 0,
    /// Document has one or more violations
    ValidationError = 1,
    /// Invalid input or arguments
    InvalidInput = 3,
    /// File not found or inaccessible
    FileError = 4,
    /// Internal error
    InternalError = 10,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl ExitCode {
    /// Determine exit code from validation result
    pub fn from_validation_result(has_violations: bool) -> Self {
        if has_violations {
            ExitCode::ValidationError
        } else {
            ExitCode::Success
        }
    }
}

/// Run the CLI with the given arguments and return the exit code
pub fn run(cli: SchemaCli) -> Result<ExitCode, CliError> {
    let registry = if cli.metrics {
        Some(ValidationMetricsRegistry::new().context("Failed to create metrics registry")?)
    } else {
        None
    };

    let mut validator = commands::build_validator(cli.schema_config.as_deref())?;
    if let Some(registry) = &registry {
        validator = validator.with_metrics(registry.validation().clone());
    }

    let code = match &cli.command {
        SchemaCommands::Validate {
            kind,
            input,
            format,
        } => commands::execute_validate(&validator, *kind, input, *format, cli.quiet)?,
        SchemaCommands::ParseName { name, format } => {
            commands::execute_parse_name(&validator, name, *format, cli.quiet)?
        }
        SchemaCommands::UpdateMask { paths, format } => {
            commands::execute_update_mask(&validator, paths, *format, cli.quiet)?
        }
    };

    if let Some(registry) = &registry {
        let text = registry.encode_text().context("Failed to encode metrics")?;
        eprint!("{}", text);
    }

    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_conversion() {
        assert_eq!(i32::from(ExitCode::Success), 0);
        assert_eq!(i32::from(ExitCode::ValidationError), 1);
        assert_eq!(i32::from(ExitCode::InvalidInput), 3);
        assert_eq!(i32::from(ExitCode::FileError), 4);
        assert_eq!(i32::from(ExitCode::InternalError), 10);
    }

    #[test]
    fn test_exit_code_from_validation_result() {
        assert_eq!(ExitCode::from_validation_result(false), ExitCode::Success);
        assert_eq!(ExitCode::from_validation_result(true), ExitCode::ValidationError);
    }
}
