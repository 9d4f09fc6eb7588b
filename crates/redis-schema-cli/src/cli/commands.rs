//! CLI command definitions for the Redis schema validator

use clap::{Parser, Subcommand, ValueEnum};
use redis_schema_core::{DocumentError, MessageKind, SchemaConfig, SchemaValidator};
use serde_json::json;
use std::path::{Path, PathBuf};

use super::output::{OutputFormat, ValidationReport};
use super::ExitCode;
use crate::error::CliError;

/// Cloud Redis schema validator
///
/// Check Cloud Redis v1 instances, requests and operation metadata against
/// the documented field constraints before they reach the API.
#[derive(Parser, Debug)]
#[command(name = "redis-schema")]
#[command(about = "Validate Cloud Redis v1 messages", long_about = None)]
#[command(version)]
pub struct SchemaCli {
    /// Output verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only report the verdict through the exit code
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// TOML file overriding the built-in allow-lists
    #[arg(long, env = "REDIS_SCHEMA_CONFIG", global = true)]
    pub schema_config: Option<PathBuf>,

    /// Print Prometheus metrics to stderr when done
    #[arg(long, global = true)]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: SchemaCommands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum SchemaCommands {
    /// Validate a JSON, YAML or TOML document
    Validate {
        /// Message kind the document holds
        #[arg(short, long, value_enum)]
        kind: DocumentKind,

        /// Path to the document
        #[arg(short, long)]
        input: PathBuf,

        /// Output format for validation results
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Parse an instance resource name into its components
    ParseName {
        /// `projects/{project}/locations/{location}/instances/{instance}`
        name: String,

        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Check update mask paths against the instance allow-list
    UpdateMask {
        /// Field paths, separated by spaces or commas
        #[arg(value_delimiter = ',')]
        paths: Vec<String>,

        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

/// Document kinds accepted by `validate`
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum DocumentKind {
    Instance,
    UpdateMask,
    ResourceName,
    ListRequest,
    ListResponse,
    GetRequest,
    CreateRequest,
    UpdateRequest,
    DeleteRequest,
    ImportRequest,
    ExportRequest,
    FailoverRequest,
    Operation,
    OperationProgress,
    ZonePlacement,
}

impl DocumentKind {
    pub fn message_kind(self) -> MessageKind {
        match self {
            DocumentKind::Instance => MessageKind::Instance,
            DocumentKind::UpdateMask => MessageKind::UpdateMask,
            DocumentKind::ResourceName => MessageKind::ResourceName,
            DocumentKind::ListRequest => MessageKind::ListInstancesRequest,
            DocumentKind::ListResponse => MessageKind::ListInstancesResponse,
            DocumentKind::GetRequest => MessageKind::GetInstanceRequest,
            DocumentKind::CreateRequest => MessageKind::CreateInstanceRequest,
            DocumentKind::UpdateRequest => MessageKind::UpdateInstanceRequest,
            DocumentKind::DeleteRequest => MessageKind::DeleteInstanceRequest,
            DocumentKind::ImportRequest => MessageKind::ImportInstanceRequest,
            DocumentKind::ExportRequest => MessageKind::ExportInstanceRequest,
            DocumentKind::FailoverRequest => MessageKind::FailoverInstanceRequest,
            DocumentKind::Operation => MessageKind::OperationMetadata,
            DocumentKind::OperationProgress => MessageKind::OperationProgress,
            DocumentKind::ZonePlacement => MessageKind::ZonePlacement,
        }
    }
}

/// Build the validator, loading the schema config when one is given
pub fn build_validator(schema_config: Option<&Path>) -> Result<SchemaValidator, CliError> {
    match schema_config {
        Some(path) => {
            let config = SchemaConfig::from_file(path)?;
            tracing::info!(path = %path.display(), "Loaded schema config");
            Ok(SchemaValidator::with_config(config))
        }
        None => Ok(SchemaValidator::new()),
    }
}

fn emit(report: &ValidationReport, format: OutputFormat, quiet: bool) -> Result<ExitCode, CliError> {
    if !quiet {
        report.render(format)?;
    }
    Ok(ExitCode::from_validation_result(!report.valid))
}

/// Execute the validate command
pub fn execute_validate(
    validator: &SchemaValidator,
    kind: DocumentKind,
    input: &Path,
    format: OutputFormat,
    quiet: bool,
) -> Result<ExitCode, CliError> {
    let content = std::fs::read_to_string(input).map_err(|e| {
        CliError::file_error(format!("Failed to read document '{}': {}", input.display(), e))
    })?;
    let document = parse_document(input, &content)?;

    let message = kind.message_kind();
    let report = match validator.validate_document(message, document) {
        Ok(normalized) => ValidationReport::valid(message.as_str(), normalized),
        Err(DocumentError::Invalid(err)) => ValidationReport::invalid(message.as_str(), &err),
        Err(DocumentError::Malformed(e)) => {
            return Err(CliError::invalid_input(format!(
                "'{}' is not a {} document: {}",
                input.display(),
                message,
                e
            )))
        }
    };
    emit(&report, format, quiet)
}

/// Execute the parse-name command
pub fn execute_parse_name(
    validator: &SchemaValidator,
    name: &str,
    format: OutputFormat,
    quiet: bool,
) -> Result<ExitCode, CliError> {
    let kind = MessageKind::ResourceName.as_str();
    let report = match validator.parse_resource_name(name) {
        Ok(parsed) => ValidationReport::valid(
            kind,
            json!({
                "name": parsed.to_string(),
                "project": parsed.project(),
                "location": parsed.location(),
                "instance": parsed.instance(),
            }),
        ),
        Err(err) => ValidationReport::invalid(kind, &err),
    };
    emit(&report, format, quiet)
}

/// Execute the update-mask command
pub fn execute_update_mask(
    validator: &SchemaValidator,
    paths: &[String],
    format: OutputFormat,
    quiet: bool,
) -> Result<ExitCode, CliError> {
    let kind = MessageKind::UpdateMask.as_str();
    let report = match validator.validate_update_mask(paths) {
        Ok(mask) => ValidationReport::valid(kind, json!({ "paths": mask.paths() })),
        Err(err) => ValidationReport::invalid(kind, &err),
    };
    emit(&report, format, quiet)
}

/// Parse a document into JSON based on its file extension
pub fn parse_document(path: &Path, content: &str) -> Result<serde_json::Value, CliError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "json" => serde_json::from_str(content)
            .map_err(|e| CliError::parse_error(format!("Invalid JSON: {}", e))),
        "yaml" | "yml" => serde_yaml::from_str(content)
            .map_err(|e| CliError::parse_error(format!("Invalid YAML: {}", e))),
        "toml" => {
            let toml_value: toml::Value = toml::from_str(content)
                .map_err(|e| CliError::parse_error(format!("Invalid TOML: {}", e)))?;
            serde_json::to_value(toml_value)
                .map_err(|e| CliError::parse_error(format!("Conversion error: {}", e)))
        }
        _ => Err(CliError::invalid_input(format!(
            "Unsupported file format: {}. Supported formats: json, yaml, yml, toml",
            extension
        ))),
    }
}
