//! Output formatting for the Redis schema CLI
//!
//! Renders a validation verdict as JSON, YAML, or a colored table.

use clap::ValueEnum;
use colored::Colorize;
use redis_schema_core::{FieldViolation, ValidationError, ViolationReason};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

use crate::error::CliError;

/// Output format options for CLI results
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum OutputFormat {
    /// Human-readable table format with colors
    #[default]
    Table,
    /// JSON format for machine processing
    Json,
    /// YAML format
    Yaml,
}

/// Verdict for one validated document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Message kind that was checked
    pub message: String,
    /// Overall validation status
    pub valid: bool,
    /// Number of violations found
    pub violation_count: usize,
    /// Every violation, in the order found
    pub violations: Vec<ViolationOutput>,
    /// Summary line
    pub summary: String,
    /// Normalized message, present when valid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized: Option<serde_json::Value>,
}

/// Individual violation output structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationOutput {
    pub field_path: String,
    pub reason: ViolationReason,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl From<&FieldViolation> for ViolationOutput {
    fn from(violation: &FieldViolation) -> Self {
        Self {
            field_path: violation.field_path.clone(),
            reason: violation.reason,
            message: violation.message.clone(),
            expected: violation.expected.clone(),
            actual: violation.actual.clone(),
        }
    }
}

impl ValidationReport {
    /// Report for a document that passed
    pub fn valid(message: impl Into<String>, normalized: serde_json::Value) -> Self {
        let message = message.into();
        Self {
            summary: format!("{} is valid", message),
            message,
            valid: true,
            violation_count: 0,
            violations: Vec::new(),
            normalized: Some(normalized),
        }
    }

    /// Report for a rejected document
    pub fn invalid(message: impl Into<String>, error: &ValidationError) -> Self {
        let message = message.into();
        Self {
            summary: format!("{} has {} violation(s)", message, error.len()),
            message,
            valid: false,
            violation_count: error.len(),
            violations: error.violations().iter().map(ViolationOutput::from).collect(),
            normalized: None,
        }
    }

    /// Render output in the specified format
    pub fn render(&self, format: OutputFormat) -> Result<(), CliError> {
        match format {
            OutputFormat::Json => self.render_json(),
            OutputFormat::Yaml => self.render_yaml(),
            OutputFormat::Table => self.render_table(),
        }
    }

    fn render_json(&self) -> Result<(), CliError> {
        println!("{}", serde_json::to_string_pretty(self)?);
        Ok(())
    }

    fn render_yaml(&self) -> Result<(), CliError> {
        println!("{}", serde_yaml::to_string(self)?);
        Ok(())
    }

    fn render_table(&self) -> Result<(), CliError> {
        let mut stdout = io::stdout();

        writeln!(stdout).ok();
        writeln!(stdout, "{}", format!("Validation Results: {}", self.message).cyan().bold()).ok();
        writeln!(stdout, "{}", "=".repeat(60)).ok();
        writeln!(stdout).ok();

        let status = if self.valid { "+".green() } else { "x".red() };
        writeln!(stdout, "{} {}", status, self.summary).ok();

        if !self.violations.is_empty() {
            writeln!(stdout).ok();
            writeln!(stdout, "{}", "Violations:".cyan().bold()).ok();
            writeln!(stdout, "{}", "-".repeat(60)).ok();
            for violation in &self.violations {
                violation.render_table_row(&mut stdout);
            }
        }

        if let Some(normalized) = &self.normalized {
            writeln!(stdout).ok();
            writeln!(stdout, "{}", "Normalized:".cyan().bold()).ok();
            writeln!(stdout, "{}", serde_json::to_string_pretty(normalized)?).ok();
        }

        stdout.flush().ok();
        Ok(())
    }
}

impl ViolationOutput {
    fn render_table_row(&self, stdout: &mut io::Stdout) {
        let reason = match self.reason {
            ViolationReason::MissingRequired => self.reason.as_str().yellow().bold(),
            _ => self.reason.as_str().red().bold(),
        };

        writeln!(stdout).ok();
        writeln!(stdout, "{} [{}] {}", "x".red(), reason, self.message).ok();
        writeln!(stdout, "  {} {}", "Path:".dimmed(), self.field_path.cyan()).ok();
        if let Some(expected) = &self.expected {
            writeln!(stdout, "  {} {}", "Expected:".dimmed(), expected.green()).ok();
        }
        if let Some(actual) = &self.actual {
            writeln!(stdout, "  {} {}", "Found:".dimmed(), actual).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_error() -> ValidationError {
        ValidationError::new(vec![
            FieldViolation::missing("tier"),
            FieldViolation::constraint("memorySizeGb", "memory size must be positive")
                .with_expected("> 0")
                .with_actual("0"),
        ])
    }

    #[test]
    fn test_invalid_report() {
        let report = ValidationReport::invalid("Instance", &sample_error());
        assert!(!report.valid);
        assert_eq!(report.violation_count, 2);
        assert_eq!(report.summary, "Instance has 2 violation(s)");
        assert_eq!(report.violations[1].actual.as_deref(), Some("0"));
        assert!(report.normalized.is_none());
    }

    #[test]
    fn test_report_json_shape() {
        let report = ValidationReport::invalid("Instance", &sample_error());
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["violations"][0]["reason"], "MISSING_REQUIRED");
        assert_eq!(value["violations"][0]["field_path"], "tier");
        assert!(value.get("normalized").is_none());

        let report = ValidationReport::valid("UpdateMask", json!({"paths": ["labels"]}));
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["valid"], true);
        assert_eq!(value["normalized"]["paths"][0], "labels");
    }

    #[test]
    fn test_render_all_formats() {
        let report = ValidationReport::invalid("Instance", &sample_error());
        for format in [OutputFormat::Table, OutputFormat::Json, OutputFormat::Yaml] {
            assert!(report.render(format).is_ok());
        }
    }
}
