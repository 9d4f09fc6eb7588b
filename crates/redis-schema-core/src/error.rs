//! Error types for schema validation
//!
//! Validation failures are values: a [`ValidationError`] carries every
//! [`FieldViolation`] found in a single call so callers can report all
//! problems at once. Configuration loading has its own [`ConfigError`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Closed set of reasons a field can be rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationReason {
    /// A required field is absent or empty
    MissingRequired,
    /// A value is not a member of its enumeration
    InvalidEnum,
    /// A value is present but breaks a field or cross-field constraint
    ConstraintViolation,
    /// An update mask names a path outside its allow-list
    UnknownFieldPath,
    /// A resource name does not follow its documented pattern
    MalformedResourceName,
}

impl ViolationReason {
    /// Wire spelling of the reason
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationReason::MissingRequired => "MISSING_REQUIRED",
            ViolationReason::InvalidEnum => "INVALID_ENUM",
            ViolationReason::ConstraintViolation => "CONSTRAINT_VIOLATION",
            ViolationReason::UnknownFieldPath => "UNKNOWN_FIELD_PATH",
            ViolationReason::MalformedResourceName => "MALFORMED_RESOURCE_NAME",
        }
    }
}

impl fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Path to the offending field (e.g. `instance.memorySizeGb`)
    pub field_path: String,
    /// Why the field was rejected
    pub reason: ViolationReason,
    /// Human-readable description
    pub message: String,
    /// Expected shape or value, if applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Value that was found, if applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl FieldViolation {
    /// Create a new violation
    pub fn new(
        field_path: impl Into<String>,
        reason: ViolationReason,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field_path: field_path.into(),
            reason,
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    /// Required field is absent
    pub fn missing(field_path: impl Into<String>) -> Self {
        let field_path = field_path.into();
        let message = format!("'{}' is required", field_path);
        Self::new(field_path, ViolationReason::MissingRequired, message)
    }

    /// Value is not a member of the enumeration
    pub fn invalid_enum(
        field_path: impl Into<String>,
        actual: impl fmt::Display,
        allowed: &[&str],
    ) -> Self {
        Self::new(
            field_path,
            ViolationReason::InvalidEnum,
            format!("'{}' is not an allowed value", actual),
        )
        .with_expected(format!("one of {}", allowed.join(", ")))
        .with_actual(actual.to_string())
    }

    /// Value breaks a constraint
    pub fn constraint(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field_path, ViolationReason::ConstraintViolation, message)
    }

    /// Update mask path outside the allow-list
    pub fn unknown_path(field_path: impl Into<String>, path: &str, allowed: &[&str]) -> Self {
        Self::new(
            field_path,
            ViolationReason::UnknownFieldPath,
            format!("'{}' is not an updatable field path", path),
        )
        .with_expected(format!("one of {}", allowed.join(", ")))
        .with_actual(path)
    }

    /// Resource name does not match its pattern
    pub fn malformed_name(
        field_path: impl Into<String>,
        actual: &str,
        pattern: &str,
        detail: impl fmt::Display,
    ) -> Self {
        Self::new(
            field_path,
            ViolationReason::MalformedResourceName,
            format!("malformed resource name: {}", detail),
        )
        .with_expected(pattern)
        .with_actual(actual)
    }

    /// Set the expected value
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Set the actual value found
    pub fn with_actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }

    /// Nest this violation under a parent field path
    pub fn prefixed(mut self, prefix: &str) -> Self {
        self.field_path = join_path(prefix, &self.field_path);
        self
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.reason, self.field_path, self.message)
    }
}

/// Every violation found while validating one value
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("validation failed: {}", summarize(.violations))]
pub struct ValidationError {
    violations: Vec<FieldViolation>,
}

impl ValidationError {
    /// Build an error from collected violations
    pub fn new(violations: Vec<FieldViolation>) -> Self {
        Self { violations }
    }

    /// Build an error from one violation
    pub fn single(violation: FieldViolation) -> Self {
        Self {
            violations: vec![violation],
        }
    }

    /// All violations, in the order they were found
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Consume the error, returning its violations
    pub fn into_violations(self) -> Vec<FieldViolation> {
        self.violations
    }

    /// Number of violations
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Whether the error holds no violations
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// First violation on the given field path
    pub fn find(&self, field_path: &str) -> Option<&FieldViolation> {
        self.violations.iter().find(|v| v.field_path == field_path)
    }

    /// Whether any violation has the given reason
    pub fn has_reason(&self, reason: ViolationReason) -> bool {
        self.violations.iter().any(|v| v.reason == reason)
    }

    /// Whether the given field was rejected for the given reason
    pub fn has(&self, field_path: &str, reason: ViolationReason) -> bool {
        self.violations
            .iter()
            .any(|v| v.field_path == field_path && v.reason == reason)
    }

    /// Nest every violation under a parent field path
    pub fn prefixed(self, prefix: &str) -> Self {
        Self {
            violations: self
                .violations
                .into_iter()
                .map(|v| v.prefixed(prefix))
                .collect(),
        }
    }
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{} ({})", v.field_path, v.reason))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn join_path(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        path.to_string()
    } else if path.is_empty() {
        prefix.to_string()
    } else {
        format!("{}.{}", prefix, path)
    }
}

/// Result type alias for validation operations
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Accumulates violations across a single validation call
#[derive(Debug, Default)]
pub(crate) struct Violations {
    found: Vec<FieldViolation>,
}

impl Violations {
    pub(crate) fn push(&mut self, violation: FieldViolation) {
        self.found.push(violation);
    }

    /// Keep the value on success, record the violations on failure
    pub(crate) fn take<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.found.extend(err.into_violations());
                None
            }
        }
    }

    /// Like [`Violations::take`], nesting failures under `prefix`
    pub(crate) fn take_nested<T>(&mut self, prefix: &str, result: Result<T>) -> Option<T> {
        self.take(result.map_err(|err| err.prefixed(prefix)))
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.found.is_empty()
    }

    pub(crate) fn into_error(self) -> ValidationError {
        ValidationError::new(self.found)
    }

    /// `Ok(value)` when nothing was recorded
    pub(crate) fn finish<T>(self, value: T) -> Result<T> {
        if self.found.is_empty() {
            Ok(value)
        } else {
            Err(self.into_error())
        }
    }
}

/// Errors raised while loading a [`crate::SchemaConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("Failed to read schema config: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid TOML for the expected shape
    #[error("Invalid schema config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration parsed but is unusable
    #[error("Invalid schema config: {0}")]
    Invalid(String),
}

/// Errors raised while validating an untyped document
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The document does not have the shape of the message
    #[error("Malformed document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The document has the right shape but breaks schema rules
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}
