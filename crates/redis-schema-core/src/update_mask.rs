//! Update masks for partial instance updates

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FieldViolation, Result, ValidationError, Violations};

/// Instance fields an update request may modify
pub const INSTANCE_UPDATE_PATHS: &[&str] = &["displayName", "labels", "memorySizeGb", "redisConfig"];

/// Ordered, duplicate-free set of updatable field paths
///
/// Serializes in the FieldMask JSON form, a single comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct UpdateMask {
    paths: Vec<String>,
}

impl UpdateMask {
    /// Paths in the order they were first given
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn contains(&self, path: &str) -> bool {
        let path = to_lower_camel(path);
        self.paths.iter().any(|p| *p == path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Always false for a validated mask
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

impl fmt::Display for UpdateMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.paths.join(","))
    }
}

impl From<UpdateMask> for String {
    fn from(mask: UpdateMask) -> Self {
        mask.to_string()
    }
}

/// Update mask as it may appear in a document
///
/// Accepts the FieldMask JSON string (`"labels,memorySizeGb"`), a bare list,
/// or the message form `{"paths": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldMaskRepr {
    Joined(String),
    List(Vec<String>),
    Message { paths: Vec<String> },
}

impl FieldMaskRepr {
    /// Paths in document order; blank entries of a joined string are dropped
    pub fn paths(&self) -> Vec<String> {
        match self {
            FieldMaskRepr::Joined(joined) => joined
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
            FieldMaskRepr::List(paths) | FieldMaskRepr::Message { paths } => paths.clone(),
        }
    }
}

impl Default for FieldMaskRepr {
    fn default() -> Self {
        FieldMaskRepr::List(Vec::new())
    }
}

/// Convert a snake_case path to the lowerCamelCase JSON spelling
pub fn to_lower_camel(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut upper_next = false;
    for c in path.trim().chars() {
        if c == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Validate a mask against an allow-list
///
/// Fails with `MISSING_REQUIRED` when the mask is empty and with
/// `UNKNOWN_FIELD_PATH` for every path outside `allowed_paths`. Paths are
/// compared in lowerCamelCase, so `memory_size_gb` matches `memorySizeGb`.
/// Repeated paths collapse into one.
pub fn validate_update_mask<S: AsRef<str>>(mask: &[S], allowed_paths: &[&str]) -> Result<UpdateMask> {
    if mask.is_empty() {
        return Err(ValidationError::single(
            FieldViolation::missing("updateMask")
                .with_expected(format!("at least one of {}", allowed_paths.join(", "))),
        ));
    }

    let allowed: Vec<String> = allowed_paths.iter().map(|p| to_lower_camel(p)).collect();
    let mut violations = Violations::default();
    let mut paths: Vec<String> = Vec::with_capacity(mask.len());

    for (index, raw) in mask.iter().enumerate() {
        let path = to_lower_camel(raw.as_ref());
        if !allowed.contains(&path) {
            violations.push(FieldViolation::unknown_path(
                format!("updateMask.paths[{}]", index),
                raw.as_ref(),
                allowed_paths,
            ));
        } else if !paths.contains(&path) {
            paths.push(path);
        }
    }

    violations.finish(UpdateMask { paths })
}
