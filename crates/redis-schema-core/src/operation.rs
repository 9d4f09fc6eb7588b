//! Metadata of long-running instance operations
//!
//! Create, update, delete, import, export and failover all return a
//! long-running operation whose metadata describes its progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FieldViolation, Result, Violations};
use crate::instance::{parse_timestamp, present};
use crate::resource_name::InstanceResourceName;

/// Candidate `OperationMetadata`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OperationMetadataDraft {
    pub create_time: Option<String>,
    pub end_time: Option<String>,
    pub target: Option<String>,
    pub verb: Option<String>,
    pub status_detail: Option<String>,
    pub cancel_requested: Option<bool>,
    pub api_version: Option<String>,
}

/// Progress of a long-running operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationMetadata {
    create_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<InstanceResourceName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    verb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_detail: Option<String>,
    cancel_requested: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_version: Option<String>,
}

impl OperationMetadata {
    pub fn create_time(&self) -> DateTime<Utc> {
        self.create_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    /// Instance the operation acts on
    pub fn target(&self) -> Option<&InstanceResourceName> {
        self.target.as_ref()
    }

    /// Name of the verb executed, e.g. `create`
    pub fn verb(&self) -> Option<&str> {
        self.verb.as_deref()
    }

    pub fn status_detail(&self) -> Option<&str> {
        self.status_detail.as_deref()
    }

    /// Whether cancellation was requested
    pub fn cancel_requested(&self) -> bool {
        self.cancel_requested
    }

    pub fn api_version(&self) -> Option<&str> {
        self.api_version.as_deref()
    }

    /// Finished operations carry an end time
    pub fn is_done(&self) -> bool {
        self.end_time.is_some()
    }
}

pub(crate) fn validate_operation_metadata(draft: &OperationMetadataDraft) -> Result<OperationMetadata> {
    let mut violations = Violations::default();

    let create_time = parse_timestamp("createTime", &draft.create_time, &mut violations);
    if present(&draft.create_time).is_none() {
        violations.push(FieldViolation::missing("createTime"));
    }
    let end_time = parse_timestamp("endTime", &draft.end_time, &mut violations);

    if let (Some(created), Some(ended)) = (create_time, end_time) {
        if ended < created {
            violations.push(
                FieldViolation::constraint("endTime", "operation cannot end before it was created")
                    .with_expected(format!(">= {}", created.to_rfc3339()))
                    .with_actual(ended.to_rfc3339()),
            );
        }
    }

    let target = present(&draft.target)
        .and_then(|raw| violations.take(InstanceResourceName::parse_field(raw, "target")));

    match create_time {
        Some(create_time) if violations.is_empty() => Ok(OperationMetadata {
            create_time,
            end_time,
            target,
            verb: present(&draft.verb).map(str::to_string),
            status_detail: present(&draft.status_detail).map(str::to_string),
            cancel_requested: draft.cancel_requested.unwrap_or(false),
            api_version: present(&draft.api_version).map(str::to_string),
        }),
        _ => Err(violations.into_error()),
    }
}

/// Compare two snapshots of the same operation, `previous` observed first
///
/// Cancellation is sticky, an end time is final once reported, and neither
/// the creation time nor the target may change between polls.
pub(crate) fn check_operation_progress(previous: &OperationMetadata, next: &OperationMetadata) -> Result<()> {
    let mut violations = Violations::default();

    if previous.create_time != next.create_time {
        violations.push(
            FieldViolation::constraint("createTime", "creation time changed between snapshots")
                .with_expected(previous.create_time.to_rfc3339())
                .with_actual(next.create_time.to_rfc3339()),
        );
    }

    if let Some(ended) = previous.end_time {
        if next.end_time != Some(ended) {
            violations.push(
                FieldViolation::constraint("endTime", "end time is final once set")
                    .with_expected(ended.to_rfc3339())
                    .with_actual(
                        next.end_time
                            .map(|t| t.to_rfc3339())
                            .unwrap_or_else(|| "unset".to_string()),
                    ),
            );
        }
    }

    if previous.cancel_requested && !next.cancel_requested {
        violations.push(
            FieldViolation::constraint("cancelRequested", "cancellation request cannot be withdrawn")
                .with_expected("true")
                .with_actual("false"),
        );
    }

    if let (Some(before), Some(after)) = (&previous.target, &next.target) {
        if before != after {
            violations.push(
                FieldViolation::constraint("target", "operation target changed between snapshots")
                    .with_expected(before.to_string())
                    .with_actual(after.to_string()),
            );
        }
    }

    violations.finish(())
}
