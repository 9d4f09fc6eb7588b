//! The schema validator
//!
//! [`SchemaValidator`] is the single entry point for every check in this
//! crate. It is stateless apart from its [`SchemaConfig`] and an optional
//! metrics sink, so one value can be shared freely across threads.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Instant;

use crate::config::SchemaConfig;
use crate::error::{DocumentError, Result, ValidationError};
use crate::instance::{self, Instance, InstanceDraft};
use crate::location::{self, LocationMetadata};
use crate::operation::{self, OperationMetadata, OperationMetadataDraft};
use crate::requests::{
    self, CreateInstanceRequest, CreateInstanceRequestDraft, DeleteInstanceRequest,
    ExportInstanceRequest, ExportInstanceRequestDraft, FailoverInstanceRequest,
    FailoverInstanceRequestDraft, GetInstanceRequest, ImportInstanceRequest,
    ImportInstanceRequestDraft, InstanceNameDraft, ListInstancesRequest, ListInstancesRequestDraft,
    ListInstancesResponse, ListInstancesResponseDraft, UpdateInstanceRequest,
    UpdateInstanceRequestDraft,
};
use crate::resource_name::{self, InstanceResourceName};
use crate::telemetry::ValidationMetrics;
use crate::update_mask::{self, UpdateMask};

/// Kinds of message the validator understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    Instance,
    UpdateMask,
    ResourceName,
    ListInstancesRequest,
    ListInstancesResponse,
    GetInstanceRequest,
    CreateInstanceRequest,
    UpdateInstanceRequest,
    DeleteInstanceRequest,
    ImportInstanceRequest,
    ExportInstanceRequest,
    FailoverInstanceRequest,
    OperationMetadata,
    OperationProgress,
    ZonePlacement,
}

impl MessageKind {
    pub const ALL: &'static [MessageKind] = &[
        MessageKind::Instance,
        MessageKind::UpdateMask,
        MessageKind::ResourceName,
        MessageKind::ListInstancesRequest,
        MessageKind::ListInstancesResponse,
        MessageKind::GetInstanceRequest,
        MessageKind::CreateInstanceRequest,
        MessageKind::UpdateInstanceRequest,
        MessageKind::DeleteInstanceRequest,
        MessageKind::ImportInstanceRequest,
        MessageKind::ExportInstanceRequest,
        MessageKind::FailoverInstanceRequest,
        MessageKind::OperationMetadata,
        MessageKind::OperationProgress,
        MessageKind::ZonePlacement,
    ];

    /// Name used in logs and metric labels
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Instance => "Instance",
            MessageKind::UpdateMask => "UpdateMask",
            MessageKind::ResourceName => "ResourceName",
            MessageKind::ListInstancesRequest => "ListInstancesRequest",
            MessageKind::ListInstancesResponse => "ListInstancesResponse",
            MessageKind::GetInstanceRequest => "GetInstanceRequest",
            MessageKind::CreateInstanceRequest => "CreateInstanceRequest",
            MessageKind::UpdateInstanceRequest => "UpdateInstanceRequest",
            MessageKind::DeleteInstanceRequest => "DeleteInstanceRequest",
            MessageKind::ImportInstanceRequest => "ImportInstanceRequest",
            MessageKind::ExportInstanceRequest => "ExportInstanceRequest",
            MessageKind::FailoverInstanceRequest => "FailoverInstanceRequest",
            MessageKind::OperationMetadata => "OperationMetadata",
            MessageKind::OperationProgress => "OperationProgress",
            MessageKind::ZonePlacement => "ZonePlacement",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        MessageKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown message kind '{}'", s))
    }
}

/// Two observations of one operation, oldest first
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OperationProgressDocument {
    pub previous: OperationMetadataDraft,
    pub next: OperationMetadataDraft,
}

/// An instance together with the metadata of the region it targets
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZonePlacementDocument {
    pub instance: InstanceDraft,
    pub location_metadata: LocationMetadata,
}

/// Validates Cloud Redis messages
#[derive(Clone, Default)]
pub struct SchemaValidator {
    config: SchemaConfig,
    metrics: Option<ValidationMetrics>,
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("config", &self.config)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

impl SchemaValidator {
    /// Validator with the default allow-lists
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SchemaConfig) -> Self {
        Self {
            config,
            metrics: None,
        }
    }

    /// Record every validation into `metrics`
    pub fn with_metrics(mut self, metrics: ValidationMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Process-wide validator with the default configuration
    pub fn shared() -> &'static SchemaValidator {
        static SHARED: OnceLock<SchemaValidator> = OnceLock::new();
        SHARED.get_or_init(SchemaValidator::new)
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    fn observe<T>(&self, kind: MessageKind, check: impl FnOnce() -> Result<T>) -> Result<T> {
        let start = Instant::now();
        let result = check();

        if let Some(metrics) = &self.metrics {
            metrics.observe_duration(kind.as_str(), start.elapsed().as_secs_f64());
            metrics.record_validation(kind.as_str(), result.is_ok());
            if let Err(err) = &result {
                metrics.record_violations(kind.as_str(), err.violations());
            }
        }

        match &result {
            Ok(_) => tracing::debug!(kind = kind.as_str(), "Validation passed"),
            Err(err) => tracing::warn!(
                kind = kind.as_str(),
                violations = err.len(),
                error = %err,
                "Validation failed"
            ),
        }
        result
    }

    /// Validate a candidate instance, reporting every violation
    pub fn validate_instance(&self, draft: &InstanceDraft) -> Result<Instance> {
        self.observe(MessageKind::Instance, || instance::validate(draft, &self.config))
    }

    /// Validate an update mask against the configured instance allow-list
    pub fn validate_update_mask<S: AsRef<str>>(&self, mask: &[S]) -> Result<UpdateMask> {
        self.observe(MessageKind::UpdateMask, || {
            update_mask::validate_update_mask(mask, &self.config.update_paths())
        })
    }

    pub fn parse_resource_name(&self, s: &str) -> Result<InstanceResourceName> {
        self.observe(MessageKind::ResourceName, || resource_name::parse_resource_name(s))
    }

    pub fn validate_list_instances_request(
        &self,
        draft: &ListInstancesRequestDraft,
    ) -> Result<ListInstancesRequest> {
        self.observe(MessageKind::ListInstancesRequest, || {
            requests::validate_list_instances_request(draft)
        })
    }

    /// Validate a page of instances read back from the service
    pub fn validate_list_instances_response(
        &self,
        draft: &ListInstancesResponseDraft,
    ) -> Result<ListInstancesResponse> {
        self.observe(MessageKind::ListInstancesResponse, || {
            requests::validate_list_instances_response(draft, &self.config)
        })
    }

    pub fn validate_get_instance_request(&self, draft: &InstanceNameDraft) -> Result<GetInstanceRequest> {
        self.observe(MessageKind::GetInstanceRequest, || {
            requests::validate_get_instance_request(draft)
        })
    }

    /// Validate a create request, deriving `instance.name` when absent
    pub fn validate_create_instance_request(
        &self,
        draft: &CreateInstanceRequestDraft,
    ) -> Result<CreateInstanceRequest> {
        self.observe(MessageKind::CreateInstanceRequest, || {
            requests::validate_create_instance_request(draft, &self.config)
        })
    }

    pub fn validate_update_instance_request(
        &self,
        draft: &UpdateInstanceRequestDraft,
    ) -> Result<UpdateInstanceRequest> {
        self.observe(MessageKind::UpdateInstanceRequest, || {
            requests::validate_update_instance_request(draft, &self.config)
        })
    }

    pub fn validate_delete_instance_request(
        &self,
        draft: &InstanceNameDraft,
    ) -> Result<DeleteInstanceRequest> {
        self.observe(MessageKind::DeleteInstanceRequest, || {
            requests::validate_delete_instance_request(draft)
        })
    }

    pub fn validate_import_instance_request(
        &self,
        draft: &ImportInstanceRequestDraft,
    ) -> Result<ImportInstanceRequest> {
        self.observe(MessageKind::ImportInstanceRequest, || {
            requests::validate_import_instance_request(draft)
        })
    }

    pub fn validate_export_instance_request(
        &self,
        draft: &ExportInstanceRequestDraft,
    ) -> Result<ExportInstanceRequest> {
        self.observe(MessageKind::ExportInstanceRequest, || {
            requests::validate_export_instance_request(draft)
        })
    }

    /// Validate a failover request; an unset mode becomes the default
    pub fn validate_failover_instance_request(
        &self,
        draft: &FailoverInstanceRequestDraft,
    ) -> Result<FailoverInstanceRequest> {
        self.observe(MessageKind::FailoverInstanceRequest, || {
            requests::validate_failover_instance_request(draft)
        })
    }

    pub fn validate_operation_metadata(&self, draft: &OperationMetadataDraft) -> Result<OperationMetadata> {
        self.observe(MessageKind::OperationMetadata, || {
            operation::validate_operation_metadata(draft)
        })
    }

    /// Check that `next` is a legal successor of `previous`
    pub fn check_operation_progress(
        &self,
        previous: &OperationMetadata,
        next: &OperationMetadata,
    ) -> Result<()> {
        self.observe(MessageKind::OperationProgress, || {
            operation::check_operation_progress(previous, next)
        })
    }

    /// Check the instance's zones against those the region offers
    pub fn check_zone_placement(&self, instance: &Instance, metadata: &LocationMetadata) -> Result<()> {
        self.observe(MessageKind::ZonePlacement, || {
            location::check_zone_placement(instance, metadata)
        })
    }

    /// Validate a JSON document of the given kind
    ///
    /// Returns the normalized message on success. A document whose fields
    /// have the wrong JSON types fails with [`DocumentError::Malformed`]
    /// before any schema rule runs. [`MessageKind::ResourceName`] expects a
    /// JSON string, [`MessageKind::UpdateMask`] any update mask form.
    pub fn validate_document(
        &self,
        kind: MessageKind,
        document: serde_json::Value,
    ) -> std::result::Result<serde_json::Value, DocumentError> {
        match kind {
            MessageKind::Instance => to_value(self.validate_instance(&from_value(document)?)),
            MessageKind::UpdateMask => {
                let mask: update_mask::FieldMaskRepr = from_value(document)?;
                to_value(self.validate_update_mask(&mask.paths()))
            }
            MessageKind::ResourceName => {
                let name: String = from_value(document)?;
                to_value(self.parse_resource_name(&name))
            }
            MessageKind::ListInstancesRequest => {
                to_value(self.validate_list_instances_request(&from_value(document)?))
            }
            MessageKind::ListInstancesResponse => {
                to_value(self.validate_list_instances_response(&from_value(document)?))
            }
            MessageKind::GetInstanceRequest => {
                to_value(self.validate_get_instance_request(&from_value(document)?))
            }
            MessageKind::CreateInstanceRequest => {
                to_value(self.validate_create_instance_request(&from_value(document)?))
            }
            MessageKind::UpdateInstanceRequest => {
                to_value(self.validate_update_instance_request(&from_value(document)?))
            }
            MessageKind::DeleteInstanceRequest => {
                to_value(self.validate_delete_instance_request(&from_value(document)?))
            }
            MessageKind::ImportInstanceRequest => {
                to_value(self.validate_import_instance_request(&from_value(document)?))
            }
            MessageKind::ExportInstanceRequest => {
                to_value(self.validate_export_instance_request(&from_value(document)?))
            }
            MessageKind::FailoverInstanceRequest => {
                to_value(self.validate_failover_instance_request(&from_value(document)?))
            }
            MessageKind::OperationMetadata => {
                to_value(self.validate_operation_metadata(&from_value(document)?))
            }
            MessageKind::OperationProgress => {
                let doc: OperationProgressDocument = from_value(document)?;
                let previous = self.validate_operation_metadata(&doc.previous);
                let next = self.validate_operation_metadata(&doc.next);
                let (previous, next) = match (previous, next) {
                    (Ok(previous), Ok(next)) => (previous, next),
                    (previous, next) => {
                        let mut violations = Vec::new();
                        if let Err(err) = previous {
                            violations.extend(err.prefixed("previous").into_violations());
                        }
                        if let Err(err) = next {
                            violations.extend(err.prefixed("next").into_violations());
                        }
                        return Err(ValidationError::new(violations).into());
                    }
                };
                self.check_operation_progress(&previous, &next)?;
                to_value(Ok(next))
            }
            MessageKind::ZonePlacement => {
                let doc: ZonePlacementDocument = from_value(document)?;
                doc.location_metadata
                    .validate()
                    .map_err(|err| err.prefixed("locationMetadata"))?;
                let instance = self
                    .validate_instance(&doc.instance)
                    .map_err(|err| err.prefixed("instance"))?;
                self.check_zone_placement(&instance, &doc.location_metadata)
                    .map_err(|err| err.prefixed("instance"))?;
                to_value(Ok(instance))
            }
        }
    }
}

fn from_value<T: DeserializeOwned>(document: serde_json::Value) -> std::result::Result<T, DocumentError> {
    serde_json::from_value(document).map_err(DocumentError::Malformed)
}

fn to_value<T: Serialize>(result: Result<T>) -> std::result::Result<serde_json::Value, DocumentError> {
    serde_json::to_value(result?).map_err(DocumentError::Malformed)
}
