//! Request and response messages of the instance management API
//!
//! Each message has a `*Draft` form deserialized from documents and a
//! validated form produced by [`crate::SchemaValidator`].

use regex::Regex;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;

use crate::config::SchemaConfig;
use crate::enums::{default_data_protection_mode, DataProtectionMode, EnumRepr, WireEnum};
use crate::error::{FieldViolation, Result, ValidationError, ViolationReason, Violations};
use crate::instance::{self, present, Instance, InstanceDraft};
use crate::resource_name::{is_valid_segment, InstanceId, InstanceResourceName, LocationName};
use crate::update_mask::{validate_update_mask, FieldMaskRepr, UpdateMask};

fn required_instance_name(
    raw: &Option<String>,
    field: &str,
    violations: &mut Violations,
) -> Option<InstanceResourceName> {
    match present(raw) {
        Some(raw) => violations.take(InstanceResourceName::parse_field(raw, field)),
        None => {
            violations.push(FieldViolation::missing(field));
            None
        }
    }
}

fn required_location_name(
    raw: &Option<String>,
    field: &str,
    violations: &mut Violations,
) -> Option<LocationName> {
    match present(raw) {
        Some(raw) => violations.take(LocationName::parse_field(raw, field)),
        None => {
            violations.push(FieldViolation::missing(field));
            None
        }
    }
}

// ---------------------------------------------------------------------------
// ListInstances
// ---------------------------------------------------------------------------

/// Candidate `ListInstancesRequest`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListInstancesRequestDraft {
    pub parent: Option<String>,
    pub page_size: Option<i64>,
    pub page_token: Option<String>,
}

/// List the instances of one location, or of all locations with `-`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInstancesRequest {
    parent: LocationName,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_token: Option<String>,
}

impl ListInstancesRequest {
    pub fn parent(&self) -> &LocationName {
        &self.parent
    }

    /// Requested page size; the service defaults to 1000 when unset
    pub fn page_size(&self) -> Option<u32> {
        self.page_size
    }

    pub fn page_token(&self) -> Option<&str> {
        self.page_token.as_deref()
    }
}

pub(crate) fn validate_list_instances_request(
    draft: &ListInstancesRequestDraft,
) -> Result<ListInstancesRequest> {
    let mut violations = Violations::default();
    let parent = required_location_name(&draft.parent, "parent", &mut violations);

    let page_size = match draft.page_size {
        None | Some(0) => None,
        Some(size) if size < 0 => {
            violations.push(
                FieldViolation::constraint("pageSize", "page size must be positive")
                    .with_actual(size.to_string()),
            );
            None
        }
        Some(size) => match u32::try_from(size) {
            Ok(size) => Some(size),
            Err(_) => {
                violations.push(
                    FieldViolation::constraint("pageSize", "page size exceeds the 32-bit range")
                        .with_expected(format!("at most {}", u32::MAX))
                        .with_actual(size.to_string()),
                );
                None
            }
        },
    };

    match parent {
        Some(parent) if violations.is_empty() => Ok(ListInstancesRequest {
            parent,
            page_size,
            page_token: present(&draft.page_token).map(str::to_string),
        }),
        _ => Err(violations.into_error()),
    }
}

/// Candidate `ListInstancesResponse`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListInstancesResponseDraft {
    pub instances: Vec<InstanceDraft>,
    pub next_page_token: Option<String>,
    pub unreachable: Vec<String>,
}

/// Entry an aggregated query lists for a location it could not reach
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreachablePlaceholder {
    name: InstanceResourceName,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_message: Option<String>,
}

impl UnreachablePlaceholder {
    pub fn name(&self) -> &InstanceResourceName {
        &self.name
    }

    pub fn location(&self) -> &str {
        self.name.location()
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}

/// One page of instances
///
/// An aggregated (`-`) query marks each location it could not reach with a
/// placeholder entry named `.../instances/-`; those are kept apart in
/// [`ListInstancesResponse::placeholders`] rather than validated as instances.
/// Serializing lists them back under `instances`, after the real ones.
#[derive(Debug, Clone, PartialEq)]
pub struct ListInstancesResponse {
    instances: Vec<Instance>,
    placeholders: Vec<UnreachablePlaceholder>,
    next_page_token: Option<String>,
    unreachable: Vec<String>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ListedInstance<'a> {
    Instance(&'a Instance),
    Placeholder(&'a UnreachablePlaceholder),
}

impl Serialize for ListInstancesResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let listed: Vec<ListedInstance<'_>> = self
            .instances
            .iter()
            .map(ListedInstance::Instance)
            .chain(self.placeholders.iter().map(ListedInstance::Placeholder))
            .collect();

        let mut state = serializer.serialize_struct("ListInstancesResponse", 3)?;
        state.serialize_field("instances", &listed)?;
        match &self.next_page_token {
            Some(token) => state.serialize_field("nextPageToken", token)?,
            None => state.skip_field("nextPageToken")?,
        }
        if self.unreachable.is_empty() {
            state.skip_field("unreachable")?;
        } else {
            state.serialize_field("unreachable", &self.unreachable)?;
        }
        state.end()
    }
}

impl ListInstancesResponse {
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Placeholder entries for locations an aggregated query could not reach
    pub fn placeholders(&self) -> &[UnreachablePlaceholder] {
        &self.placeholders
    }

    pub fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }

    pub fn has_next_page(&self) -> bool {
        self.next_page_token.is_some()
    }

    /// Locations that could not be reached
    pub fn unreachable(&self) -> &[String] {
        &self.unreachable
    }
}

/// `us-east1` or `projects/p/locations/us-east1`
fn is_location_reference(location: &str) -> bool {
    if location.contains('/') {
        LocationName::parse(location).is_ok()
    } else {
        is_valid_segment(location)
    }
}

pub(crate) fn validate_list_instances_response(
    draft: &ListInstancesResponseDraft,
    config: &SchemaConfig,
) -> Result<ListInstancesResponse> {
    let mut violations = Violations::default();
    let mut instances = Vec::with_capacity(draft.instances.len());
    let mut placeholders = Vec::new();

    for (index, candidate) in draft.instances.iter().enumerate() {
        let prefix = format!("instances[{}]", index);
        let placeholder = present(&candidate.name)
            .and_then(|raw| InstanceResourceName::parse(raw).ok())
            .filter(InstanceResourceName::is_unreachable_placeholder);

        match placeholder {
            Some(name) => placeholders.push(UnreachablePlaceholder {
                name,
                status_message: present(&candidate.status_message).map(str::to_string),
            }),
            None => {
                if let Some(instance) =
                    violations.take_nested(&prefix, instance::validate(candidate, config))
                {
                    instances.push(instance);
                }
            }
        }
    }

    for (index, location) in draft.unreachable.iter().enumerate() {
        if !is_location_reference(location) {
            violations.push(
                FieldViolation::new(
                    format!("unreachable[{}]", index),
                    ViolationReason::MalformedResourceName,
                    "unreachable entries must name a location",
                )
                .with_actual(location.as_str()),
            );
        }
    }

    violations.finish(ListInstancesResponse {
        instances,
        placeholders,
        next_page_token: present(&draft.next_page_token).map(str::to_string),
        unreachable: draft.unreachable.clone(),
    })
}

// ---------------------------------------------------------------------------
// Get / Delete
// ---------------------------------------------------------------------------

/// Candidate request addressing one instance by name
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstanceNameDraft {
    pub name: Option<String>,
}

impl InstanceNameDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

/// Fetch one instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetInstanceRequest {
    name: InstanceResourceName,
}

impl GetInstanceRequest {
    pub fn name(&self) -> &InstanceResourceName {
        &self.name
    }
}

/// Delete one instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteInstanceRequest {
    name: InstanceResourceName,
}

impl DeleteInstanceRequest {
    pub fn name(&self) -> &InstanceResourceName {
        &self.name
    }
}

fn validate_name_only(draft: &InstanceNameDraft) -> Result<InstanceResourceName> {
    let mut violations = Violations::default();
    match required_instance_name(&draft.name, "name", &mut violations) {
        Some(name) => Ok(name),
        None => Err(violations.into_error()),
    }
}

pub(crate) fn validate_get_instance_request(draft: &InstanceNameDraft) -> Result<GetInstanceRequest> {
    validate_name_only(draft).map(|name| GetInstanceRequest { name })
}

pub(crate) fn validate_delete_instance_request(
    draft: &InstanceNameDraft,
) -> Result<DeleteInstanceRequest> {
    validate_name_only(draft).map(|name| DeleteInstanceRequest { name })
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Candidate `CreateInstanceRequest`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateInstanceRequestDraft {
    pub parent: Option<String>,
    pub instance_id: Option<String>,
    pub instance: Option<InstanceDraft>,
}

/// Create an instance under a location
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstanceRequest {
    parent: LocationName,
    instance_id: InstanceId,
    instance: Instance,
}

impl CreateInstanceRequest {
    pub fn parent(&self) -> &LocationName {
        &self.parent
    }

    pub fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    /// The instance to create; its name is `parent` + `instance_id`
    pub fn instance(&self) -> &Instance {
        &self.instance
    }
}

pub(crate) fn validate_create_instance_request(
    draft: &CreateInstanceRequestDraft,
    config: &SchemaConfig,
) -> Result<CreateInstanceRequest> {
    let mut violations = Violations::default();

    let parent = required_location_name(&draft.parent, "parent", &mut violations);
    if let Some(parent) = parent.as_ref().filter(|p| p.is_wildcard()) {
        violations.push(
            FieldViolation::constraint("parent", "instances are created in a single location")
                .with_actual(parent.to_string()),
        );
    }

    let instance_id = match present(&draft.instance_id) {
        Some(raw) => violations.take(InstanceId::parse_with_limit(
            raw,
            config.max_instance_id_length,
            "instanceId",
        )),
        None => {
            violations.push(FieldViolation::missing("instanceId"));
            None
        }
    };

    let derived = match (&parent, &instance_id) {
        (Some(parent), Some(id)) if !parent.is_wildcard() => Some(parent.instance(id)),
        _ => None,
    };

    let instance = match &draft.instance {
        None => {
            violations.push(FieldViolation::missing("instance"));
            None
        }
        Some(candidate) => {
            let name_given = present(&candidate.name).is_some();
            let mut candidate = candidate.clone();
            if !name_given {
                candidate.name = derived.as_ref().map(ToString::to_string);
            }

            let result = instance::validate(&candidate, config).map_err(|err| {
                // A missing name is only news when it could have been derived.
                let kept = err
                    .into_violations()
                    .into_iter()
                    .filter(|v| {
                        name_given || derived.is_some() || v.field_path != "name"
                    })
                    .collect();
                ValidationError::new(kept)
            });
            let result = match result {
                Err(err) if err.is_empty() => None,
                other => violations.take_nested("instance", other),
            };

            if let (Some(instance), Some(derived)) = (&result, &derived) {
                if instance.name() != derived {
                    violations.push(
                        FieldViolation::constraint(
                            "instance.name",
                            "instance name must match parent and instanceId",
                        )
                        .with_expected(derived.to_string())
                        .with_actual(instance.name().to_string()),
                    );
                }
            }
            result
        }
    };

    match (parent, instance_id, instance) {
        (Some(parent), Some(instance_id), Some(instance)) if violations.is_empty() => {
            Ok(CreateInstanceRequest {
                parent,
                instance_id,
                instance,
            })
        }
        _ => Err(violations.into_error()),
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// Candidate `UpdateInstanceRequest`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateInstanceRequestDraft {
    pub update_mask: Option<FieldMaskRepr>,
    pub instance: Option<InstanceDraft>,
}

/// Update the masked fields of an instance
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInstanceRequest {
    update_mask: UpdateMask,
    instance: Instance,
}

impl UpdateInstanceRequest {
    pub fn update_mask(&self) -> &UpdateMask {
        &self.update_mask
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }
}

pub(crate) fn validate_update_instance_request(
    draft: &UpdateInstanceRequestDraft,
    config: &SchemaConfig,
) -> Result<UpdateInstanceRequest> {
    let mut violations = Violations::default();

    let paths = draft.update_mask.as_ref().map(FieldMaskRepr::paths).unwrap_or_default();
    let update_mask = violations.take(validate_update_mask(&paths, &config.update_paths()));

    let instance = match &draft.instance {
        Some(candidate) => violations.take_nested("instance", instance::validate(candidate, config)),
        None => {
            violations.push(FieldViolation::missing("instance"));
            None
        }
    };

    match (update_mask, instance) {
        (Some(update_mask), Some(instance)) if violations.is_empty() => Ok(UpdateInstanceRequest {
            update_mask,
            instance,
        }),
        _ => Err(violations.into_error()),
    }
}

// ---------------------------------------------------------------------------
// Import / Export
// ---------------------------------------------------------------------------

/// Cloud Storage object location, `gs://bucket/object`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GcsUri {
    bucket: String,
    object: String,
}

fn gcs_uri_regex() -> &'static Regex {
    static GCS_URI: OnceLock<Regex> = OnceLock::new();
    GCS_URI.get_or_init(|| {
        Regex::new(r"^gs://([a-z0-9][a-z0-9._-]{1,220}[a-z0-9])/(\S+)$").expect("gcs uri pattern compiles")
    })
}

impl GcsUri {
    pub fn parse(s: &str) -> Result<Self> {
        Self::parse_field(s, "uri")
    }

    pub(crate) fn parse_field(s: &str, field_path: &str) -> Result<Self> {
        match gcs_uri_regex().captures(s) {
            Some(caps) => Ok(Self {
                bucket: caps[1].to_string(),
                object: caps[2].to_string(),
            }),
            None => Err(ValidationError::single(
                FieldViolation::constraint(field_path, "expected a Cloud Storage object URI")
                    .with_expected("gs://bucket/object")
                    .with_actual(s),
            )),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn object(&self) -> &str {
        &self.object
    }
}

impl fmt::Display for GcsUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gs://{}/{}", self.bucket, self.object)
    }
}

impl TryFrom<String> for GcsUri {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<GcsUri> for String {
    fn from(uri: GcsUri) -> Self {
        uri.to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GcsLocationDraft {
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InputConfigDraft {
    pub gcs_source: Option<GcsLocationDraft>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputConfigDraft {
    pub gcs_destination: Option<GcsLocationDraft>,
}

/// Candidate `ImportInstanceRequest`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportInstanceRequestDraft {
    pub name: Option<String>,
    pub input_config: Option<InputConfigDraft>,
}

/// Candidate `ExportInstanceRequest`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportInstanceRequestDraft {
    pub name: Option<String>,
    pub output_config: Option<OutputConfigDraft>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GcsSource {
    pub uri: GcsUri,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputConfig {
    pub gcs_source: GcsSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GcsDestination {
    pub uri: GcsUri,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    pub gcs_destination: GcsDestination,
}

/// Import an RDB file from Cloud Storage into an instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportInstanceRequest {
    name: InstanceResourceName,
    input_config: InputConfig,
}

impl ImportInstanceRequest {
    pub fn name(&self) -> &InstanceResourceName {
        &self.name
    }

    pub fn source(&self) -> &GcsUri {
        &self.input_config.gcs_source.uri
    }
}

/// Export an instance to an RDB file in Cloud Storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportInstanceRequest {
    name: InstanceResourceName,
    output_config: OutputConfig,
}

impl ExportInstanceRequest {
    pub fn name(&self) -> &InstanceResourceName {
        &self.name
    }

    /// Destination object; an existing object is overwritten
    pub fn destination(&self) -> &GcsUri {
        &self.output_config.gcs_destination.uri
    }
}

fn required_gcs_uri(
    raw: Option<&Option<String>>,
    field: &str,
    violations: &mut Violations,
) -> Option<GcsUri> {
    match raw.and_then(present) {
        Some(uri) => violations.take(GcsUri::parse_field(uri, field)),
        None => {
            violations.push(FieldViolation::missing(field));
            None
        }
    }
}

pub(crate) fn validate_import_instance_request(
    draft: &ImportInstanceRequestDraft,
) -> Result<ImportInstanceRequest> {
    let mut violations = Violations::default();
    let name = required_instance_name(&draft.name, "name", &mut violations);
    let uri = required_gcs_uri(
        draft
            .input_config
            .as_ref()
            .and_then(|c| c.gcs_source.as_ref())
            .map(|s| &s.uri),
        "inputConfig.gcsSource.uri",
        &mut violations,
    );

    match (name, uri) {
        (Some(name), Some(uri)) => Ok(ImportInstanceRequest {
            name,
            input_config: InputConfig {
                gcs_source: GcsSource { uri },
            },
        }),
        _ => Err(violations.into_error()),
    }
}

pub(crate) fn validate_export_instance_request(
    draft: &ExportInstanceRequestDraft,
) -> Result<ExportInstanceRequest> {
    let mut violations = Violations::default();
    let name = required_instance_name(&draft.name, "name", &mut violations);
    let uri = required_gcs_uri(
        draft
            .output_config
            .as_ref()
            .and_then(|c| c.gcs_destination.as_ref())
            .map(|d| &d.uri),
        "outputConfig.gcsDestination.uri",
        &mut violations,
    );

    match (name, uri) {
        (Some(name), Some(uri)) => Ok(ExportInstanceRequest {
            name,
            output_config: OutputConfig {
                gcs_destination: GcsDestination { uri },
            },
        }),
        _ => Err(violations.into_error()),
    }
}

// ---------------------------------------------------------------------------
// Failover
// ---------------------------------------------------------------------------

/// Candidate `FailoverInstanceRequest`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FailoverInstanceRequestDraft {
    pub name: Option<String>,
    pub data_protection_mode: Option<EnumRepr>,
}

/// Manually fail over a STANDARD_HA instance to its replica
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailoverInstanceRequest {
    name: InstanceResourceName,
    data_protection_mode: DataProtectionMode,
}

impl FailoverInstanceRequest {
    pub fn name(&self) -> &InstanceResourceName {
        &self.name
    }

    /// Never `Unspecified`; an unset mode resolves to the default
    pub fn data_protection_mode(&self) -> DataProtectionMode {
        self.data_protection_mode
    }
}

pub(crate) fn validate_failover_instance_request(
    draft: &FailoverInstanceRequestDraft,
) -> Result<FailoverInstanceRequest> {
    let mut violations = Violations::default();
    let name = required_instance_name(&draft.name, "name", &mut violations);

    let mode = match draft.data_protection_mode.as_ref().filter(|r| !r.is_blank()) {
        None => Some(default_data_protection_mode()),
        Some(repr) => match repr.resolve::<DataProtectionMode>() {
            Some(DataProtectionMode::Unspecified) => Some(default_data_protection_mode()),
            Some(mode) => Some(mode),
            None => {
                violations.push(FieldViolation::invalid_enum(
                    "dataProtectionMode",
                    repr,
                    &DataProtectionMode::names(),
                ));
                None
            }
        },
    };

    match (name, mode) {
        (Some(name), Some(data_protection_mode)) => Ok(FailoverInstanceRequest {
            name,
            data_protection_mode,
        }),
        _ => Err(violations.into_error()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::Tier;
    use serde_json::json;

    fn config() -> SchemaConfig {
        SchemaConfig::default()
    }

    fn instance_json() -> serde_json::Value {
        json!({"tier": "BASIC", "memorySizeGb": 2})
    }

    #[test]
    fn test_list_request() {
        let draft: ListInstancesRequestDraft =
            serde_json::from_value(json!({"parent": "projects/p/locations/-", "pageSize": 50}))
                .unwrap();
        let request = validate_list_instances_request(&draft).unwrap();
        assert!(request.parent().is_wildcard());
        assert_eq!(request.page_size(), Some(50));

        let draft = ListInstancesRequestDraft {
            parent: Some("projects/p/locations/us-east1".into()),
            page_size: Some(-5),
            page_token: None,
        };
        let err = validate_list_instances_request(&draft).unwrap_err();
        assert!(err.has("pageSize", ViolationReason::ConstraintViolation));
        assert_eq!(err.violations()[0].message, "page size must be positive");
    }

    #[test]
    fn test_list_request_page_size_out_of_range() {
        let draft = ListInstancesRequestDraft {
            parent: Some("projects/p/locations/us-east1".into()),
            page_size: Some(5_000_000_000),
            page_token: None,
        };
        let err = validate_list_instances_request(&draft).unwrap_err();
        let violation = &err.violations()[0];
        assert_eq!(violation.field_path, "pageSize");
        assert_eq!(violation.message, "page size exceeds the 32-bit range");
        assert_eq!(violation.actual.as_deref(), Some("5000000000"));
    }

    #[test]
    fn test_list_response_keeps_placeholders_apart() {
        let draft: ListInstancesResponseDraft = serde_json::from_value(json!({
            "instances": [
                {"name": "projects/p/locations/us-east1/instances/a", "tier": "BASIC", "memorySizeGb": 1},
                {"name": "projects/p/locations/asia-east1/instances/-", "status": "ERROR",
                 "statusMessage": "location not available for ListInstances"}
            ],
            "nextPageToken": "abc",
            "unreachable": ["asia-east1"]
        }))
        .unwrap();

        let response = validate_list_instances_response(&draft, &config()).unwrap();
        assert_eq!(response.instances().len(), 1);
        assert_eq!(response.placeholders()[0].location(), "asia-east1");
        assert_eq!(
            response.placeholders()[0].status_message(),
            Some("location not available for ListInstances")
        );
        assert!(response.has_next_page());
    }

    #[test]
    fn test_list_response_serializes_placeholders() {
        let draft: ListInstancesResponseDraft = serde_json::from_value(json!({
            "instances": [
                {"name": "projects/p/locations/europe-west1/instances/-"},
                {"name": "projects/p/locations/us-east1/instances/a", "tier": "BASIC", "memorySizeGb": 1}
            ],
            "unreachable": ["europe-west1"]
        }))
        .unwrap();

        let response = validate_list_instances_response(&draft, &config()).unwrap();
        let json = serde_json::to_value(&response).unwrap();
        let instances = json["instances"].as_array().unwrap();
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0]["name"], "projects/p/locations/us-east1/instances/a");
        assert_eq!(instances[1], json!({"name": "projects/p/locations/europe-west1/instances/-"}));
        assert_eq!(json["unreachable"], json!(["europe-west1"]));
        assert!(json.get("nextPageToken").is_none());

        let reparsed: ListInstancesResponseDraft = serde_json::from_value(json).unwrap();
        let again = validate_list_instances_response(&reparsed, &config()).unwrap();
        assert_eq!(again, response);
    }

    #[test]
    fn test_list_response_prefixes_instance_violations() {
        let draft: ListInstancesResponseDraft = serde_json::from_value(json!({
            "instances": [
                {"name": "projects/p/locations/us-east1/instances/a", "tier": "BASIC", "memorySizeGb": 1},
                {"name": "projects/p/locations/us-east1/instances/b", "tier": "BASIC"}
            ],
            "unreachable": ["Not A Location"]
        }))
        .unwrap();

        let err = validate_list_instances_response(&draft, &config()).unwrap_err();
        assert!(err.has("instances[1].memorySizeGb", ViolationReason::MissingRequired));
        assert!(err.has("unreachable[0]", ViolationReason::MalformedResourceName));
    }

    #[test]
    fn test_create_derives_instance_name() {
        let draft: CreateInstanceRequestDraft = serde_json::from_value(json!({
            "parent": "projects/p1/locations/us-east1",
            "instanceId": "cache1",
            "instance": instance_json()
        }))
        .unwrap();

        let request = validate_create_instance_request(&draft, &config()).unwrap();
        assert_eq!(
            request.instance().name().to_string(),
            "projects/p1/locations/us-east1/instances/cache1"
        );
        assert_eq!(request.instance().tier(), Tier::Basic);
    }

    #[test]
    fn test_create_rejects_mismatched_name() {
        let mut instance = instance_json();
        instance["name"] = json!("projects/p1/locations/us-east1/instances/other");
        let draft: CreateInstanceRequestDraft = serde_json::from_value(json!({
            "parent": "projects/p1/locations/us-east1",
            "instanceId": "cache1",
            "instance": instance
        }))
        .unwrap();

        let err = validate_create_instance_request(&draft, &config()).unwrap_err();
        assert_eq!(err.len(), 1);
        assert!(err.has("instance.name", ViolationReason::ConstraintViolation));
    }

    #[test]
    fn test_create_reports_every_problem_without_cascade() {
        let draft: CreateInstanceRequestDraft = serde_json::from_value(json!({
            "parent": "projects/p1/locations/-",
            "instanceId": "9lives",
            "instance": {"tier": "GOLD", "memorySizeGb": 0}
        }))
        .unwrap();

        let err = validate_create_instance_request(&draft, &config()).unwrap_err();
        assert!(err.has("parent", ViolationReason::ConstraintViolation));
        assert!(err.has("instanceId", ViolationReason::ConstraintViolation));
        assert!(err.has("instance.tier", ViolationReason::InvalidEnum));
        assert!(err.has("instance.memorySizeGb", ViolationReason::ConstraintViolation));
        assert!(err.find("instance.name").is_none());
        assert_eq!(err.len(), 4);
    }

    #[test]
    fn test_create_missing_everything() {
        let err = validate_create_instance_request(&CreateInstanceRequestDraft::default(), &config())
            .unwrap_err();
        for field in ["parent", "instanceId", "instance"] {
            assert!(err.has(field, ViolationReason::MissingRequired), "{}", field);
        }
    }

    #[test]
    fn test_create_respects_configured_id_length() {
        let mut config = config();
        config.max_instance_id_length = 5;
        let draft: CreateInstanceRequestDraft = serde_json::from_value(json!({
            "parent": "projects/p1/locations/us-east1",
            "instanceId": "cache-one",
            "instance": instance_json()
        }))
        .unwrap();
        let err = validate_create_instance_request(&draft, &config).unwrap_err();
        assert!(err.has("instanceId", ViolationReason::ConstraintViolation));
    }

    #[test]
    fn test_update_request() {
        let draft: UpdateInstanceRequestDraft = serde_json::from_value(json!({
            "updateMask": "displayName,memory_size_gb",
            "instance": {
                "name": "projects/p/locations/l/instances/i",
                "tier": "BASIC",
                "memorySizeGb": 8,
                "displayName": "bigger"
            }
        }))
        .unwrap();
        let request = validate_update_instance_request(&draft, &config()).unwrap();
        assert!(request.update_mask().contains("memorySizeGb"));
        assert_eq!(request.instance().memory_size_gb(), 8);

        let err = validate_update_instance_request(&UpdateInstanceRequestDraft::default(), &config())
            .unwrap_err();
        assert!(err.has("updateMask", ViolationReason::MissingRequired));
        assert!(err.has("instance", ViolationReason::MissingRequired));
    }

    #[test]
    fn test_get_and_delete() {
        let ok = InstanceNameDraft::new("projects/p/locations/l/instances/i");
        assert!(validate_get_instance_request(&ok).is_ok());
        assert!(validate_delete_instance_request(&ok).is_ok());

        let err = validate_get_instance_request(&InstanceNameDraft::default()).unwrap_err();
        assert!(err.has("name", ViolationReason::MissingRequired));

        let err = validate_delete_instance_request(&InstanceNameDraft::new("i")).unwrap_err();
        assert!(err.has("name", ViolationReason::MalformedResourceName));
    }

    #[test]
    fn test_import_and_export_uris() {
        let import: ImportInstanceRequestDraft = serde_json::from_value(json!({
            "name": "projects/p/locations/l/instances/i",
            "inputConfig": {"gcsSource": {"uri": "gs://my_bucket/dumps/dump.rdb"}}
        }))
        .unwrap();
        let request = validate_import_instance_request(&import).unwrap();
        assert_eq!(request.source().bucket(), "my_bucket");
        assert_eq!(request.source().object(), "dumps/dump.rdb");

        let export: ExportInstanceRequestDraft = serde_json::from_value(json!({
            "name": "projects/p/locations/l/instances/i",
            "outputConfig": {"gcsDestination": {"uri": "s3://bucket/key"}}
        }))
        .unwrap();
        let err = validate_export_instance_request(&export).unwrap_err();
        assert!(err.has("outputConfig.gcsDestination.uri", ViolationReason::ConstraintViolation));

        let err = validate_import_instance_request(&ImportInstanceRequestDraft::default()).unwrap_err();
        assert!(err.has("inputConfig.gcsSource.uri", ViolationReason::MissingRequired));
    }

    #[test]
    fn test_failover_mode_defaults() {
        let name = "projects/p/locations/l/instances/i";
        for mode in [None, Some(EnumRepr::Number(0)), Some(EnumRepr::Name(String::new()))] {
            let draft = FailoverInstanceRequestDraft {
                name: Some(name.into()),
                data_protection_mode: mode,
            };
            let request = validate_failover_instance_request(&draft).unwrap();
            assert_eq!(request.data_protection_mode(), DataProtectionMode::LimitedDataLoss);
        }

        let draft = FailoverInstanceRequestDraft {
            name: Some(name.into()),
            data_protection_mode: Some(EnumRepr::Name("FORCE_DATA_LOSS".into())),
        };
        let request = validate_failover_instance_request(&draft).unwrap();
        assert_eq!(request.data_protection_mode(), DataProtectionMode::ForceDataLoss);

        let draft = FailoverInstanceRequestDraft {
            name: Some(name.into()),
            data_protection_mode: Some(EnumRepr::Number(5)),
        };
        let err = validate_failover_instance_request(&draft).unwrap_err();
        assert!(err.has("dataProtectionMode", ViolationReason::InvalidEnum));
    }
}
