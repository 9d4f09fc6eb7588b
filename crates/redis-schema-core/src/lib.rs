//! # Redis Schema Core
//!
//! Typed messages and validation rules for the Cloud Redis v1 instance
//! management API (`google.cloud.redis.v1`).
//!
//! Candidates arrive as loosely typed `*Draft` values, usually deserialized
//! from JSON. Validation checks them against the documented constraints and
//! either returns a strongly typed message or a [`ValidationError`] listing
//! every violated field.
//!
//! ## Example
//!
//! ```rust
//! use redis_schema_core::{validate_instance, InstanceDraft, Tier};
//!
//! let draft = InstanceDraft::new()
//!     .with_name("projects/p1/locations/us-east1/instances/cache1")
//!     .with_tier(Tier::Basic)
//!     .with_memory_size_gb(4);
//!
//! let instance = validate_instance(&draft).unwrap();
//! assert_eq!(instance.name().instance(), "cache1");
//! ```

pub mod config;
pub mod enums;
pub mod error;
pub mod instance;
pub mod location;
pub mod operation;
pub mod requests;
pub mod resource_name;
pub mod telemetry;
pub mod update_mask;
pub mod validator;

pub use config::SchemaConfig;
pub use enums::{default_data_protection_mode, DataProtectionMode, EnumRepr, RedisVersion, State, Tier, WireEnum};
pub use error::{ConfigError, DocumentError, FieldViolation, Result, ValidationError, ViolationReason};
pub use instance::{Entries, Instance, InstanceDraft};
pub use location::{LocationMetadata, ZoneMetadata};
pub use operation::{OperationMetadata, OperationMetadataDraft};
pub use requests::{
    CreateInstanceRequest, CreateInstanceRequestDraft, DeleteInstanceRequest, ExportInstanceRequest,
    ExportInstanceRequestDraft, FailoverInstanceRequest, FailoverInstanceRequestDraft, GcsUri,
    GetInstanceRequest, ImportInstanceRequest, ImportInstanceRequestDraft, InstanceNameDraft,
    ListInstancesRequest, ListInstancesRequestDraft, ListInstancesResponse,
    ListInstancesResponseDraft, UnreachablePlaceholder, UpdateInstanceRequest,
    UpdateInstanceRequestDraft,
};
pub use resource_name::{
    format_resource_name, parse_resource_name, InstanceId, InstanceResourceName, LocationName,
};
pub use update_mask::{validate_update_mask, FieldMaskRepr, UpdateMask, INSTANCE_UPDATE_PATHS};
pub use validator::{MessageKind, SchemaValidator};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Validate a candidate instance with the default configuration
pub fn validate_instance(draft: &InstanceDraft) -> Result<Instance> {
    SchemaValidator::shared().validate_instance(draft)
}
