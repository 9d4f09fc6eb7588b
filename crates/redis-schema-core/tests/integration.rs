//! Integration tests for the Redis schema validator
//!
//! Exercises the public API the way a client library would: documents come
//! in as JSON or YAML, are validated, and come back out normalized.

use redis_schema_core::telemetry::ValidationMetricsRegistry;
use redis_schema_core::{
    default_data_protection_mode, format_resource_name, parse_resource_name, validate_instance,
    validate_update_mask, CreateInstanceRequestDraft, DataProtectionMode, InstanceDraft,
    ListInstancesResponseDraft, LocationMetadata, MessageKind, OperationMetadataDraft,
    SchemaConfig, SchemaValidator, State, Tier, ViolationReason, INSTANCE_UPDATE_PATHS,
};
use serde_json::json;

/// Helper to create a valid BASIC instance candidate
fn create_test_draft() -> InstanceDraft {
    InstanceDraft::new()
        .with_name("projects/p1/locations/us-east1/instances/cache1")
        .with_tier(Tier::Basic)
        .with_memory_size_gb(4)
}

#[test]
fn test_minimal_instance_scenario() {
    let instance = validate_instance(&create_test_draft()).unwrap();

    assert_eq!(instance.name().project(), "p1");
    assert_eq!(instance.name().location(), "us-east1");
    assert_eq!(instance.name().instance(), "cache1");
    assert_eq!(instance.tier(), Tier::Basic);
    assert_eq!(instance.memory_size_gb(), 4);
    assert_eq!(instance.state(), None);
}

#[test]
fn test_bad_name_scenario() {
    let err = validate_instance(&create_test_draft().with_name("bad-name")).unwrap_err();

    assert_eq!(err.len(), 1);
    let violation = &err.violations()[0];
    assert_eq!(violation.field_path, "name");
    assert_eq!(violation.reason, ViolationReason::MalformedResourceName);
}

#[test]
fn test_update_mask_scenarios() {
    let empty: Vec<String> = Vec::new();
    let err = validate_update_mask(&empty, INSTANCE_UPDATE_PATHS).unwrap_err();
    assert!(err.has_reason(ViolationReason::MissingRequired));

    let err = validate_update_mask(&["bogusField"], INSTANCE_UPDATE_PATHS).unwrap_err();
    assert!(err.has_reason(ViolationReason::UnknownFieldPath));

    let mask = validate_update_mask(&["labels", "redisConfig"], INSTANCE_UPDATE_PATHS).unwrap();
    assert_eq!(mask.len(), 2);
}

#[test]
fn test_default_data_protection_mode() {
    assert_eq!(default_data_protection_mode(), DataProtectionMode::LimitedDataLoss);
}

#[test]
fn test_resource_name_format_and_parse() {
    let name = parse_resource_name("projects/my-proj/locations/europe-west1/instances/redis-a").unwrap();
    assert_eq!(
        format_resource_name(&name),
        "projects/my-proj/locations/europe-west1/instances/redis-a"
    );
    assert_eq!(name.parent().to_string(), "projects/my-proj/locations/europe-west1");
}

#[test]
fn test_instance_from_service_response() {
    let response = json!({
        "name": "projects/p1/locations/us-central1/instances/ha-cache",
        "displayName": "HA cache",
        "labels": {"env": "prod", "team": "payments"},
        "locationId": "us-central1-a",
        "alternativeLocationId": "us-central1-f",
        "redisVersion": "REDIS_4_0",
        "reservedIpRange": "10.0.0.0/29",
        "host": "10.0.0.3",
        "port": 6379,
        "currentLocationId": "us-central1-a",
        "createTime": "2019-04-11T09:30:00.123456Z",
        "state": "READY",
        "redisConfigs": {"maxmemory-policy": "allkeys-lru", "activedefrag": "yes"},
        "tier": "STANDARD_HA",
        "memorySizeGb": 5,
        "authorizedNetwork": "projects/p1/global/networks/default",
        "persistenceIamIdentity": "serviceAccount:redis@example.iam.gserviceaccount.com"
    });

    let draft: InstanceDraft = serde_json::from_value(response).unwrap();
    let instance = SchemaValidator::new().validate_instance(&draft).unwrap();

    assert_eq!(instance.state(), Some(State::Ready));
    assert_eq!(instance.tier(), Tier::StandardHa);
    assert_eq!(instance.port(), Some(6379));
    assert_eq!(instance.labels().len(), 2);
    assert_eq!(instance.redis_configs()["activedefrag"], "yes");

    let back = serde_json::to_value(&instance).unwrap();
    assert_eq!(back["state"], "READY");
    assert_eq!(back["redisVersion"], "REDIS_4_0");
}

#[test]
fn test_numeric_enums_accepted() {
    let draft: InstanceDraft = serde_json::from_value(json!({
        "name": "projects/p/locations/l/instances/i",
        "tier": 1,
        "memorySizeGb": 1,
        "state": 8
    }))
    .unwrap();
    let instance = validate_instance(&draft).unwrap();
    assert_eq!(instance.tier(), Tier::Basic);
    assert_eq!(instance.state(), Some(State::Importing));
}

#[test]
fn test_yaml_create_request() {
    let yaml = r#"
parent: projects/p1/locations/us-east1
instanceId: sessions
instance:
  tier: STANDARD_HA
  memorySizeGb: 10
  locationId: us-east1-b
  alternativeLocationId: us-east1-c
  redisConfigs:
    maxmemory-policy: volatile-lru
"#;
    let draft: CreateInstanceRequestDraft = serde_yaml::from_str(yaml).unwrap();
    let request = SchemaValidator::new()
        .validate_create_instance_request(&draft)
        .unwrap();
    assert_eq!(request.instance_id().as_str(), "sessions");
    assert_eq!(
        request.instance().name().to_string(),
        "projects/p1/locations/us-east1/instances/sessions"
    );
}

#[test]
fn test_instance_id_boundaries() {
    let validator = SchemaValidator::new();
    let request = |id: &str| CreateInstanceRequestDraft {
        parent: Some("projects/p/locations/us-east1".into()),
        instance_id: Some(id.into()),
        instance: Some(InstanceDraft::new().with_tier(Tier::Basic).with_memory_size_gb(1)),
    };

    let forty = format!("a{}", "b".repeat(39));
    assert!(validator.validate_create_instance_request(&request(&forty)).is_ok());

    let forty_one = format!("a{}", "b".repeat(40));
    for bad in [forty_one.as_str(), "1cache", "cache-", "Cache"] {
        let err = validator
            .validate_create_instance_request(&request(bad))
            .unwrap_err();
        assert!(err.has("instanceId", ViolationReason::ConstraintViolation), "{}", bad);
    }
}

#[test]
fn test_custom_config_from_toml() {
    let config = SchemaConfig::from_toml_str(
        r#"
        [redis_config_keys]
        REDIS_3_2 = ["maxmemory-policy", "notify-keyspace-events"]
        REDIS_4_0 = ["activedefrag", "lfu-log-factor", "lfu-decay-time", "maxmemory-gb"]
        "#,
    )
    .unwrap();
    let validator = SchemaValidator::with_config(config);
    let draft = create_test_draft().with_redis_config("maxmemory-gb", "3");

    assert!(validator.validate_instance(&draft).is_ok());
    assert!(SchemaValidator::new().validate_instance(&draft).is_err());
}

#[test]
fn test_aggregated_list_response() {
    let draft: ListInstancesResponseDraft = serde_json::from_value(json!({
        "instances": [
            {"name": "projects/p/locations/us-east1/instances/a", "tier": "BASIC", "memorySizeGb": 1},
            {"name": "projects/p/locations/europe-west1/instances/-"}
        ],
        "unreachable": ["projects/p/locations/europe-west1"]
    }))
    .unwrap();

    let response = SchemaValidator::new()
        .validate_list_instances_response(&draft)
        .unwrap();
    assert_eq!(response.instances().len(), 1);
    assert_eq!(response.placeholders().len(), 1);
    assert!(!response.has_next_page());
}

#[test]
fn test_list_response_document_keeps_placeholders() {
    let document = json!({
        "instances": [
            {"name": "projects/p/locations/us-east1/instances/a", "tier": "BASIC", "memorySizeGb": 1},
            {"name": "projects/p/locations/europe-west1/instances/-"}
        ],
        "unreachable": ["europe-west1"]
    });

    let normalized = SchemaValidator::new()
        .validate_document(MessageKind::ListInstancesResponse, document)
        .unwrap();
    let names: Vec<&str> = normalized["instances"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "projects/p/locations/us-east1/instances/a",
            "projects/p/locations/europe-west1/instances/-",
        ]
    );
    assert_eq!(normalized["unreachable"], json!(["europe-west1"]));
}

#[test]
fn test_operation_lifecycle() {
    let validator = SchemaValidator::new();
    let started: OperationMetadataDraft = serde_json::from_value(json!({
        "createTime": "2019-04-11T09:30:00Z",
        "target": "projects/p/locations/us-east1/instances/cache1",
        "verb": "create",
        "apiVersion": "v1"
    }))
    .unwrap();
    let mut finished = started.clone();
    finished.end_time = Some("2019-04-11T09:34:00Z".into());

    let started = validator.validate_operation_metadata(&started).unwrap();
    let finished = validator.validate_operation_metadata(&finished).unwrap();

    assert!(validator.check_operation_progress(&started, &finished).is_ok());
    assert!(validator.check_operation_progress(&finished, &started).is_err());
}

#[test]
fn test_zone_placement() {
    let validator = SchemaValidator::new();
    let instance = validator
        .validate_instance(&create_test_draft().with_location_id("us-east1-d"))
        .unwrap();

    let zones = LocationMetadata::with_zones(["us-east1-b", "us-east1-c", "us-east1-d"]);
    assert!(validator.check_zone_placement(&instance, &zones).is_ok());

    let zones = LocationMetadata::with_zones(["us-east1-b"]);
    let err = validator.check_zone_placement(&instance, &zones).unwrap_err();
    assert!(err.has("locationId", ViolationReason::ConstraintViolation));
}

#[test]
fn test_metrics_across_message_kinds() {
    let registry = ValidationMetricsRegistry::new().unwrap();
    let validator = SchemaValidator::new().with_metrics(registry.validation().clone());

    for kind in [MessageKind::GetInstanceRequest, MessageKind::DeleteInstanceRequest] {
        let _ = validator.validate_document(kind, json!({"name": "projects/p/locations/l/instances/i"}));
        let _ = validator.validate_document(kind, json!({}));
    }

    let metrics = registry.validation();
    assert_eq!(metrics.validation_count("GetInstanceRequest", true), 1);
    assert_eq!(metrics.validation_count("DeleteInstanceRequest", false), 1);
    assert_eq!(metrics.violation_count("GetInstanceRequest", "MISSING_REQUIRED"), 1);

    let text = registry.encode_text().unwrap();
    assert!(text.contains("redis_schema_violations_total"));
}

#[test]
fn test_validation_is_thread_safe() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let draft = create_test_draft().with_memory_size_gb(i + 1);
                validate_instance(&draft).map(|instance| instance.memory_size_gb())
            })
        })
        .collect();

    let sizes: Vec<u32> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();
    assert_eq!(sizes, vec![1, 2, 3, 4]);
}
