//! The Redis instance resource
//!
//! [`InstanceDraft`] is the loosely typed candidate as it arrives from a
//! caller or a response document. Validation turns it into an [`Instance`],
//! whose fields are all known to be well formed.

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::net::Ipv4Addr;

use crate::config::SchemaConfig;
use crate::enums::{EnumRepr, RedisVersion, State, Tier, WireEnum};
use crate::error::{FieldViolation, Result, ValidationError, Violations};
use crate::resource_name::InstanceResourceName;

/// Key/value pairs in document order, duplicates kept
///
/// A JSON object with a repeated key is legal input; keeping every entry lets
/// the validator report the repetition instead of silently dropping it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entries(pub Vec<(String, String)>);

impl Entries {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Entries {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Entries(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl Serialize for Entries {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for Entries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = Entries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of strings to strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Entries, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, String>()? {
                    entries.push((key, value));
                }
                Ok(Entries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Candidate instance, before validation
///
/// Every field is optional so that missing and malformed values can be
/// reported together. Field names follow the service's JSON spelling.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstanceDraft {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub labels: Option<Entries>,
    pub location_id: Option<String>,
    pub alternative_location_id: Option<String>,
    pub redis_version: Option<String>,
    pub reserved_ip_range: Option<String>,
    pub host: Option<String>,
    pub port: Option<i64>,
    pub current_location_id: Option<String>,
    pub create_time: Option<String>,
    pub state: Option<EnumRepr>,
    pub status_message: Option<String>,
    pub redis_configs: Option<Entries>,
    pub tier: Option<EnumRepr>,
    pub memory_size_gb: Option<i64>,
    pub authorized_network: Option<String>,
    pub persistence_iam_identity: Option<String>,
}

impl InstanceDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_tier(mut self, tier: impl Into<EnumRepr>) -> Self {
        self.tier = Some(tier.into());
        self
    }

    pub fn with_memory_size_gb(mut self, memory_size_gb: i64) -> Self {
        self.memory_size_gb = Some(memory_size_gb);
        self
    }

    pub fn with_location_id(mut self, location_id: impl Into<String>) -> Self {
        self.location_id = Some(location_id.into());
        self
    }

    pub fn with_alternative_location_id(mut self, location_id: impl Into<String>) -> Self {
        self.alternative_location_id = Some(location_id.into());
        self
    }

    pub fn with_redis_version(mut self, version: impl Into<String>) -> Self {
        self.redis_version = Some(version.into());
        self
    }

    pub fn with_reserved_ip_range(mut self, range: impl Into<String>) -> Self {
        self.reserved_ip_range = Some(range.into());
        self
    }

    pub fn with_authorized_network(mut self, network: impl Into<String>) -> Self {
        self.authorized_network = Some(network.into());
        self
    }

    /// Append a label; repeated keys are kept and later rejected
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels
            .get_or_insert_with(Entries::default)
            .0
            .push((key.into(), value.into()));
        self
    }

    /// Append a redis config parameter
    pub fn with_redis_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.redis_configs
            .get_or_insert_with(Entries::default)
            .0
            .push((key.into(), value.into()));
        self
    }

    pub fn with_state(mut self, state: impl Into<EnumRepr>) -> Self {
        self.state = Some(state.into());
        self
    }
}

/// A validated Redis instance
///
/// Output-only fields are `None` on values built for outbound requests and
/// populated on values read back from the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "InstanceDraft")]
pub struct Instance {
    name: InstanceResourceName,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alternative_location_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    redis_version: Option<RedisVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reserved_ip_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_location_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    create_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<State>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_message: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    redis_configs: BTreeMap<String, String>,
    tier: Tier,
    memory_size_gb: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    authorized_network: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    persistence_iam_identity: Option<String>,
}

impl Instance {
    pub fn name(&self) -> &InstanceResourceName {
        &self.name
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    /// Requested primary zone
    pub fn location_id(&self) -> Option<&str> {
        self.location_id.as_deref()
    }

    /// Requested secondary zone (STANDARD_HA only)
    pub fn alternative_location_id(&self) -> Option<&str> {
        self.alternative_location_id.as_deref()
    }

    pub fn redis_version(&self) -> Option<RedisVersion> {
        self.redis_version
    }

    pub fn reserved_ip_range(&self) -> Option<&str> {
        self.reserved_ip_range.as_deref()
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn current_location_id(&self) -> Option<&str> {
        self.current_location_id.as_deref()
    }

    pub fn create_time(&self) -> Option<DateTime<Utc>> {
        self.create_time
    }

    /// Last state reported by the service
    pub fn state(&self) -> Option<State> {
        self.state
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn redis_configs(&self) -> &BTreeMap<String, String> {
        &self.redis_configs
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn memory_size_gb(&self) -> u32 {
        self.memory_size_gb
    }

    pub fn authorized_network(&self) -> Option<&str> {
        self.authorized_network.as_deref()
    }

    pub fn persistence_iam_identity(&self) -> Option<&str> {
        self.persistence_iam_identity.as_deref()
    }

    /// Zones this instance asks to be placed in
    pub fn requested_zones(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("locationId", self.location_id.as_deref()),
            ("alternativeLocationId", self.alternative_location_id.as_deref()),
        ]
        .into_iter()
        .filter_map(|(field, zone)| zone.map(|z| (field, z)))
    }
}

impl TryFrom<InstanceDraft> for Instance {
    type Error = ValidationError;

    fn try_from(draft: InstanceDraft) -> Result<Self> {
        validate(&draft, &SchemaConfig::default())
    }
}

/// Empty strings are proto3 defaults and mean "unset"
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn owned(value: &Option<String>) -> Option<String> {
    present(value).map(str::to_string)
}

fn check_tier(draft: &InstanceDraft, violations: &mut Violations) -> Option<Tier> {
    let repr = match &draft.tier {
        Some(repr) if !repr.is_blank() => repr,
        _ => {
            violations.push(FieldViolation::missing("tier"));
            return None;
        }
    };

    match repr.resolve::<Tier>() {
        Some(Tier::Unspecified) => {
            violations.push(
                FieldViolation::missing("tier")
                    .with_expected("BASIC or STANDARD_HA")
                    .with_actual(repr.to_string()),
            );
            None
        }
        Some(tier) => Some(tier),
        None => {
            violations.push(FieldViolation::invalid_enum("tier", repr, &Tier::names()));
            None
        }
    }
}

fn check_memory_size(draft: &InstanceDraft, violations: &mut Violations) -> Option<u32> {
    match draft.memory_size_gb {
        None => {
            violations.push(FieldViolation::missing("memorySizeGb"));
            None
        }
        Some(size) if size <= 0 => {
            violations.push(
                FieldViolation::constraint("memorySizeGb", "memory size must be a positive number of GiB")
                    .with_expected("> 0")
                    .with_actual(size.to_string()),
            );
            None
        }
        Some(size) => match u32::try_from(size) {
            Ok(size) => Some(size),
            Err(_) => {
                violations.push(
                    FieldViolation::constraint("memorySizeGb", "memory size is out of range")
                        .with_actual(size.to_string()),
                );
                None
            }
        },
    }
}

fn check_zones(
    location_id: Option<&str>,
    alternative_location_id: Option<&str>,
    tier: Option<Tier>,
    violations: &mut Violations,
) {
    let Some(alternative) = alternative_location_id else {
        return;
    };

    if location_id == Some(alternative) {
        violations.push(
            FieldViolation::constraint(
                "alternativeLocationId",
                "alternative zone must differ from locationId",
            )
            .with_actual(alternative),
        );
    }

    if tier == Some(Tier::Basic) {
        violations.push(
            FieldViolation::constraint(
                "alternativeLocationId",
                "alternative zone only applies to STANDARD_HA instances",
            )
            .with_expected("tier STANDARD_HA"),
        );
    }
}

fn check_redis_version(draft: &InstanceDraft, violations: &mut Violations) -> Option<RedisVersion> {
    let raw = present(&draft.redis_version)?;
    match RedisVersion::from_name(raw) {
        Some(version) => Some(version),
        None => {
            violations.push(FieldViolation::invalid_enum(
                "redisVersion",
                raw,
                &RedisVersion::names(),
            ));
            None
        }
    }
}

/// Collapse entries into a map, flagging repeated and empty keys
fn collect_entries(
    field: &str,
    entries: Option<&Entries>,
    violations: &mut Violations,
) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    let mut repeated = BTreeSet::new();
    for (key, value) in entries.into_iter().flat_map(Entries::iter) {
        if key.is_empty() {
            violations.push(FieldViolation::constraint(field, "keys must be non-empty"));
            continue;
        }
        if map.insert(key.to_string(), value.to_string()).is_some() && repeated.insert(key) {
            violations.push(FieldViolation::constraint(
                format!("{}.{}", field, key),
                format!("key '{}' appears more than once", key),
            ));
        }
    }
    map
}

fn check_redis_configs(
    configs: &BTreeMap<String, String>,
    version: Option<RedisVersion>,
    config: &SchemaConfig,
    violations: &mut Violations,
) {
    let allowed = config.allowed_redis_config_keys(version);
    for key in configs.keys() {
        if !allowed.contains(key.as_str()) {
            let supported = allowed.iter().copied().collect::<Vec<_>>().join(", ");
            violations.push(
                FieldViolation::constraint(
                    format!("redisConfigs.{}", key),
                    format!(
                        "'{}' is not a supported redis config parameter for {}",
                        key,
                        version.unwrap_or(RedisVersion::LATEST)
                    ),
                )
                .with_expected(format!("one of {}", supported)),
            );
        }
    }
}

/// `a.b.c.d/prefix` with an IPv4 address and a prefix of at most 32
fn is_ipv4_cidr(range: &str) -> bool {
    match range.split_once('/') {
        Some((addr, prefix)) => {
            addr.parse::<Ipv4Addr>().is_ok()
                && !prefix.is_empty()
                && prefix.chars().all(|c| c.is_ascii_digit())
                && prefix.parse::<u8>().map(|p| p <= 32).unwrap_or(false)
        }
        None => false,
    }
}

fn check_reserved_ip_range(draft: &InstanceDraft, violations: &mut Violations) -> Option<String> {
    let range = present(&draft.reserved_ip_range)?;
    if is_ipv4_cidr(range) {
        Some(range.to_string())
    } else {
        violations.push(
            FieldViolation::constraint("reservedIpRange", "reserved range must be an IPv4 CIDR block")
                .with_expected("a.b.c.d/prefix, e.g. 10.0.0.0/29")
                .with_actual(range),
        );
        None
    }
}

fn check_state(draft: &InstanceDraft, violations: &mut Violations) -> Option<State> {
    let repr = draft.state.as_ref().filter(|r| !r.is_blank())?;
    match repr.resolve::<State>() {
        Some(state) => Some(state),
        None => {
            violations.push(FieldViolation::invalid_enum("state", repr, &State::names()));
            None
        }
    }
}

fn check_port(draft: &InstanceDraft, violations: &mut Violations) -> Option<u16> {
    let port = draft.port.filter(|p| *p != 0)?;
    match u16::try_from(port) {
        Ok(port) => Some(port),
        Err(_) => {
            violations.push(
                FieldViolation::constraint("port", "port must be within 1-65535")
                    .with_actual(port.to_string()),
            );
            None
        }
    }
}

pub(crate) fn parse_timestamp(
    field: &str,
    raw: &Option<String>,
    violations: &mut Violations,
) -> Option<DateTime<Utc>> {
    let raw = present(raw)?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            violations.push(
                FieldViolation::constraint(field, format!("timestamp is not RFC 3339: {}", e))
                    .with_actual(raw),
            );
            None
        }
    }
}

/// Validate and normalize a candidate instance
///
/// Every violation is collected; the call fails only after all fields have
/// been examined.
pub(crate) fn validate(draft: &InstanceDraft, config: &SchemaConfig) -> Result<Instance> {
    let mut violations = Violations::default();

    let name = match present(&draft.name) {
        Some(raw) => violations.take(InstanceResourceName::parse_field(raw, "name")),
        None => {
            violations.push(FieldViolation::missing("name"));
            None
        }
    };

    let tier = check_tier(draft, &mut violations);
    let memory_size_gb = check_memory_size(draft, &mut violations);

    let location_id = owned(&draft.location_id);
    let alternative_location_id = owned(&draft.alternative_location_id);
    check_zones(
        location_id.as_deref(),
        alternative_location_id.as_deref(),
        tier,
        &mut violations,
    );

    let redis_version = check_redis_version(draft, &mut violations);
    let labels = collect_entries("labels", draft.labels.as_ref(), &mut violations);
    let redis_configs = collect_entries("redisConfigs", draft.redis_configs.as_ref(), &mut violations);
    check_redis_configs(&redis_configs, redis_version, config, &mut violations);
    let reserved_ip_range = check_reserved_ip_range(draft, &mut violations);

    let state = check_state(draft, &mut violations);
    let port = check_port(draft, &mut violations);
    let create_time = parse_timestamp("createTime", &draft.create_time, &mut violations);

    match (name, tier, memory_size_gb) {
        (Some(name), Some(tier), Some(memory_size_gb)) if violations.is_empty() => Ok(Instance {
            name,
            display_name: owned(&draft.display_name),
            labels,
            location_id,
            alternative_location_id,
            redis_version,
            reserved_ip_range,
            host: owned(&draft.host),
            port,
            current_location_id: owned(&draft.current_location_id),
            create_time,
            state,
            status_message: owned(&draft.status_message),
            redis_configs,
            tier,
            memory_size_gb,
            authorized_network: owned(&draft.authorized_network),
            persistence_iam_identity: owned(&draft.persistence_iam_identity),
        }),
        _ => Err(violations.into_error()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ViolationReason;

    fn basic() -> InstanceDraft {
        InstanceDraft::new()
            .with_name("projects/p1/locations/us-east1/instances/cache1")
            .with_tier(Tier::Basic)
            .with_memory_size_gb(4)
    }

    fn check(draft: &InstanceDraft) -> Result<Instance> {
        validate(draft, &SchemaConfig::default())
    }

    #[test]
    fn test_minimal_instance_is_valid() {
        let instance = check(&basic()).unwrap();
        assert_eq!(instance.tier(), Tier::Basic);
        assert_eq!(instance.memory_size_gb(), 4);
        assert_eq!(instance.state(), None);
        assert!(instance.labels().is_empty());
    }

    #[test]
    fn test_bad_name_is_the_only_violation() {
        let err = check(&basic().with_name("bad-name")).unwrap_err();
        assert_eq!(err.len(), 1);
        assert!(err.has("name", ViolationReason::MalformedResourceName));
    }

    #[test]
    fn test_padded_name_is_malformed() {
        let padded = " projects/p1/locations/us-east1/instances/cache1 ";
        let err = check(&basic().with_name(padded)).unwrap_err();
        assert!(err.has("name", ViolationReason::MalformedResourceName));
        assert!(crate::resource_name::parse_resource_name(padded).is_err());
    }

    #[test]
    fn test_all_missing_required_reported() {
        let err = check(&InstanceDraft::new()).unwrap_err();
        assert_eq!(err.len(), 3);
        for field in ["name", "tier", "memorySizeGb"] {
            assert!(err.has(field, ViolationReason::MissingRequired), "{}", field);
        }
    }

    #[test]
    fn test_unspecified_tier_counts_as_missing() {
        let err = check(&basic().with_tier(EnumRepr::Number(0))).unwrap_err();
        assert!(err.has("tier", ViolationReason::MissingRequired));

        let err = check(&basic().with_tier(EnumRepr::Number(2))).unwrap_err();
        assert!(err.has("tier", ViolationReason::InvalidEnum));
    }

    #[test]
    fn test_non_positive_memory() {
        for size in [0, -1] {
            let err = check(&basic().with_memory_size_gb(size)).unwrap_err();
            assert!(err.has("memorySizeGb", ViolationReason::ConstraintViolation));
        }
        let err = check(&basic().with_memory_size_gb(i64::MAX)).unwrap_err();
        assert!(err.has("memorySizeGb", ViolationReason::ConstraintViolation));
    }

    #[test]
    fn test_alternative_zone_rules() {
        let ha = basic()
            .with_tier(Tier::StandardHa)
            .with_location_id("us-east1-b")
            .with_alternative_location_id("us-east1-c");
        assert!(check(&ha).is_ok());

        let same = ha.clone().with_alternative_location_id("us-east1-b");
        let err = check(&same).unwrap_err();
        assert!(err.has("alternativeLocationId", ViolationReason::ConstraintViolation));

        let basic_with_alt = basic().with_alternative_location_id("us-east1-c");
        let err = check(&basic_with_alt).unwrap_err();
        assert!(err.has("alternativeLocationId", ViolationReason::ConstraintViolation));
    }

    #[test]
    fn test_redis_configs_respect_version() {
        let ok = basic()
            .with_redis_version("REDIS_4_0")
            .with_redis_config("activedefrag", "yes")
            .with_redis_config("maxmemory-policy", "allkeys-lru");
        assert!(check(&ok).is_ok());

        let too_new = basic()
            .with_redis_version("REDIS_3_2")
            .with_redis_config("lfu-log-factor", "10");
        let err = check(&too_new).unwrap_err();
        assert!(err.has("redisConfigs.lfu-log-factor", ViolationReason::ConstraintViolation));

        let unknown = basic().with_redis_config("maxclients", "100");
        let err = check(&unknown).unwrap_err();
        assert!(err.has("redisConfigs.maxclients", ViolationReason::ConstraintViolation));

        let bad_version = basic().with_redis_version("REDIS_9_9");
        let err = check(&bad_version).unwrap_err();
        assert!(err.has("redisVersion", ViolationReason::InvalidEnum));
    }

    #[test]
    fn test_duplicate_label_keys_rejected() {
        let draft = basic()
            .with_label("env", "prod")
            .with_label("env", "dev")
            .with_label("env", "qa")
            .with_label("", "x");
        let err = check(&draft).unwrap_err();
        assert_eq!(err.len(), 2);
        assert!(err.has("labels.env", ViolationReason::ConstraintViolation));
        assert!(err.has("labels", ViolationReason::ConstraintViolation));
    }

    #[test]
    fn test_reserved_ip_range_must_be_cidr() {
        assert!(check(&basic().with_reserved_ip_range("10.0.0.0/29")).is_ok());
        for bad in ["10.0.0.0", "10.0.0.0/33", "10.0.0/29", "10.0.0.0/-1", "fd00::/64"] {
            let err = check(&basic().with_reserved_ip_range(bad)).unwrap_err();
            assert!(err.has("reservedIpRange", ViolationReason::ConstraintViolation), "{}", bad);
        }
    }

    #[test]
    fn test_output_only_fields_checked_for_shape() {
        let mut draft = basic().with_state(State::Ready);
        draft.port = Some(6379);
        draft.create_time = Some("2019-03-01T10:00:00Z".to_string());
        let instance = check(&draft).unwrap();
        assert_eq!(instance.state(), Some(State::Ready));
        assert_eq!(instance.port(), Some(6379));
        assert!(instance.create_time().is_some());

        let mut bad = basic().with_state(EnumRepr::Number(7));
        bad.port = Some(70000);
        bad.create_time = Some("yesterday".to_string());
        let err = check(&bad).unwrap_err();
        assert!(err.has("state", ViolationReason::InvalidEnum));
        assert!(err.has("port", ViolationReason::ConstraintViolation));
        assert!(err.has("createTime", ViolationReason::ConstraintViolation));
    }

    #[test]
    fn test_empty_strings_normalize_to_unset() {
        let draft = basic().with_display_name("").with_location_id("  ");
        let instance = check(&draft).unwrap();
        assert_eq!(instance.display_name(), None);
        assert_eq!(instance.location_id(), None);
    }

    #[test]
    fn test_json_document_with_duplicate_labels() {
        let json = r#"{
            "name": "projects/p1/locations/us-east1/instances/cache1",
            "tier": "BASIC",
            "memorySizeGb": 1,
            "labels": {"team": "a", "team": "b"}
        }"#;
        let draft: InstanceDraft = serde_json::from_str(json).unwrap();
        let err = check(&draft).unwrap_err();
        assert!(err.has("labels.team", ViolationReason::ConstraintViolation));
    }

    #[test]
    fn test_instance_deserialize_validates() {
        let ok = r#"{"name": "projects/p/locations/l/instances/i", "tier": 3, "memorySizeGb": 5}"#;
        let instance: Instance = serde_json::from_str(ok).unwrap();
        assert_eq!(instance.tier(), Tier::StandardHa);

        let bad = r#"{"name": "projects/p/locations/l/instances/i", "tier": 3}"#;
        let err = serde_json::from_str::<Instance>(bad).unwrap_err();
        assert!(err.to_string().contains("memorySizeGb (MISSING_REQUIRED)"));
    }

    #[test]
    fn test_instance_serializes_camel_case() {
        let instance = check(&basic().with_label("env", "prod")).unwrap();
        let json = serde_json::to_value(&instance).unwrap();
        assert_eq!(json["memorySizeGb"], 4);
        assert_eq!(json["tier"], "BASIC");
        assert_eq!(json["labels"]["env"], "prod");
        assert!(json.get("state").is_none());
    }
}
