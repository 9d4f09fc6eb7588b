//! Validator configuration
//!
//! Allow-lists that the service documents and may extend over time. The
//! defaults mirror Cloud Redis v1; a TOML file can override any of them:
//!
//! ```toml
//! update_mask_paths = ["displayName", "labels", "memorySizeGb", "redisConfig"]
//! max_instance_id_length = 40
//!
//! [redis_config_keys]
//! REDIS_3_2 = ["maxmemory-policy", "notify-keyspace-events"]
//! REDIS_4_0 = ["activedefrag", "lfu-log-factor", "lfu-decay-time"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::enums::RedisVersion;
use crate::error::ConfigError;
use crate::resource_name::MAX_INSTANCE_ID_LENGTH;
use crate::update_mask::INSTANCE_UPDATE_PATHS;

/// Allow-lists and limits applied by [`crate::SchemaValidator`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Field paths an instance update may name
    pub update_mask_paths: Vec<String>,
    /// Redis config parameters keyed by the version that introduced them
    pub redis_config_keys: BTreeMap<RedisVersion, Vec<String>>,
    /// Longest accepted instance id
    pub max_instance_id_length: usize,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        let mut redis_config_keys = BTreeMap::new();
        redis_config_keys.insert(
            RedisVersion::Redis32,
            vec![
                "maxmemory-policy".to_string(),
                "notify-keyspace-events".to_string(),
            ],
        );
        redis_config_keys.insert(
            RedisVersion::Redis40,
            vec![
                "activedefrag".to_string(),
                "lfu-log-factor".to_string(),
                "lfu-decay-time".to_string(),
            ],
        );

        Self {
            update_mask_paths: INSTANCE_UPDATE_PATHS.iter().map(|p| p.to_string()).collect(),
            redis_config_keys,
            max_instance_id_length: MAX_INSTANCE_ID_LENGTH,
        }
    }
}

impl SchemaConfig {
    /// Parse a TOML document; omitted keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SchemaConfig = toml::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    /// Load a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Reject configurations no input could satisfy
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.update_mask_paths.is_empty() {
            return Err(ConfigError::Invalid(
                "update_mask_paths must name at least one path".to_string(),
            ));
        }
        if self.max_instance_id_length == 0 {
            return Err(ConfigError::Invalid(
                "max_instance_id_length must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Update mask allow-list as borrowed strings
    pub fn update_paths(&self) -> Vec<&str> {
        self.update_mask_paths.iter().map(String::as_str).collect()
    }

    /// Redis config parameters accepted for `version`
    ///
    /// Parameters are cumulative: a version accepts everything introduced by
    /// itself and any earlier version. No version means the latest.
    pub fn allowed_redis_config_keys(&self, version: Option<RedisVersion>) -> BTreeSet<&str> {
        let version = version.unwrap_or(RedisVersion::LATEST);
        self.redis_config_keys
            .range(..=version)
            .flat_map(|(_, keys)| keys.iter().map(String::as_str))
            .collect()
    }
}
