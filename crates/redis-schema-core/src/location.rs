//! Location metadata and zone placement

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{FieldViolation, Result, Violations};
use crate::instance::Instance;
use crate::resource_name::is_valid_segment;

/// Per-zone metadata; currently carries no fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneMetadata {}

/// Metadata attached to a `google.cloud.location.Location` for Redis
///
/// `availableZones` lists the zones of the region that can host an
/// instance, keyed by zone id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationMetadata {
    pub available_zones: BTreeMap<String, ZoneMetadata>,
}

impl LocationMetadata {
    /// Metadata listing the given zones
    pub fn with_zones<I, S>(zones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            available_zones: zones
                .into_iter()
                .map(|zone| (zone.into(), ZoneMetadata::default()))
                .collect(),
        }
    }

    pub fn is_available(&self, zone: &str) -> bool {
        self.available_zones.contains_key(zone)
    }

    pub fn zones(&self) -> impl Iterator<Item = &str> {
        self.available_zones.keys().map(String::as_str)
    }

    /// Zone ids are lowercase letters, digits and hyphens
    pub fn validate(&self) -> Result<()> {
        let mut violations = Violations::default();
        for zone in self.zones().filter(|zone| !is_valid_segment(zone)) {
            violations.push(
                FieldViolation::constraint(
                    format!("availableZones.{}", zone),
                    "zone ids must be lowercase letters, digits and hyphens",
                )
                .with_expected("[a-z0-9-]+")
                .with_actual(zone),
            );
        }
        violations.finish(())
    }
}

pub(crate) fn check_zone_placement(instance: &Instance, metadata: &LocationMetadata) -> Result<()> {
    metadata.validate()?;

    let mut violations = Violations::default();
    for (field, zone) in instance.requested_zones() {
        if !metadata.is_available(zone) {
            violations.push(
                FieldViolation::constraint(field, format!("zone '{}' is not available", zone))
                    .with_expected(format!(
                        "one of {}",
                        metadata.zones().collect::<Vec<_>>().join(", ")
                    ))
                    .with_actual(zone),
            );
        }
    }
    violations.finish(())
}
