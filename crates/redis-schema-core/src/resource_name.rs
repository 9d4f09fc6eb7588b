//! Structured resource identifiers
//!
//! - [`InstanceResourceName`]: `projects/{project}/locations/{location}/instances/{instance}`
//! - [`LocationName`]: `projects/{project}/locations/{location}`
//! - [`InstanceId`]: the logical id chosen for a new instance
//!
//! Names parse from and format to their string form exactly, so
//! `InstanceResourceName::parse(&name.to_string()) == Ok(name)`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::{FieldViolation, Result, ValidationError};

/// Documented form of an instance name
pub const INSTANCE_NAME_PATTERN: &str =
    "projects/{project}/locations/{location}/instances/{instance}";

/// Documented form of a location name
pub const LOCATION_NAME_PATTERN: &str = "projects/{project}/locations/{location}";

/// Location segment that addresses every location of a project
pub const ALL_LOCATIONS: &str = "-";

/// Default upper bound on instance id length
pub const MAX_INSTANCE_ID_LENGTH: usize = 40;

fn segment_regex() -> &'static Regex {
    static SEGMENT: OnceLock<Regex> = OnceLock::new();
    SEGMENT.get_or_init(|| Regex::new(r"^[a-z0-9-]+$").expect("segment pattern compiles"))
}

fn instance_id_regex() -> &'static Regex {
    static INSTANCE_ID: OnceLock<Regex> = OnceLock::new();
    INSTANCE_ID
        .get_or_init(|| Regex::new(r"^[a-z]([a-z0-9-]*[a-z0-9])?$").expect("instance id pattern compiles"))
}

/// Whether a single name segment is well formed
pub fn is_valid_segment(segment: &str) -> bool {
    segment_regex().is_match(segment)
}

/// Split `s` into its variable segments, checking the literal collection ids
fn split_segments<'a>(
    s: &'a str,
    collections: &[&str],
    field_path: &str,
    pattern: &str,
) -> Result<Vec<&'a str>> {
    let malformed = |detail: String| {
        ValidationError::single(FieldViolation::malformed_name(field_path, s, pattern, detail))
    };

    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() != collections.len() * 2 {
        return Err(malformed(format!(
            "expected {} path segments, found {}",
            collections.len() * 2,
            parts.len()
        )));
    }

    let mut values = Vec::with_capacity(collections.len());
    for (pair, collection) in parts.chunks(2).zip(collections) {
        if pair[0] != *collection {
            return Err(malformed(format!(
                "expected collection '{}', found '{}'",
                collection, pair[0]
            )));
        }
        if !is_valid_segment(pair[1]) {
            return Err(malformed(format!(
                "{} id '{}' must be non-empty and match [a-z0-9-]+",
                collection.trim_end_matches('s'),
                pair[1]
            )));
        }
        values.push(pair[1]);
    }
    Ok(values)
}

fn check_segment(field_path: &str, kind: &str, value: &str, pattern: &str) -> Result<()> {
    if is_valid_segment(value) {
        Ok(())
    } else {
        Err(ValidationError::single(FieldViolation::malformed_name(
            field_path,
            value,
            pattern,
            format!("{} id '{}' must be non-empty and match [a-z0-9-]+", kind, value),
        )))
    }
}

/// Fully qualified name of a Redis instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstanceResourceName {
    project: String,
    location: String,
    instance: String,
}

impl InstanceResourceName {
    /// Build a name from its segments
    pub fn new(
        project: impl Into<String>,
        location: impl Into<String>,
        instance: impl Into<String>,
    ) -> Result<Self> {
        let name = Self {
            project: project.into(),
            location: location.into(),
            instance: instance.into(),
        };
        check_segment("name", "project", &name.project, INSTANCE_NAME_PATTERN)?;
        check_segment("name", "location", &name.location, INSTANCE_NAME_PATTERN)?;
        check_segment("name", "instance", &name.instance, INSTANCE_NAME_PATTERN)?;
        Ok(name)
    }

    /// Parse the string form, reporting failures against the `name` field
    pub fn parse(s: &str) -> Result<Self> {
        Self::parse_field(s, "name")
    }

    /// Parse the string form, reporting failures against `field_path`
    pub fn parse_field(s: &str, field_path: &str) -> Result<Self> {
        let segments = split_segments(
            s,
            &["projects", "locations", "instances"],
            field_path,
            INSTANCE_NAME_PATTERN,
        )?;
        Ok(Self {
            project: segments[0].to_string(),
            location: segments[1].to_string(),
            instance: segments[2].to_string(),
        })
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Region the instance is addressed in
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Location that owns this instance
    pub fn parent(&self) -> LocationName {
        LocationName {
            project: self.project.clone(),
            location: self.location.clone(),
        }
    }

    /// Placeholder entry an aggregated list uses for an unreachable location
    pub fn is_unreachable_placeholder(&self) -> bool {
        self.instance == ALL_LOCATIONS
    }
}

impl fmt::Display for InstanceResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "projects/{}/locations/{}/instances/{}",
            self.project, self.location, self.instance
        )
    }
}

impl FromStr for InstanceResourceName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for InstanceResourceName {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<InstanceResourceName> for String {
    fn from(name: InstanceResourceName) -> Self {
        name.to_string()
    }
}

/// Parse an instance resource name
pub fn parse_resource_name(s: &str) -> Result<InstanceResourceName> {
    InstanceResourceName::parse(s)
}

/// Format an instance resource name; inverse of [`parse_resource_name`]
pub fn format_resource_name(name: &InstanceResourceName) -> String {
    name.to_string()
}

/// Name of a project location (a region)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocationName {
    project: String,
    location: String,
}

impl LocationName {
    pub fn new(project: impl Into<String>, location: impl Into<String>) -> Result<Self> {
        let name = Self {
            project: project.into(),
            location: location.into(),
        };
        check_segment("parent", "project", &name.project, LOCATION_NAME_PATTERN)?;
        check_segment("parent", "location", &name.location, LOCATION_NAME_PATTERN)?;
        Ok(name)
    }

    /// Parse the string form, reporting failures against the `parent` field
    pub fn parse(s: &str) -> Result<Self> {
        Self::parse_field(s, "parent")
    }

    pub fn parse_field(s: &str, field_path: &str) -> Result<Self> {
        let segments =
            split_segments(s, &["projects", "locations"], field_path, LOCATION_NAME_PATTERN)?;
        Ok(Self {
            project: segments[0].to_string(),
            location: segments[1].to_string(),
        })
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Whether this addresses every location of the project
    pub fn is_wildcard(&self) -> bool {
        self.location == ALL_LOCATIONS
    }

    /// Name of an instance under this location
    pub fn instance(&self, instance_id: &InstanceId) -> InstanceResourceName {
        InstanceResourceName {
            project: self.project.clone(),
            location: self.location.clone(),
            instance: instance_id.as_str().to_string(),
        }
    }
}

impl fmt::Display for LocationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "projects/{}/locations/{}", self.project, self.location)
    }
}

impl FromStr for LocationName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LocationName {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<LocationName> for String {
    fn from(name: LocationName) -> Self {
        name.to_string()
    }
}

/// Logical id of a new instance
///
/// Lowercase letters, digits and hyphens; starts with a letter; ends with a
/// letter or digit; at most [`MAX_INSTANCE_ID_LENGTH`] characters by default.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstanceId(String);

impl InstanceId {
    /// Parse with the default length limit
    pub fn parse(s: &str) -> Result<Self> {
        Self::parse_with_limit(s, MAX_INSTANCE_ID_LENGTH, "instanceId")
    }

    pub(crate) fn parse_with_limit(s: &str, max_len: usize, field_path: &str) -> Result<Self> {
        let len = s.chars().count();
        if len > max_len {
            return Err(ValidationError::single(
                FieldViolation::constraint(
                    field_path,
                    format!("instance id is {} characters long, limit is {}", len, max_len),
                )
                .with_actual(s),
            ));
        }
        if !instance_id_regex().is_match(s) {
            return Err(ValidationError::single(
                FieldViolation::constraint(
                    field_path,
                    "instance id must use lowercase letters, digits and hyphens, \
                     start with a letter and end with a letter or digit",
                )
                .with_expected(r"^[a-z]([a-z0-9-]*[a-z0-9])?$")
                .with_actual(s),
            ));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for InstanceId {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<InstanceId> for String {
    fn from(id: InstanceId) -> Self {
        id.0
    }
}
