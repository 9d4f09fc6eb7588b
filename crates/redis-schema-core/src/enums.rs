//! Closed enumerations of the Cloud Redis v1 API
//!
//! Each enum keeps the numeric value the service uses on the wire. JSON
//! documents may spell a value either by name (`"BASIC"`) or by number (`1`);
//! both forms resolve through [`EnumRepr`]. Values serialize by name.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Shared behaviour of the wire enumerations
pub trait WireEnum: Sized + Copy + 'static {
    /// Every variant, in wire-number order
    const VARIANTS: &'static [Self];

    /// Numeric wire value
    fn number(self) -> i32;

    /// Canonical wire name
    fn name(self) -> &'static str;

    /// Look up a variant by wire number
    fn from_number(number: i32) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|v| v.number() == number)
    }

    /// Look up a variant by wire name
    fn from_name(name: &str) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|v| v.name() == name)
    }

    /// All wire names, for diagnostics
    fn names() -> Vec<&'static str> {
        Self::VARIANTS.iter().map(|v| v.name()).collect()
    }
}

/// An enum value as it appears in a candidate document, not yet resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumRepr {
    /// Numeric form
    Number(i64),
    /// Name form
    Name(String),
}

impl EnumRepr {
    /// Resolve against a concrete enumeration
    pub fn resolve<E: WireEnum>(&self) -> Option<E> {
        match self {
            EnumRepr::Number(n) => i32::try_from(*n).ok().and_then(E::from_number),
            EnumRepr::Name(name) => E::from_name(name.trim()),
        }
    }

    /// Whether the value was left empty (`""`)
    pub fn is_blank(&self) -> bool {
        matches!(self, EnumRepr::Name(name) if name.trim().is_empty())
    }
}

impl fmt::Display for EnumRepr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumRepr::Number(n) => write!(f, "{}", n),
            EnumRepr::Name(name) => f.write_str(name),
        }
    }
}

impl<E: WireEnum> From<E> for EnumRepr {
    fn from(value: E) -> Self {
        EnumRepr::Name(value.name().to_string())
    }
}

macro_rules! wire_enum_serde {
    ($ty:ident) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.name())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let repr = EnumRepr::deserialize(deserializer)?;
                repr.resolve::<$ty>().ok_or_else(|| {
                    D::Error::custom(format!(
                        "unknown {} value '{}', expected one of {}",
                        stringify!($ty),
                        repr,
                        <$ty as WireEnum>::names().join(", ")
                    ))
                })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

/// Service tier of an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Not set
    Unspecified,
    /// Standalone instance
    Basic,
    /// Highly available primary/replica instances
    StandardHa,
}

impl WireEnum for Tier {
    const VARIANTS: &'static [Self] = &[Tier::Unspecified, Tier::Basic, Tier::StandardHa];

    fn number(self) -> i32 {
        match self {
            Tier::Unspecified => 0,
            Tier::Basic => 1,
            Tier::StandardHa => 3,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Tier::Unspecified => "TIER_UNSPECIFIED",
            Tier::Basic => "BASIC",
            Tier::StandardHa => "STANDARD_HA",
        }
    }
}

wire_enum_serde!(Tier);

/// Lifecycle state of an instance, as reported by the service
///
/// Transitions are driven by the service; this crate only checks membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Not set
    Unspecified,
    /// Being created
    Creating,
    /// Created and fully usable
    Ready,
    /// Configuration is being updated
    Updating,
    /// Being deleted
    Deleting,
    /// Being repaired and may be unusable
    Repairing,
    /// Maintenance in progress
    Maintenance,
    /// Importing data
    Importing,
    /// Failing over
    FailingOver,
}

impl WireEnum for State {
    const VARIANTS: &'static [Self] = &[
        State::Unspecified,
        State::Creating,
        State::Ready,
        State::Updating,
        State::Deleting,
        State::Repairing,
        State::Maintenance,
        State::Importing,
        State::FailingOver,
    ];

    fn number(self) -> i32 {
        match self {
            State::Unspecified => 0,
            State::Creating => 1,
            State::Ready => 2,
            State::Updating => 3,
            State::Deleting => 4,
            State::Repairing => 5,
            State::Maintenance => 6,
            State::Importing => 8,
            State::FailingOver => 9,
        }
    }

    fn name(self) -> &'static str {
        match self {
            State::Unspecified => "STATE_UNSPECIFIED",
            State::Creating => "CREATING",
            State::Ready => "READY",
            State::Updating => "UPDATING",
            State::Deleting => "DELETING",
            State::Repairing => "REPAIRING",
            State::Maintenance => "MAINTENANCE",
            State::Importing => "IMPORTING",
            State::FailingOver => "FAILING_OVER",
        }
    }
}

wire_enum_serde!(State);

/// Data protection applied to a manual failover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataProtectionMode {
    /// Not set; treated as [`DataProtectionMode::LimitedDataLoss`]
    Unspecified,
    /// Fail over only when the replication offset gap is under a threshold
    LimitedDataLoss,
    /// Fail over without data loss control
    ForceDataLoss,
}

impl WireEnum for DataProtectionMode {
    const VARIANTS: &'static [Self] = &[
        DataProtectionMode::Unspecified,
        DataProtectionMode::LimitedDataLoss,
        DataProtectionMode::ForceDataLoss,
    ];

    fn number(self) -> i32 {
        match self {
            DataProtectionMode::Unspecified => 0,
            DataProtectionMode::LimitedDataLoss => 1,
            DataProtectionMode::ForceDataLoss => 2,
        }
    }

    fn name(self) -> &'static str {
        match self {
            DataProtectionMode::Unspecified => "DATA_PROTECTION_MODE_UNSPECIFIED",
            DataProtectionMode::LimitedDataLoss => "LIMITED_DATA_LOSS",
            DataProtectionMode::ForceDataLoss => "FORCE_DATA_LOSS",
        }
    }
}

wire_enum_serde!(DataProtectionMode);

impl Default for DataProtectionMode {
    fn default() -> Self {
        default_data_protection_mode()
    }
}

/// Mode used when a failover request leaves it unspecified
pub fn default_data_protection_mode() -> DataProtectionMode {
    DataProtectionMode::LimitedDataLoss
}

/// Redis software version of an instance
///
/// Ordered oldest to newest; redis config parameters introduced by a version
/// stay available in every later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RedisVersion {
    /// Redis 3.2 compatibility
    Redis32,
    /// Redis 4.0 compatibility
    Redis40,
}

impl RedisVersion {
    /// Version the service picks when none is requested
    pub const LATEST: RedisVersion = RedisVersion::Redis40;
}

impl WireEnum for RedisVersion {
    const VARIANTS: &'static [Self] = &[RedisVersion::Redis32, RedisVersion::Redis40];

    // Versions travel as strings; the number only orders them.
    fn number(self) -> i32 {
        match self {
            RedisVersion::Redis32 => 32,
            RedisVersion::Redis40 => 40,
        }
    }

    fn name(self) -> &'static str {
        match self {
            RedisVersion::Redis32 => "REDIS_3_2",
            RedisVersion::Redis40 => "REDIS_4_0",
        }
    }
}

wire_enum_serde!(RedisVersion);
