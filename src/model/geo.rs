use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::NetError;

/// Location record derived from an IP address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoLocation {
    /// IANA timezone identifier, "UTC" when unresolved
    pub timezone: String,
    pub country: String,
    pub city: String,
    pub lat: f64,
    pub lon: f64,
}

impl GeoLocation {
    /// Record returned for private/loopback addresses
    pub fn local() -> Self {
        Self::placeholder("Local")
    }

    /// Record returned when the lookup failed
    pub fn unknown() -> Self {
        Self::placeholder("Unknown")
    }

    fn placeholder(label: &str) -> Self {
        Self {
            timezone: "UTC".to_string(),
            country: label.to_string(),
            city: label.to_string(),
            lat: 0.0,
            lon: 0.0,
        }
    }
}

/// Why a lookup fell back to a placeholder record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DegradedReason {
    Timeout,
    Transport,
    BadStatus,
    ParseError,
}

impl From<&NetError> for DegradedReason {
    fn from(err: &NetError) -> Self {
        match err {
            NetError::Timeout => DegradedReason::Timeout,
            NetError::Transport(_) => DegradedReason::Transport,
            NetError::Status(_) | NetError::Rejected(_) => DegradedReason::BadStatus,
            NetError::Parse(_) => DegradedReason::ParseError,
        }
    }
}

/// Outcome of resolving an IP to a location.
///
/// Every variant carries a usable [`GeoLocation`]; the variant tells callers
/// whether the timezone really came from the geolocation service.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(GeoLocation),
    Local(GeoLocation),
    Degraded {
        fallback: GeoLocation,
        reason: DegradedReason,
    },
}

impl Resolution {
    pub fn location(&self) -> &GeoLocation {
        match self {
            Resolution::Resolved(loc) | Resolution::Local(loc) => loc,
            Resolution::Degraded { fallback, .. } => fallback,
        }
    }

    pub fn into_location(self) -> GeoLocation {
        match self {
            Resolution::Resolved(loc) | Resolution::Local(loc) => loc,
            Resolution::Degraded { fallback, .. } => fallback,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Resolution::Degraded { .. })
    }

    pub fn status(&self) -> LookupStatus {
        match self {
            Resolution::Resolved(_) => LookupStatus::Resolved,
            Resolution::Local(_) => LookupStatus::Local,
            Resolution::Degraded { reason, .. } => LookupStatus::Degraded { reason: *reason },
        }
    }
}

/// Serializable form of a [`Resolution`]'s variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LookupStatus {
    Resolved,
    Local,
    Degraded { reason: DegradedReason },
}
