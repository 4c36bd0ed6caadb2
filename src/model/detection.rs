use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::geo::{GeoLocation, LookupStatus};

/// How strongly an offset mismatch points at a VPN
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Verdict of comparing the IP timezone with the client timezone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DetectionResult {
    pub is_vpn_detected: bool,
    pub ip_timezone: String,
    pub ip_utc_offset: f64,
    pub client_timezone: String,
    pub client_utc_offset: f64,
    /// Absolute offset difference in hours, rounded to 2 decimals
    pub difference_hours: f64,
    pub confidence: Confidence,
}

/// Full answer for one detection call
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DetectReport {
    /// IP the lookup was made for
    pub client_ip: String,

    pub ip_location: GeoLocation,

    /// Whether `ip_location` came from the geolocation service or a fallback
    #[schema(value_type = Object)]
    pub lookup: LookupStatus,

    #[serde(flatten)]
    pub analysis: DetectionResult,

    /// RFC 3339 UTC timestamp
    pub timestamp: String,
}
