//! API data models
//!
//! Request and response bodies for the detection endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Error code (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Query parameters for `GET /api/detect`
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DetectQuery {
    /// Client timezone, e.g. "Asia/Omsk" (default: UTC)
    #[serde(default)]
    pub timezone: Option<String>,

    /// Hour difference above which a VPN is reported (default: 1.0)
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// Body of `POST /api/detect`
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DetectRequest {
    /// Client timezone (default: UTC)
    #[serde(default)]
    pub timezone: Option<String>,

    /// Hour difference threshold (default: 1.0)
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// Body of `POST /api/detect/ip`
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ExplicitDetectRequest {
    /// IP address to check (required)
    #[serde(default)]
    pub ip: Option<String>,

    /// Client timezone (default: UTC)
    #[serde(default)]
    pub timezone: Option<String>,

    /// Hour difference threshold (default: 1.0)
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}
