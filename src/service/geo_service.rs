use crate::error::NetError;
use crate::model::{DegradedReason, GeoLocation, Resolution};
use crate::service::fetcher::JsonFetcher;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_PUBLIC_IP_URL: &str = "https://api.ipify.org?format=json";
pub const DEFAULT_GEO_API_URL: &str = "http://ip-api.com/json";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const GEO_FIELDS: &str = "status,country,city,timezone,lat,lon";

/// Settings for [`GeoService`]
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Endpoint answering `{"ip": "..."}` with the caller's public address
    pub public_ip_url: String,
    /// Base URL of the ip-api compatible geolocation service
    pub geo_api_url: String,
    /// Per-call timeout
    pub timeout: Duration,
    /// Look up our own public IP when the client address is local
    pub substitute_local_with_public: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            public_ip_url: DEFAULT_PUBLIC_IP_URL.to_string(),
            geo_api_url: DEFAULT_GEO_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            substitute_local_with_public: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PublicIpResponse {
    ip: String,
}

#[derive(Debug, Deserialize)]
struct GeoApiResponse {
    status: Option<String>,
    country: Option<String>,
    city: Option<String>,
    timezone: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl GeoApiResponse {
    fn into_location(self) -> GeoLocation {
        GeoLocation {
            timezone: self
                .timezone
                .filter(|tz| !tz.is_empty())
                .unwrap_or_else(|| "UTC".to_string()),
            country: self.country.unwrap_or_else(|| "Unknown".to_string()),
            city: self.city.unwrap_or_else(|| "Unknown".to_string()),
            lat: self.lat.unwrap_or(0.0),
            lon: self.lon.unwrap_or(0.0),
        }
    }
}

/// Prefix-only check for addresses that cannot be geolocated directly.
///
/// 172.16.0.0/12 and IPv6 private ranges are not treated as local.
pub fn is_local_ip(ip: &str) -> bool {
    ip == "unknown" || ip.starts_with("127.") || ip.starts_with("192.168.") || ip.starts_with("10.")
}

/// Resolves IP addresses to locations, never failing
#[derive(Clone)]
pub struct GeoService {
    config: ResolverConfig,
    fetcher: Arc<dyn JsonFetcher>,
}

impl GeoService {
    pub fn new(config: ResolverConfig, fetcher: Arc<dyn JsonFetcher>) -> Self {
        Self { config, fetcher }
    }

    /// Location for `ip`, with every failure folded into a placeholder record
    pub async fn resolve_geolocation(&self, ip: &str) -> GeoLocation {
        self.resolve(ip).await.into_location()
    }

    /// Location for `ip`, tagged with how it was obtained
    pub async fn resolve(&self, ip: &str) -> Resolution {
        let mut effective_ip = ip.to_string();

        if is_local_ip(ip) {
            if !self.config.substitute_local_with_public {
                debug!("Local address {}, skipping lookup", ip);
                return Resolution::Local(GeoLocation::local());
            }

            match self.fetch_public_ip().await {
                Ok(public_ip) => {
                    debug!("Substituting local address {} with public {}", ip, public_ip);
                    effective_ip = public_ip;
                }
                Err(e) => {
                    warn!("Failed to discover public IP for local address {}: {}", ip, e);
                    return Resolution::Degraded {
                        fallback: GeoLocation::local(),
                        reason: DegradedReason::from(&e),
                    };
                }
            }
        }

        match self.fetch_location(&effective_ip).await {
            Ok(location) => Resolution::Resolved(location),
            Err(e) => {
                warn!("Failed to get geolocation for IP {}: {}", effective_ip, e);
                Resolution::Degraded {
                    fallback: GeoLocation::unknown(),
                    reason: DegradedReason::from(&e),
                }
            }
        }
    }

    async fn fetch_public_ip(&self) -> Result<String, NetError> {
        let body = self
            .fetcher
            .fetch_json(&self.config.public_ip_url, self.config.timeout)
            .await?;
        let resp: PublicIpResponse = parse(body)?;
        if resp.ip.trim().is_empty() {
            return Err(NetError::Parse("empty ip field".to_string()));
        }
        Ok(resp.ip.trim().to_string())
    }

    /// `{geo_api_url}/{ip}?fields=...` with `ip` encoded as a single path segment
    fn location_url(&self, ip: &str) -> Result<Url, NetError> {
        let invalid = || {
            NetError::Transport(format!("invalid geolocation URL {}", self.config.geo_api_url))
        };
        let mut url = Url::parse(&self.config.geo_api_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push(ip);
        url.set_query(Some(&format!("fields={}", GEO_FIELDS)));
        Ok(url)
    }

    async fn fetch_location(&self, ip: &str) -> Result<GeoLocation, NetError> {
        let url = self.location_url(ip)?;
        let body = self.fetcher.fetch_json(url.as_str(), self.config.timeout).await?;
        let resp: GeoApiResponse = parse(body)?;

        // ip-api reports failures with HTTP 200 and status "fail"
        match resp.status.as_deref() {
            Some("success") => Ok(resp.into_location()),
            other => Err(NetError::Rejected(other.unwrap_or("missing").to_string())),
        }
    }
}

fn parse<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, NetError> {
    serde_json::from_value(body).map_err(|e| NetError::Parse(e.to_string()))
}
