//! VPN classification
//!
//! A client whose self-reported timezone sits too far from the timezone of
//! its IP geolocation is flagged as likely using a VPN.

use crate::error::DetectError;
use crate::model::{Confidence, DetectReport, DetectionResult};
use crate::service::geo_service::GeoService;
use crate::service::timezone::utc_offset_hours_at;
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, info, warn};

pub const DEFAULT_THRESHOLD: f64 = 1.0;
pub const DEFAULT_CLIENT_TIMEZONE: &str = "UTC";

/// Differences above this many hours are always high confidence
const HIGH_CONFIDENCE_HOURS: f64 = 3.0;

/// Compare two timezones at the current instant
pub fn classify(ip_timezone: &str, client_timezone: &str, threshold: f64) -> DetectionResult {
    classify_at(ip_timezone, client_timezone, threshold, Utc::now())
}

/// Compare two timezones at the instant `at`.
///
/// The threshold is compared against the difference rounded to 2 decimals.
pub fn classify_at(
    ip_timezone: &str,
    client_timezone: &str,
    threshold: f64,
    at: DateTime<Utc>,
) -> DetectionResult {
    let ip_offset = utc_offset_hours_at(ip_timezone, at);
    let client_offset = utc_offset_hours_at(client_timezone, at);
    let difference = round2((ip_offset - client_offset).abs());

    DetectionResult {
        is_vpn_detected: difference > threshold,
        ip_timezone: ip_timezone.to_string(),
        ip_utc_offset: ip_offset,
        client_timezone: client_timezone.to_string(),
        client_utc_offset: client_offset,
        difference_hours: difference,
        confidence: confidence(difference, threshold),
    }
}

fn confidence(difference: f64, threshold: f64) -> Confidence {
    if difference > HIGH_CONFIDENCE_HOURS {
        Confidence::High
    } else if difference > threshold {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Run the whole pipeline for one client.
///
/// `ip` must be present and non-empty; a missing timezone is treated as UTC
/// and a missing threshold as [`DEFAULT_THRESHOLD`].
pub async fn detect(
    geo: &GeoService,
    ip: Option<&str>,
    client_timezone: Option<&str>,
    threshold: Option<f64>,
) -> Result<DetectReport, DetectError> {
    let ip = ip
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .ok_or(DetectError::MissingIp)?;
    let client_timezone = client_timezone
        .filter(|tz| !tz.is_empty())
        .unwrap_or(DEFAULT_CLIENT_TIMEZONE);
    let threshold = threshold.unwrap_or(DEFAULT_THRESHOLD);
    if threshold <= 0.0 {
        // Accepted as-is: with a non-positive threshold nearly every client is flagged
        warn!("Non-positive VPN threshold {} for IP {}", threshold, ip);
    }

    let resolution = geo.resolve(ip).await;
    let now = Utc::now();
    let analysis = classify_at(
        &resolution.location().timezone,
        client_timezone,
        threshold,
        now,
    );

    if analysis.is_vpn_detected {
        info!(
            "VPN suspected for {}: {} vs {} ({}h, {:?})",
            ip,
            analysis.ip_timezone,
            analysis.client_timezone,
            analysis.difference_hours,
            analysis.confidence
        );
    } else {
        debug!(
            "No VPN for {}: {} vs {} ({}h)",
            ip, analysis.ip_timezone, analysis.client_timezone, analysis.difference_hours
        );
    }

    Ok(DetectReport {
        client_ip: ip.to_string(),
        lookup: resolution.status(),
        ip_location: resolution.into_location(),
        analysis,
        timestamp: now.to_rfc3339_opts(SecondsFormat::Micros, true),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetError;
    use crate::model::{DegradedReason, LookupStatus};
    use crate::service::fetcher::testing::ScriptedFetcher;
    use crate::service::geo_service::ResolverConfig;
    use chrono::TimeZone;
    use serde_json::json;
    use std::sync::Arc;

    fn winter() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    fn geo(fetcher: &Arc<ScriptedFetcher>) -> GeoService {
        GeoService::new(
            ResolverConfig {
                public_ip_url: "https://public.test/".to_string(),
                geo_api_url: "http://geo.test/json".to_string(),
                substitute_local_with_public: false,
                ..ResolverConfig::default()
            },
            fetcher.clone(),
        )
    }

    #[test]
    fn test_omsk_vs_utc_is_high() {
        let result = classify_at("Asia/Omsk", "UTC", 1.0, winter());
        assert_eq!(result.ip_utc_offset, 6.0);
        assert_eq!(result.client_utc_offset, 0.0);
        assert_eq!(result.difference_hours, 6.0);
        assert!(result.is_vpn_detected);
        assert_eq!(result.confidence, Confidence::High);
    }

    #[test]
    fn test_boundary_difference_not_flagged() {
        let result = classify_at("Europe/London", "Europe/Paris", 1.0, winter());
        assert_eq!(result.difference_hours, 1.0);
        assert!(!result.is_vpn_detected);
        assert_eq!(result.confidence, Confidence::Low);
    }

    #[test]
    fn test_medium_confidence_up_to_three_hours() {
        let result = classify_at("Europe/Moscow", "UTC", 1.0, winter());
        assert_eq!(result.difference_hours, 3.0);
        assert!(result.is_vpn_detected);
        assert_eq!(result.confidence, Confidence::Medium);

        let result = classify_at("Asia/Dubai", "Europe/Berlin", 1.0, winter());
        assert_eq!(result.difference_hours, 3.0);
        assert_eq!(result.confidence, Confidence::Medium);
    }

    #[test]
    fn test_high_regardless_of_threshold() {
        let result = classify_at("Asia/Tokyo", "UTC", 12.0, winter());
        assert_eq!(result.difference_hours, 9.0);
        assert!(!result.is_vpn_detected);
        assert_eq!(result.confidence, Confidence::High);
    }

    #[test]
    fn test_difference_is_symmetric_and_rounded() {
        let a = classify_at("Asia/Kolkata", "Asia/Kathmandu", 1.0, winter());
        let b = classify_at("Asia/Kathmandu", "Asia/Kolkata", 1.0, winter());
        assert_eq!(a.difference_hours, 0.25);
        assert_eq!(b.difference_hours, 0.25);

        let c = classify_at("America/St_Johns", "America/Halifax", 0.0, winter());
        assert_eq!(c.difference_hours, 0.5);
        assert!(c.is_vpn_detected);
        assert_eq!(c.confidence, Confidence::Medium);
    }

    #[test]
    fn test_unknown_timezone_counts_as_utc() {
        let result = classify_at("Nowhere/Special", "UTC", 1.0, winter());
        assert_eq!(result.ip_utc_offset, 0.0);
        assert_eq!(result.difference_hours, 0.0);
        assert_eq!(result.ip_timezone, "Nowhere/Special");
        assert_eq!(result.confidence, Confidence::Low);
    }

    #[test]
    fn test_negative_threshold_flags_identical_zones() {
        let result = classify_at("UTC", "UTC", -1.0, winter());
        assert_eq!(result.difference_hours, 0.0);
        assert!(result.is_vpn_detected);
        assert_eq!(result.confidence, Confidence::Medium);
    }

    #[test]
    fn test_classify_uses_current_time() {
        let result = classify("UTC", "Etc/GMT-2", DEFAULT_THRESHOLD);
        assert_eq!(result.difference_hours, 2.0);
        assert!(result.is_vpn_detected);
    }

    #[tokio::test]
    async fn test_detect_without_ip_makes_no_calls() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let svc = geo(&fetcher);

        assert_eq!(
            detect(&svc, None, Some("UTC"), None).await.unwrap_err(),
            DetectError::MissingIp
        );
        assert_eq!(
            detect(&svc, Some("  "), None, None).await.unwrap_err(),
            DetectError::MissingIp
        );
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_detect_flags_mismatch() {
        let fetcher = Arc::new(ScriptedFetcher::new().route(
            "http://geo.test/json",
            Ok(json!({
                "status": "success",
                "country": "Japan",
                "city": "Tokyo",
                "timezone": "Asia/Tokyo",
                "lat": 35.68,
                "lon": 139.69
            })),
        ));
        let report = detect(&geo(&fetcher), Some("1.1.1.1"), Some("Etc/GMT+3"), None)
            .await
            .unwrap();

        assert_eq!(report.client_ip, "1.1.1.1");
        assert_eq!(report.ip_location.city, "Tokyo");
        assert_eq!(report.lookup, LookupStatus::Resolved);
        assert_eq!(report.analysis.difference_hours, 12.0);
        assert!(report.analysis.is_vpn_detected);
        assert_eq!(report.analysis.confidence, Confidence::High);
        assert!(DateTime::parse_from_rfc3339(&report.timestamp).is_ok());
    }

    #[tokio::test]
    async fn test_detect_defaults_and_flattening() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let report = detect(&geo(&fetcher), Some("10.0.0.8"), Some(""), None)
            .await
            .unwrap();

        assert_eq!(report.analysis.client_timezone, "UTC");
        assert_eq!(report.lookup, LookupStatus::Local);
        assert!(!report.analysis.is_vpn_detected);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["client_ip"], "10.0.0.8");
        assert_eq!(json["ip_location"]["country"], "Local");
        assert_eq!(json["lookup"]["status"], "local");
        assert_eq!(json["is_vpn_detected"], false);
        assert_eq!(json["confidence"], "low");
        assert_eq!(json["difference_hours"], 0.0);
    }

    #[tokio::test]
    async fn test_detect_survives_lookup_timeout() {
        let fetcher =
            Arc::new(ScriptedFetcher::new().route("http://geo.test/json", Err(NetError::Timeout)));
        let report = detect(&geo(&fetcher), Some("8.8.4.4"), Some("Asia/Omsk"), Some(1.0))
            .await
            .unwrap();

        assert_eq!(report.ip_location.country, "Unknown");
        assert_eq!(report.ip_location.timezone, "UTC");
        assert_eq!(
            report.lookup,
            LookupStatus::Degraded {
                reason: DegradedReason::Timeout
            }
        );
        // fails open: compares the client zone against UTC
        assert_eq!(report.analysis.ip_utc_offset, 0.0);
    }
}
