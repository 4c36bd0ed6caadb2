//! UTC offset lookup for IANA timezone identifiers
//!
//! Offsets depend on the instant they are computed for, since daylight-saving
//! rules shift them during the year. Callers that need deterministic results
//! pass the instant explicitly via [`utc_offset_hours_at`].

use chrono::{DateTime, Offset, Utc};
use chrono_tz::Tz;
use tracing::debug;

/// Current UTC offset of `timezone` in hours, `0.0` if the identifier is unknown
pub fn utc_offset_hours(timezone: &str) -> f64 {
    utc_offset_hours_at(timezone, Utc::now())
}

/// UTC offset of `timezone` in hours at the instant `at`
pub fn utc_offset_hours_at(timezone: &str, at: DateTime<Utc>) -> f64 {
    match timezone.parse::<Tz>() {
        Ok(tz) => {
            let seconds = at.with_timezone(&tz).offset().fix().local_minus_utc();
            f64::from(seconds) / 3600.0
        }
        Err(_) => {
            debug!("Unknown timezone {:?}, treating as UTC", timezone);
            0.0
        }
    }
}
