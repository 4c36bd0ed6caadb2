mod detection;
mod geo;

pub use detection::{Confidence, DetectReport, DetectionResult};
pub use geo::{DegradedReason, GeoLocation, LookupStatus, Resolution};
