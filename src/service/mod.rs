pub mod client_ip;
pub mod detector;
pub mod fetcher;
pub mod geo_service;
pub mod timezone;

pub use client_ip::resolve_client_ip;
pub use detector::{classify, classify_at, detect, DEFAULT_THRESHOLD};
pub use fetcher::{HttpFetcher, JsonFetcher};
pub use geo_service::{GeoService, ResolverConfig};
pub use timezone::{utc_offset_hours, utc_offset_hours_at};
