//! VPN detection by timezone mismatch
//!
//! Compares the timezone of a client's IP geolocation with the timezone the
//! client reports and flags differences above a threshold.

pub mod api;
pub mod cli;
pub mod error;
pub mod model;
pub mod service;
