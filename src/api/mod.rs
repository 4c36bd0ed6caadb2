//! HTTP API for VPN detection
//!
//! Exposes the detection pipeline, a health check and the OpenAPI document
//! under `/api`.

mod handlers;
pub mod models;
mod routes;

use actix_web::web;

/// Initialize API routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(routes::json_config())
            .app_data(routes::query_config())
            .configure(routes::config_detect_routes)
            .configure(routes::config_meta_routes),
    );
}

/// Re-export ApiDoc for OpenAPI documentation
pub use routes::ApiDoc;
