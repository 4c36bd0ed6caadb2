//! API route definitions
//!
//! This module defines all API routes and their configurations.

use actix_web::{error, web, HttpRequest, HttpResponse};
use utoipa::OpenApi;

use crate::api::handlers;
use crate::api::models;
use crate::model;

/// Configure detection routes
pub fn config_detect_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/detect")
            .route("", web::get().to(handlers::detect_get))
            .route("", web::post().to(handlers::detect_post))
            .route("/ip", web::post().to(handlers::detect_ip)),
    );
}

/// Configure health and documentation routes
pub fn config_meta_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health))
        .route("/openapi.json", web::get().to(handlers::openapi_json));
}

/// Reject malformed JSON bodies with an [`models::ErrorResponse`]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        let resp = invalid_request(err.to_string());
        error::InternalError::from_response(err, resp).into()
    })
}

/// Reject malformed query strings with an [`models::ErrorResponse`]
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req: &HttpRequest| {
        let resp = invalid_request(err.to_string());
        error::InternalError::from_response(err, resp).into()
    })
}

pub(crate) fn invalid_request(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(models::ErrorResponse {
        error: message,
        code: Some("INVALID_REQUEST".to_string()),
    })
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::detect_get,
        handlers::detect_post,
        handlers::detect_ip,
        handlers::health,
    ),
    components(
        schemas(
            model::DetectReport,
            model::DetectionResult,
            model::GeoLocation,
            model::Confidence,
            model::DegradedReason,
            models::ErrorResponse,
            models::DetectQuery,
            models::DetectRequest,
            models::ExplicitDetectRequest,
            models::HealthResponse,
        )
    ),
    tags(
        (name = "Detection", description = "VPN detection endpoints"),
        (name = "Health", description = "Service health"),
    )
)]
pub struct ApiDoc;
