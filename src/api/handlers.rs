//! API request handlers
//!
//! This module contains the request handlers for all API endpoints.

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::{SecondsFormat, Utc};

use crate::api::models::*;
use crate::api::routes::{invalid_request, ApiDoc};
use crate::error::DetectError;
use crate::model::DetectReport;
use crate::service::{detect, resolve_client_ip, GeoService};

/// Detect a VPN for the calling client
#[utoipa::path(
    get,
    path = "/api/detect",
    params(DetectQuery),
    responses(
        (status = 200, description = "Detection result", body = DetectReport),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse)
    ),
    tag = "Detection"
)]
pub async fn detect_get(
    req: HttpRequest,
    geo: web::Data<GeoService>,
    query: web::Query<DetectQuery>,
) -> impl Responder {
    let query = query.into_inner();
    let client_ip = resolve_client_ip(req.headers(), req.peer_addr());
    respond(detect(&geo, Some(&client_ip), query.timezone.as_deref(), query.threshold).await)
}

/// Detect a VPN for the calling client, parameters in the body
#[utoipa::path(
    post,
    path = "/api/detect",
    request_body = DetectRequest,
    responses(
        (status = 200, description = "Detection result", body = DetectReport),
        (status = 400, description = "Invalid request body", body = ErrorResponse)
    ),
    tag = "Detection"
)]
pub async fn detect_post(
    req: HttpRequest,
    geo: web::Data<GeoService>,
    body: web::Json<DetectRequest>,
) -> impl Responder {
    let body = body.into_inner();
    let client_ip = resolve_client_ip(req.headers(), req.peer_addr());
    respond(detect(&geo, Some(&client_ip), body.timezone.as_deref(), body.threshold).await)
}

/// Detect a VPN for an explicitly supplied IP
#[utoipa::path(
    post,
    path = "/api/detect/ip",
    request_body = ExplicitDetectRequest,
    responses(
        (status = 200, description = "Detection result", body = DetectReport),
        (status = 400, description = "IP missing or invalid body", body = ErrorResponse)
    ),
    tag = "Detection"
)]
pub async fn detect_ip(geo: web::Data<GeoService>, body: web::Bytes) -> impl Responder {
    // An absent body is the same as one without an `ip` field
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        ExplicitDetectRequest::default()
    } else {
        match serde_json::from_slice::<ExplicitDetectRequest>(&body) {
            Ok(body) => body,
            Err(e) => return invalid_request(format!("Json deserialize error: {}", e)),
        }
    };
    respond(
        detect(
            &geo,
            body.ip.as_deref(),
            body.timezone.as_deref(),
            body.threshold,
        )
        .await,
    )
}

/// Service health check
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
    })
}

/// OpenAPI document
pub async fn openapi_json() -> impl Responder {
    use utoipa::OpenApi;
    HttpResponse::Ok().json(ApiDoc::openapi())
}

fn respond(result: Result<DetectReport, DetectError>) -> HttpResponse {
    match result {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => HttpResponse::BadRequest().json(ErrorResponse {
            error: e.to_string(),
            code: None,
        }),
    }
}
