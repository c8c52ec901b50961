use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use pushhub_api::ApiError;
use serde::Serialize;
use serde_json::json;

use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse<'a> {
    status: &'a str,
}

pub async fn root(State(state): State<AppState>) -> impl IntoResponse {
    let body = json!({
        "service": "pushhub",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "storage": state.registry.store().backend_name(),
        "delivery": state.dispatcher.delivery().name(),
    });
    (StatusCode::OK, Json(body))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

/// Ready once the subscription store answers.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    match state.registry.ping().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse { status: "ready" })),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable",
                }),
            )
        }
    }
}

pub async fn metrics() -> impl IntoResponse {
    match crate::metrics::render_metrics() {
        Some(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/plain")],
            "metrics recorder not installed".to_string(),
        ),
    }
}

/// Public VAPID key for `pushManager.subscribe({ applicationServerKey })`.
pub async fn vapid_public_key(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    match state.vapid_public_key.as_deref() {
        Some(key) => Ok((StatusCode::OK, Json(json!({ "publicKey": key })))),
        None => Err(ApiError::not_found("VAPID public key not configured")),
    }
}
