use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::metrics;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

// Middleware that ensures each request has an X-Request-Id and mirrors it on the response
pub async fn request_id(mut req: Request<Body>, next: Next) -> Response {
    let header_name = HeaderName::from_static(REQUEST_ID_HEADER);

    // Keep a caller-supplied id; otherwise generate one
    let req_id_value = match req.headers().get(&header_name) {
        Some(value) => value.clone(),
        None => generate_request_id(),
    };

    // Add to request extensions for downstream usage (e.g., logging)
    req.extensions_mut().insert(req_id_value.clone());

    let mut res = next.run(req).await;

    res.headers_mut().insert(header_name, req_id_value);

    res
}

fn generate_request_id() -> HeaderValue {
    HeaderValue::from_str(&Uuid::new_v4().to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
}

// Records request count and latency per matched route. Installed as a route
// layer so `MatchedPath` is populated.
pub async fn http_metrics(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let res = next.run(req).await;

    metrics::record_http_request(&method, &route, res.status().as_u16(), start.elapsed());
    res
}
