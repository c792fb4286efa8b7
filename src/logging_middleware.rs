// src/logging_middleware.rs
//! Request ids, access logging, and body logging in debug mode

use axum::body::{to_bytes, HttpBody};
use axum::{
    body::Body,
    extract::Request,
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{debug, info, Level};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Bodies larger than this are not buffered for logging
const MAX_LOGGED_BODY: usize = 64 * 1024;

/// Paths whose bodies never reach the logs (signed identity payloads)
const REDACTED_PREFIXES: [&str; 1] = ["/api/webhooks/"];

fn body_for_log(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    let text = std::str::from_utf8(bytes).ok()?;
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(json) => Some(serde_json::to_string_pretty(&json).unwrap_or_else(|_| text.to_string())),
        Err(_) => Some(text.to_string()),
    }
}

/// Only bodies with a known size under the cap are buffered; streams pass through untouched
fn fits_log_limit(body: &Body) -> bool {
    body.size_hint()
        .upper()
        .is_some_and(|len| len <= MAX_LOGGED_BODY as u64)
}

/// Reuse the caller's request id or mint one
pub(crate) fn request_id(request: &Request) -> String {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= 128)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    let started = Instant::now();
    let request_id = request_id(&request);
    let method = request.method().clone();
    let uri = request.uri().clone();

    let log_bodies = tracing::enabled!(Level::DEBUG)
        && !REDACTED_PREFIXES.iter().any(|p| uri.path().starts_with(p));

    let request = if log_bodies && fits_log_limit(request.body()) {
        let (parts, body) = request.into_parts();
        let bytes = to_bytes(body, MAX_LOGGED_BODY)
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?;
        if let Some(body) = body_for_log(&bytes) {
            debug!(request_id = %request_id, method = %method, uri = %uri, request_body = %body, "📥 Request");
        }
        Request::from_parts(parts, Body::from(bytes))
    } else {
        request
    };

    let response = next.run(request).await;
    let (mut parts, body) = response.into_parts();

    let body = if log_bodies && fits_log_limit(&body) {
        let bytes = to_bytes(body, MAX_LOGGED_BODY)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        if let Some(logged) = body_for_log(&bytes) {
            debug!(request_id = %request_id, status = %parts.status, response_body = %logged, "📤 Response");
        }
        Body::from(bytes)
    } else {
        body
    };

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        parts.headers.insert(REQUEST_ID_HEADER, value);
    }

    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = parts.status.as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "Request completed"
    );

    Ok(Response::from_parts(parts, body))
}
