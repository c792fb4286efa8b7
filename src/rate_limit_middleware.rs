// rate_limit_middleware.rs
//! Per-IP throttling for the public tracking endpoints

use crate::common::AppState;
use crate::services::rate_limit::RateLimitResult;
use axum::{
    extract::{ConnectInfo, Extension, Request},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RateLimitErrorResponse {
    error: String,
    code: String,
    retry_after: u32,
}

/// Client IP. Proxy headers are only consulted when `trust_proxy` is set;
/// otherwise the socket address is used.
pub(crate) fn extract_ip_address(
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
    trust_proxy: bool,
) -> Option<String> {
    if !trust_proxy {
        return connect_info.map(|info| info.0.ip().to_string());
    }

    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            // First hop is the original client
            if let Some(first_ip) = forwarded_str.split(',').next() {
                let first_ip = first_ip.trim();
                if !first_ip.is_empty() {
                    return Some(first_ip.to_string());
                }
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return Some(ip_str.trim().to_string());
        }
    }

    connect_info.map(|info| info.0.ip().to_string())
}

fn limited_response(retry_after: u32) -> Response {
    let body = RateLimitErrorResponse {
        error: "Rate limit exceeded. Please try again later.".to_string(),
        code: "RATE_LIMIT_EXCEEDED".to_string(),
        retry_after,
    };

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    if let Ok(retry_header) = HeaderValue::from_str(&retry_after.to_string()) {
        response.headers_mut().insert("retry-after", retry_header);
    }
    response
}

pub async fn rate_limit_middleware(
    Extension(state): Extension<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let ip_address = extract_ip_address(
        request.headers(),
        connect_info.as_ref(),
        state.config.trust_proxy_headers,
    );
    let key = format!("ip:{}", ip_address.as_deref().unwrap_or("unknown"));
    let path = request.uri().path().to_string();

    match state.rate_limit_service.check(&key).await {
        RateLimitResult::Allowed => {
            debug!(key = %key, path = %path, "Request allowed by rate limiter");
            next.run(request).await
        }
        RateLimitResult::Limited { retry_after } => {
            warn!(key = %key, path = %path, retry_after = retry_after, "Request blocked by rate limiter");
            state.rate_limit_service.log_violation(&key, &path).await;
            limited_response(retry_after)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_extract_ip_from_x_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            "203.0.113.1, 198.51.100.1".parse().unwrap(),
        );

        let ip = extract_ip_address(&headers, None, true);
        assert_eq!(ip, Some("203.0.113.1".to_string()));
    }

    #[test]
    fn test_extract_ip_from_x_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "203.0.113.1".parse().unwrap());

        let ip = extract_ip_address(&headers, None, true);
        assert_eq!(ip, Some("203.0.113.1".to_string()));
    }

    #[test]
    fn test_extract_ip_falls_back_to_socket() {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)), 4000);
        let ip = extract_ip_address(&HeaderMap::new(), Some(&ConnectInfo(addr)), true);
        assert_eq!(ip, Some("10.0.0.7".to_string()));
    }

    #[test]
    fn test_forwarded_headers_ignored_without_trusted_proxy() {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)), 4000);
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "198.51.100.23".parse().unwrap());
        headers.insert("x-real-ip", "198.51.100.24".parse().unwrap());

        let ip = extract_ip_address(&headers, Some(&ConnectInfo(addr)), false);
        assert_eq!(ip, Some("10.0.0.7".to_string()));
        assert_eq!(extract_ip_address(&headers, None, false), None);
    }

    #[test]
    fn test_limited_response_sets_retry_after() {
        let response = limited_response(42);
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get("retry-after").unwrap(), "42");
    }
}
