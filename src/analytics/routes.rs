// src/analytics/routes.rs

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use super::handlers;
use crate::rate_limit_middleware::rate_limit_middleware;

/// Owner-facing analytics queries
pub fn analytics_routes() -> Router {
    Router::new()
        .route("/api/analytics/timeseries", get(handlers::get_time_series))
        .route("/api/analytics/dashboard", get(handlers::get_dashboard))
        .route("/api/analytics/cars", get(handlers::get_car_breakdown))
        .route(
            "/api/analytics/affiliate-links",
            get(handlers::get_affiliate_links),
        )
        .route(
            "/api/analytics/traffic-sources",
            get(handlers::get_traffic_sources),
        )
        .route("/api/analytics/events", post(handlers::record_event))
}

/// Anonymous view/click tracking, throttled per client IP
pub fn tracking_routes() -> Router {
    Router::new()
        .route(
            "/api/track/profile/:user_id",
            post(handlers::track_profile_view),
        )
        .route("/api/track/car/:car_id", post(handlers::track_car_view))
        .route("/api/track/mod/:mod_id", post(handlers::track_mod_click))
        .route_layer(middleware::from_fn(rate_limit_middleware))
}
