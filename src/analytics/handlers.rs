// src/analytics/handlers.rs

use axum::{
    extract::{Extension, Json, Path, Query},
    http::{
        header::{HeaderName, REFERER, USER_AGENT},
        HeaderMap, StatusCode,
    },
};
use std::sync::Arc;
use tracing::info;

use super::models::*;
use super::services::{AnalyticsService, TrackingService};
use crate::auth::AuthedUser;
use crate::common::{now_millis, ApiError, AppState};

// ============================================================================
// Aggregation (owner only)
// ============================================================================

/// GET /api/analytics/timeseries
pub async fn get_time_series(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Query(query): Query<TimeSeriesQuery>,
) -> Result<Json<Vec<TimeSeriesPoint>>, ApiError> {
    let points = AnalyticsService::new(state.db.clone())
        .time_series(&authed.id, &query, now_millis())
        .await?;
    Ok(Json(points))
}

/// GET /api/analytics/dashboard
pub async fn get_dashboard(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardSummary>, ApiError> {
    let summary = AnalyticsService::new(state.db.clone())
        .dashboard_summary(&authed.id, query.days)
        .await?;
    Ok(Json(summary))
}

/// GET /api/analytics/cars
pub async fn get_car_breakdown(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Query(window): Query<WindowQuery>,
) -> Result<Json<CarBreakdown>, ApiError> {
    let breakdown = AnalyticsService::new(state.db.clone())
        .car_breakdown(&authed.id, &window, now_millis())
        .await?;
    Ok(Json(breakdown))
}

/// GET /api/analytics/affiliate-links
pub async fn get_affiliate_links(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Query(window): Query<WindowQuery>,
) -> Result<Json<Vec<AffiliateLinkStats>>, ApiError> {
    let links = AnalyticsService::new(state.db.clone())
        .affiliate_links(&authed.id, &window, now_millis())
        .await?;
    Ok(Json(links))
}

/// GET /api/analytics/traffic-sources
pub async fn get_traffic_sources(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Query(window): Query<WindowQuery>,
) -> Result<Json<Vec<TrafficSource>>, ApiError> {
    let sources = AnalyticsService::new(state.db.clone())
        .traffic_sources(&authed.id, &window, now_millis())
        .await?;
    Ok(Json(sources))
}

/// POST /api/analytics/events
pub async fn record_event(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Json(request): Json<RecordEventRequest>,
) -> Result<(StatusCode, Json<AnalyticsEvent>), ApiError> {
    let event = AnalyticsService::new(state.db.clone())
        .record_event(&authed.id, &request)
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

// ============================================================================
// Public tracking
// ============================================================================

fn visit_context(headers: &HeaderMap) -> VisitContext {
    let header = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.chars().take(512).collect::<String>())
    };

    VisitContext {
        referrer: header(REFERER),
        user_agent: header(USER_AGENT),
    }
}

/// POST /api/track/profile/:user_id
pub async fn track_profile_view(
    Extension(state): Extension<Arc<AppState>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<TrackResponse>, ApiError> {
    let response = TrackingService::new(state.db.clone())
        .track_profile_view(&user_id, &visit_context(&headers))
        .await?;
    Ok(Json(response))
}

/// POST /api/track/car/:car_id
pub async fn track_car_view(
    Extension(state): Extension<Arc<AppState>>,
    Path(car_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<TrackResponse>, ApiError> {
    let response = TrackingService::new(state.db.clone())
        .track_car_view(&car_id, &visit_context(&headers))
        .await?;
    Ok(Json(response))
}

/// POST /api/track/mod/:mod_id
/// Called before the client follows the mod's affiliate link
pub async fn track_mod_click(
    Extension(state): Extension<Arc<AppState>>,
    Path(mod_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<TrackResponse>, ApiError> {
    let response = TrackingService::new(state.db.clone())
        .track_mod_click(&mod_id, &visit_context(&headers))
        .await?;

    info!(mod_id = %mod_id, "Affiliate click recorded");
    Ok(Json(response))
}
