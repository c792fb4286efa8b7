// src/analytics/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::common::DAY_MS;

/// Metric names written by the tracking endpoints
pub mod metrics {
    pub const PROFILE_VIEWS: &str = "profile_views";
    pub const CAR_VIEWS: &str = "car_views";
    pub const MOD_CLICKS: &str = "mod_clicks";
    pub const LINK_CLICKS: &str = "link_clicks";
}

/// Window used when a query omits its dates
pub const DEFAULT_WINDOW_DAYS: i64 = 30;
pub const DEFAULT_DASHBOARD_DAYS: i64 = 7;
pub const MAX_DASHBOARD_DAYS: i64 = 365;
/// Upper bound for a single recorded event value
pub const MAX_EVENT_VALUE: i64 = 1000;

// ============================================================================
// Stored rows
// ============================================================================

/// Append-only metric event, counted towards `user_id`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub id: String,
    pub user_id: String,
    pub metric: String,
    pub value: i64,
    pub timestamp: i64,
    pub car_id: Option<String>,
    pub mod_id: Option<String>,
}

/// Raw visit log entry kept for referrer analysis
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VisitEvent {
    pub id: String,
    pub event_type: String,
    pub user_id: String,
    pub car_id: Option<String>,
    pub mod_id: Option<String>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub timestamp: i64,
}

// ============================================================================
// Query parameters
// ============================================================================

/// `[startDate, endDate)` in epoch milliseconds
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowQuery {
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
}

impl WindowQuery {
    #[cfg(test)]
    pub fn new(start: i64, end: i64) -> Self {
        Self {
            start_date: Some(start),
            end_date: Some(end),
        }
    }

    /// Fill in missing bounds: the window ends now and spans 30 days
    pub fn resolve(&self, now: i64) -> (i64, i64) {
        let end = self.end_date.unwrap_or(now);
        let start = self
            .start_date
            .unwrap_or_else(|| end.saturating_sub(DEFAULT_WINDOW_DAYS * DAY_MS));
        (start, end)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesQuery {
    pub metric: String,
    pub car_id: Option<String>,
    pub mod_id: Option<String>,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
}

impl TimeSeriesQuery {
    pub fn window(&self) -> WindowQuery {
        WindowQuery {
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordEventRequest {
    pub metric: String,
    /// Defaults to 1
    pub value: Option<i64>,
    pub car_id: Option<String>,
    pub mod_id: Option<String>,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSeriesPoint {
    /// UTC day, `YYYY-MM-DD`
    pub date: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSummary {
    pub current: i64,
    pub previous: i64,
    /// Percent change; 0 when the previous window is empty
    pub growth: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub days: i64,
    pub profile_views: MetricSummary,
    pub car_views: MetricSummary,
    pub mod_clicks: MetricSummary,
    pub total_cars: i64,
    pub total_mods: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarAnalytics {
    pub car_id: String,
    /// None once the car has been deleted
    pub title: Option<String>,
    pub views: i64,
    pub percentage_of_total: f64,
    /// Car views relative to profile views over the same window
    pub click_through_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarBreakdown {
    pub total_views: i64,
    pub total_profile_views: i64,
    pub cars: Vec<CarAnalytics>,
}

/// Click totals per mod joined with the mod and its car
#[derive(Debug, Clone, FromRow)]
pub struct AffiliateClickRow {
    pub mod_id: String,
    pub title: String,
    pub brand: Option<String>,
    pub category: String,
    pub price: Option<f64>,
    pub affiliate_link: Option<String>,
    pub car_id: String,
    pub car_title: String,
    pub clicks: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffiliateLinkStats {
    pub mod_id: String,
    pub title: String,
    pub brand: Option<String>,
    pub category: String,
    pub price: Option<f64>,
    pub affiliate_link: Option<String>,
    pub car_id: String,
    pub car_title: String,
    pub clicks: i64,
    pub potential_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrafficSource {
    pub source: String,
    pub count: i64,
}

// ============================================================================
// Tracking
// ============================================================================

/// Request metadata stored with each visit
#[derive(Debug, Clone, Default)]
pub struct VisitContext {
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackResponse {
    pub target_id: String,
    pub metric: String,
    /// Counter value after the increment (cars and mods only)
    pub count: Option<i64>,
}
