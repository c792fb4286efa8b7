use sqlx::{Sqlite, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::aggregation;
use super::models::*;
use crate::cars::models::Car;
use crate::common::{
    authorize_owned, generate_analytics_id, generate_event_id, now_millis, ApiError, DAY_MS,
};
use crate::mods::models::Mod;

pub(crate) async fn insert_analytics<'e, E>(
    executor: E,
    event: &AnalyticsEvent,
) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO analytics (id, user_id, metric, value, timestamp, car_id, mod_id)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&event.id)
    .bind(&event.user_id)
    .bind(&event.metric)
    .bind(event.value)
    .bind(event.timestamp)
    .bind(&event.car_id)
    .bind(&event.mod_id)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn insert_visit_event<'e, E>(
    executor: E,
    event: &VisitEvent,
) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO events (id, event_type, user_id, car_id, mod_id, referrer, user_agent, timestamp)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&event.id)
    .bind(&event.event_type)
    .bind(&event.user_id)
    .bind(&event.car_id)
    .bind(&event.mod_id)
    .bind(&event.referrer)
    .bind(&event.user_agent)
    .bind(event.timestamp)
    .execute(executor)
    .await?;
    Ok(())
}

/// Read-side aggregation over the caller's own events
pub struct AnalyticsService {
    db: SqlitePool,
}

impl AnalyticsService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    async fn sum_metric(
        &self,
        user_id: &str,
        metric: &str,
        start: i64,
        end: i64,
    ) -> Result<i64, ApiError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(value), 0) FROM analytics
            WHERE user_id = ? AND metric = ? AND timestamp >= ? AND timestamp < ?
            "#,
        )
        .bind(user_id)
        .bind(metric)
        .bind(start)
        .bind(end)
        .fetch_one(&self.db)
        .await?;
        Ok(total)
    }

    async fn metric_summary(
        &self,
        user_id: &str,
        metric: &str,
        previous_start: i64,
        current_start: i64,
        now: i64,
    ) -> Result<MetricSummary, ApiError> {
        let current = self.sum_metric(user_id, metric, current_start, now).await?;
        let previous = self
            .sum_metric(user_id, metric, previous_start, current_start)
            .await?;
        Ok(MetricSummary {
            current,
            previous,
            growth: aggregation::growth_percentage(current, previous),
        })
    }

    /// Daily sums of one metric; filters on cars/mods the caller does not own match nothing
    pub async fn time_series(
        &self,
        user_id: &str,
        query: &TimeSeriesQuery,
        now: i64,
    ) -> Result<Vec<TimeSeriesPoint>, ApiError> {
        let (start, end) = query.window().resolve(now);
        if start > end {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT timestamp, value FROM analytics
            WHERE user_id = ? AND metric = ?
              AND timestamp >= ? AND timestamp < ?
              AND (? IS NULL OR car_id = ?)
              AND (? IS NULL OR mod_id = ?)
            ORDER BY timestamp ASC
            "#,
        )
        .bind(user_id)
        .bind(&query.metric)
        .bind(start)
        .bind(end)
        .bind(&query.car_id)
        .bind(&query.car_id)
        .bind(&query.mod_id)
        .bind(&query.mod_id)
        .fetch_all(&self.db)
        .await?;

        debug!(user_id = %user_id, metric = %query.metric, events = rows.len(), "Time series loaded");
        Ok(aggregation::bucket_by_day(&rows, start, end))
    }

    pub async fn dashboard_summary(
        &self,
        user_id: &str,
        days: Option<i64>,
    ) -> Result<DashboardSummary, ApiError> {
        self.dashboard_summary_at(user_id, days, now_millis()).await
    }

    /// Current window `[now - days, now)` against the window right before it
    pub async fn dashboard_summary_at(
        &self,
        user_id: &str,
        days: Option<i64>,
        now: i64,
    ) -> Result<DashboardSummary, ApiError> {
        let days = days.unwrap_or(DEFAULT_DASHBOARD_DAYS);
        if !(1..=MAX_DASHBOARD_DAYS).contains(&days) {
            return Err(ApiError::ValidationError(format!(
                "days: must be between 1 and {}",
                MAX_DASHBOARD_DAYS
            )));
        }

        let span = days * DAY_MS;
        let current_start = now - span;
        let previous_start = current_start - span;

        let profile_views = self
            .metric_summary(user_id, metrics::PROFILE_VIEWS, previous_start, current_start, now)
            .await?;
        let car_views = self
            .metric_summary(user_id, metrics::CAR_VIEWS, previous_start, current_start, now)
            .await?;
        let mod_clicks = self
            .metric_summary(user_id, metrics::MOD_CLICKS, previous_start, current_start, now)
            .await?;

        let total_cars = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cars WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.db)
            .await?;
        let total_mods = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM mods WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.db)
            .await?;

        Ok(DashboardSummary {
            days,
            profile_views,
            car_views,
            mod_clicks,
            total_cars,
            total_mods,
        })
    }

    pub async fn car_breakdown(
        &self,
        user_id: &str,
        window: &WindowQuery,
        now: i64,
    ) -> Result<CarBreakdown, ApiError> {
        let (start, end) = window.resolve(now);

        let views_by_car = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT car_id, SUM(value) AS views FROM analytics
            WHERE user_id = ? AND metric = ? AND car_id IS NOT NULL
              AND timestamp >= ? AND timestamp < ?
            GROUP BY car_id
            "#,
        )
        .bind(user_id)
        .bind(metrics::CAR_VIEWS)
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        let titles: HashMap<String, String> =
            sqlx::query_as::<_, (String, String)>("SELECT id, title FROM cars WHERE user_id = ?")
                .bind(user_id)
                .fetch_all(&self.db)
                .await?
                .into_iter()
                .collect();

        let total_profile_views = self
            .sum_metric(user_id, metrics::PROFILE_VIEWS, start, end)
            .await?;
        let total_views = views_by_car
            .iter()
            .fold(0i64, |acc, (_, views)| acc.saturating_add(*views));

        Ok(CarBreakdown {
            total_views,
            total_profile_views,
            cars: aggregation::car_breakdown(&views_by_car, &titles, total_profile_views),
        })
    }

    /// Clicks per mod, limited to mods and cars the caller still owns
    pub async fn affiliate_links(
        &self,
        user_id: &str,
        window: &WindowQuery,
        now: i64,
    ) -> Result<Vec<AffiliateLinkStats>, ApiError> {
        let (start, end) = window.resolve(now);

        let rows = sqlx::query_as::<_, AffiliateClickRow>(
            r#"
            SELECT m.id AS mod_id, m.title, m.brand, m.category, m.price, m.affiliate_link,
                   c.id AS car_id, c.title AS car_title, SUM(a.value) AS clicks
            FROM analytics a
            JOIN mods m ON m.id = a.mod_id AND m.user_id = a.user_id
            JOIN cars c ON c.id = m.car_id AND c.user_id = a.user_id
            WHERE a.user_id = ? AND a.metric IN (?, ?)
              AND a.timestamp >= ? AND a.timestamp < ?
            GROUP BY m.id
            "#,
        )
        .bind(user_id)
        .bind(metrics::MOD_CLICKS)
        .bind(metrics::LINK_CLICKS)
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        Ok(aggregation::affiliate_breakdown(rows))
    }

    pub async fn traffic_sources(
        &self,
        user_id: &str,
        window: &WindowQuery,
        now: i64,
    ) -> Result<Vec<TrafficSource>, ApiError> {
        let (start, end) = window.resolve(now);
        debug!(user_id = %user_id, start = start, end = end, "Serving placeholder traffic sources");
        Ok(aggregation::placeholder_traffic_sources())
    }

    /// Append a custom metric event for the caller
    pub async fn record_event(
        &self,
        user_id: &str,
        request: &RecordEventRequest,
    ) -> Result<AnalyticsEvent, ApiError> {
        let metric = request.metric.trim();
        if metric.is_empty() || metric.len() > 50 {
            return Err(ApiError::ValidationError(
                "metric: must be between 1 and 50 characters".to_string(),
            ));
        }
        let value = request.value.unwrap_or(1);
        if !(1..=MAX_EVENT_VALUE).contains(&value) {
            return Err(ApiError::ValidationError(format!(
                "value: must be between 1 and {}",
                MAX_EVENT_VALUE
            )));
        }

        if let Some(car_id) = &request.car_id {
            authorize_owned::<Car>(&self.db, car_id, user_id).await?;
        }
        if let Some(mod_id) = &request.mod_id {
            authorize_owned::<Mod>(&self.db, mod_id, user_id).await?;
        }

        let event = AnalyticsEvent {
            id: generate_analytics_id(),
            user_id: user_id.to_string(),
            metric: metric.to_string(),
            value,
            timestamp: now_millis(),
            car_id: request.car_id.clone(),
            mod_id: request.mod_id.clone(),
        };
        insert_analytics(&self.db, &event).await?;

        info!(user_id = %user_id, metric = %event.metric, value = value, "Analytics event recorded");
        Ok(event)
    }
}

/// Public view/click counting. Counter, metric event and visit log commit together.
pub struct TrackingService {
    db: SqlitePool,
}

impl TrackingService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    fn visit(
        event_type: &str,
        owner_id: &str,
        car_id: Option<&str>,
        mod_id: Option<&str>,
        context: &VisitContext,
        now: i64,
    ) -> VisitEvent {
        VisitEvent {
            id: generate_event_id(),
            event_type: event_type.to_string(),
            user_id: owner_id.to_string(),
            car_id: car_id.map(str::to_string),
            mod_id: mod_id.map(str::to_string),
            referrer: context.referrer.clone(),
            user_agent: context.user_agent.clone(),
            timestamp: now,
        }
    }

    fn metric_event(
        metric: &str,
        owner_id: &str,
        car_id: Option<&str>,
        mod_id: Option<&str>,
        now: i64,
    ) -> AnalyticsEvent {
        AnalyticsEvent {
            id: generate_analytics_id(),
            user_id: owner_id.to_string(),
            metric: metric.to_string(),
            value: 1,
            timestamp: now,
            car_id: car_id.map(str::to_string),
            mod_id: mod_id.map(str::to_string),
        }
    }

    pub async fn track_profile_view(
        &self,
        user_id: &str,
        context: &VisitContext,
    ) -> Result<TrackResponse, ApiError> {
        let now = now_millis();
        let mut tx = self.db.begin().await?;

        let exists = sqlx::query_scalar::<_, String>("SELECT id FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            warn!(user_id = %user_id, "Profile view for unknown user");
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        let event = Self::metric_event(metrics::PROFILE_VIEWS, user_id, None, None, now);
        insert_analytics(&mut *tx, &event).await?;
        let visit = Self::visit(metrics::PROFILE_VIEWS, user_id, None, None, context, now);
        insert_visit_event(&mut *tx, &visit).await?;
        tx.commit().await?;

        debug!(user_id = %user_id, "Profile view tracked");
        Ok(TrackResponse {
            target_id: user_id.to_string(),
            metric: metrics::PROFILE_VIEWS.to_string(),
            count: None,
        })
    }

    pub async fn track_car_view(
        &self,
        car_id: &str,
        context: &VisitContext,
    ) -> Result<TrackResponse, ApiError> {
        let now = now_millis();
        let mut tx = self.db.begin().await?;

        let (owner_id, views) = sqlx::query_as::<_, (String, i64)>(
            "UPDATE cars SET views = views + 1 WHERE id = ? RETURNING user_id, views",
        )
        .bind(car_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::NotFound("Car not found".to_string()))?;

        let event = Self::metric_event(metrics::CAR_VIEWS, &owner_id, Some(car_id), None, now);
        insert_analytics(&mut *tx, &event).await?;
        let visit = Self::visit(metrics::CAR_VIEWS, &owner_id, Some(car_id), None, context, now);
        insert_visit_event(&mut *tx, &visit).await?;
        tx.commit().await?;

        debug!(car_id = %car_id, views = views, "Car view tracked");
        Ok(TrackResponse {
            target_id: car_id.to_string(),
            metric: metrics::CAR_VIEWS.to_string(),
            count: Some(views),
        })
    }

    /// The event carries the parent car id too, for per-car joins
    pub async fn track_mod_click(
        &self,
        mod_id: &str,
        context: &VisitContext,
    ) -> Result<TrackResponse, ApiError> {
        let now = now_millis();
        let mut tx = self.db.begin().await?;

        let (owner_id, car_id, clicks) = sqlx::query_as::<_, (String, String, i64)>(
            "UPDATE mods SET clicks = clicks + 1 WHERE id = ? RETURNING user_id, car_id, clicks",
        )
        .bind(mod_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::NotFound("Mod not found".to_string()))?;

        insert_analytics(
            &mut *tx,
            &Self::metric_event(metrics::MOD_CLICKS, &owner_id, Some(&car_id), Some(mod_id), now),
        )
        .await?;
        insert_visit_event(
            &mut *tx,
            &Self::visit(metrics::MOD_CLICKS, &owner_id, Some(&car_id), Some(mod_id), context, now),
        )
        .await?;
        tx.commit().await?;

        debug!(mod_id = %mod_id, clicks = clicks, "Mod click tracked");
        Ok(TrackResponse {
            target_id: mod_id.to_string(),
            metric: metrics::MOD_CLICKS.to_string(),
            count: Some(clicks),
        })
    }
}
