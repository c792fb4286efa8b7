//! Tests for analytics module
//!
//! These tests verify:
//! - Day bucketing, growth and breakdown math
//! - Tracking increments counters and logs events atomically
//! - Aggregation queries only see the caller's own events

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::cars::models::{Car, CreateCarRequest};
    use crate::cars::CarsService;
    use crate::common::test_support::{create_test_user, test_pool};
    use crate::common::{generate_analytics_id, now_millis, ApiError, DAY_MS};
    use crate::mods::models::{CreateModRequest, Mod, ModCategory};
    use crate::mods::services::ModsService;
    use aggregation::*;
    use models::*;
    use services::{insert_analytics, AnalyticsService, TrackingService};
    use sqlx::SqlitePool;
    use std::collections::HashMap;

    /// 2024-03-11T00:00:00Z
    const NOW: i64 = 1_710_115_200_000;

    async fn create_car(pool: &SqlitePool, user_id: &str, title: &str) -> Car {
        CarsService::new(pool.clone())
            .create_car(
                user_id,
                &CreateCarRequest {
                    make: "Toyota".to_string(),
                    model: "Supra".to_string(),
                    year: 1998,
                    title: title.to_string(),
                    description: None,
                    main_image_url: None,
                    is_public: true,
                },
            )
            .await
            .unwrap()
    }

    async fn create_mod(
        pool: &SqlitePool,
        user_id: &str,
        car_id: &str,
        title: &str,
        price: f64,
    ) -> Mod {
        ModsService::new(pool.clone())
            .create_mod(
                user_id,
                car_id,
                &CreateModRequest {
                    title: title.to_string(),
                    brand: Some("Garrett".to_string()),
                    category: ModCategory::Engine,
                    description: None,
                    affiliate_link: Some("https://shop.example.com/kit".to_string()),
                    price: Some(price),
                },
            )
            .await
            .unwrap()
    }

    async fn insert_event(
        pool: &SqlitePool,
        user_id: &str,
        metric: &str,
        value: i64,
        timestamp: i64,
        car_id: Option<&str>,
    ) {
        let event = AnalyticsEvent {
            id: generate_analytics_id(),
            user_id: user_id.to_string(),
            metric: metric.to_string(),
            value,
            timestamp,
            car_id: car_id.map(str::to_string),
            mod_id: None,
        };
        insert_analytics(pool, &event).await.unwrap();
    }

    async fn count(pool: &SqlitePool, sql: &str, bind: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(sql)
            .bind(bind)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    // ============================================================================
    // Aggregation math
    // ============================================================================

    #[test]
    fn test_bucket_by_day_groups_and_sorts() {
        let events = vec![
            (NOW + 5 * 3_600_000, 2),
            (NOW - 1, 1),
            (NOW + 1, 3),
            (NOW - DAY_MS - 1, 4),
        ];

        let points = bucket_by_day(&events, NOW - 2 * DAY_MS, NOW + DAY_MS);
        assert_eq!(
            points,
            vec![
                TimeSeriesPoint { date: "2024-03-09".to_string(), value: 4 },
                TimeSeriesPoint { date: "2024-03-10".to_string(), value: 1 },
                TimeSeriesPoint { date: "2024-03-11".to_string(), value: 5 },
            ]
        );
    }

    #[test]
    fn test_bucket_by_day_sum_matches_events_in_window() {
        let events: Vec<(i64, i64)> = (0..40)
            .map(|i| (NOW - i * 7_200_000, (i % 5) + 1))
            .collect();
        let (start, end) = (NOW - DAY_MS, NOW);

        let expected: i64 = events
            .iter()
            .filter(|(ts, _)| *ts >= start && *ts < end)
            .map(|(_, v)| v)
            .sum();
        let bucketed: i64 = bucket_by_day(&events, start, end).iter().map(|p| p.value).sum();

        assert_eq!(bucketed, expected);
    }

    #[test]
    fn test_bucket_by_day_empty_when_start_after_end() {
        let events = vec![(NOW, 1)];
        assert!(bucket_by_day(&events, NOW + 1, NOW).is_empty());
    }

    #[test]
    fn test_growth_is_zero_without_previous_period() {
        assert_eq!(growth_percentage(25, 0), 0.0);
        assert_eq!(growth_percentage(0, 0), 0.0);
        assert_eq!(growth_percentage(15, 10), 50.0);
        assert_eq!(growth_percentage(5, 10), -50.0);
    }

    #[test]
    fn test_car_breakdown_percentages_sum_to_hundred() {
        let views = vec![
            ("C_A".to_string(), 3),
            ("C_B".to_string(), 5),
            ("C_C".to_string(), 4),
        ];
        let titles: HashMap<String, String> =
            [("C_A".to_string(), "Supra".to_string())].into_iter().collect();

        let cars = car_breakdown(&views, &titles, 24);
        let total: f64 = cars.iter().map(|c| c.percentage_of_total).sum();
        assert!((total - 100.0).abs() < 1e-9);

        assert_eq!(cars[0].car_id, "C_B");
        assert_eq!(cars[2].car_id, "C_A");
        assert_eq!(cars[2].title.as_deref(), Some("Supra"));
        assert!(cars[1].title.is_none());
        assert!((cars[0].click_through_rate - 5.0 / 24.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_car_breakdown_zero_denominators() {
        let views = vec![("C_A".to_string(), 0), ("C_B".to_string(), 0)];
        let cars = car_breakdown(&views, &HashMap::new(), 0);
        assert!(cars.iter().all(|c| c.percentage_of_total == 0.0));
        assert!(cars.iter().all(|c| c.click_through_rate == 0.0));
    }

    #[test]
    fn test_potential_revenue_uses_commission() {
        assert_eq!(potential_revenue(Some(1000.0), 2), 100.0);
        assert_eq!(potential_revenue(None, 7), 0.0);
    }

    #[test]
    fn test_placeholder_traffic_sources() {
        let sources = placeholder_traffic_sources();
        assert!(!sources.is_empty());
        assert_eq!(sources[0].source, "Direct");
    }

    #[test]
    fn test_window_defaults_to_last_thirty_days() {
        let (start, end) = WindowQuery::default().resolve(NOW);
        assert_eq!(end, NOW);
        assert_eq!(start, NOW - 30 * DAY_MS);

        let (start, end) = WindowQuery::new(10, 20).resolve(NOW);
        assert_eq!((start, end), (10, 20));
    }

    #[test]
    fn test_window_resolve_saturates_at_extreme_end_date() {
        let window = WindowQuery {
            start_date: None,
            end_date: Some(i64::MIN),
        };
        assert_eq!(window.resolve(0), (i64::MIN, i64::MIN));
    }

    #[test]
    fn test_bucket_by_day_saturates_instead_of_overflowing() {
        let day = NOW - DAY_MS;
        let events = [(day, i64::MAX), (day + 1, i64::MAX)];

        let points = bucket_by_day(&events, NOW - 7 * DAY_MS, NOW);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value, i64::MAX);
    }

    // ============================================================================
    // Tracking
    // ============================================================================

    #[tokio::test]
    async fn test_three_car_views_on_supra() {
        let pool = test_pool().await;
        let owner = create_test_user(&pool, "alice").await;
        let car = create_car(&pool, &owner.id, "Toyota Supra").await;
        let tracking = TrackingService::new(pool.clone());

        let context = VisitContext {
            referrer: Some("https://instagram.com/".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
        };
        for expected in 1..=3 {
            let response = tracking.track_car_view(&car.id, &context).await.unwrap();
            assert_eq!(response.count, Some(expected));
        }

        let refreshed = CarsService::new(pool.clone())
            .get_car(&car.id, None)
            .await
            .unwrap();
        assert_eq!(refreshed.views, 3);

        let events = count(
            &pool,
            "SELECT COUNT(*) FROM analytics WHERE metric = 'car_views' AND car_id = ?",
            &car.id,
        )
        .await;
        assert_eq!(events, 3);

        let owner_events = count(
            &pool,
            "SELECT COUNT(*) FROM analytics WHERE metric = 'car_views' AND user_id = ?",
            &owner.id,
        )
        .await;
        assert_eq!(owner_events, 3);

        let visits = count(
            &pool,
            "SELECT COUNT(*) FROM events WHERE car_id = ? AND referrer = 'https://instagram.com/'",
            &car.id,
        )
        .await;
        assert_eq!(visits, 3);
    }

    #[tokio::test]
    async fn test_tracking_missing_targets() {
        let pool = test_pool().await;
        let tracking = TrackingService::new(pool.clone());
        let context = VisitContext::default();

        assert!(matches!(
            tracking.track_car_view("C_MISSING", &context).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            tracking.track_mod_click("M_MISSING", &context).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            tracking.track_profile_view("U_MISSING", &context).await,
            Err(ApiError::NotFound(_))
        ));

        let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM analytics")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn test_mod_click_tags_parent_car() {
        let pool = test_pool().await;
        let owner = create_test_user(&pool, "alice").await;
        let car = create_car(&pool, &owner.id, "Supra").await;
        let kit = create_mod(&pool, &owner.id, &car.id, "Turbo Kit", 1000.0).await;

        TrackingService::new(pool.clone())
            .track_mod_click(&kit.id, &VisitContext::default())
            .await
            .unwrap();

        let event = sqlx::query_as::<_, AnalyticsEvent>("SELECT * FROM analytics WHERE mod_id = ?")
            .bind(&kit.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(event.metric, metrics::MOD_CLICKS);
        assert_eq!(event.car_id.as_deref(), Some(car.id.as_str()));
        assert_eq!(event.user_id, owner.id);
        assert_eq!(event.value, 1);
    }

    #[tokio::test]
    async fn test_profile_view_counts_for_profile_owner() {
        let pool = test_pool().await;
        let owner = create_test_user(&pool, "alice").await;

        TrackingService::new(pool.clone())
            .track_profile_view(&owner.id, &VisitContext::default())
            .await
            .unwrap();

        let summary = AnalyticsService::new(pool.clone())
            .dashboard_summary_at(&owner.id, None, now_millis() + 1)
            .await
            .unwrap();
        assert_eq!(summary.profile_views.current, 1);
        assert_eq!(summary.profile_views.growth, 0.0);
    }

    // ============================================================================
    // Aggregation queries
    // ============================================================================

    #[tokio::test]
    async fn test_turbo_kit_affiliate_revenue() {
        let pool = test_pool().await;
        let owner = create_test_user(&pool, "alice").await;
        let car = create_car(&pool, &owner.id, "Supra").await;
        let kit = create_mod(&pool, &owner.id, &car.id, "Turbo Kit", 1000.0).await;
        let intake = create_mod(&pool, &owner.id, &car.id, "Intake", 300.0).await;

        let tracking = TrackingService::new(pool.clone());
        tracking.track_mod_click(&kit.id, &VisitContext::default()).await.unwrap();
        tracking.track_mod_click(&kit.id, &VisitContext::default()).await.unwrap();
        tracking.track_mod_click(&intake.id, &VisitContext::default()).await.unwrap();

        let links = AnalyticsService::new(pool.clone())
            .affiliate_links(&owner.id, &WindowQuery::default(), now_millis() + 1)
            .await
            .unwrap();

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].title, "Turbo Kit");
        assert_eq!(links[0].clicks, 2);
        assert!((links[0].potential_revenue - 100.0).abs() < 1e-9);
        assert_eq!(links[0].car_title, "Supra");
        assert_eq!(links[0].category, "Engine");
        assert_eq!(links[1].clicks, 1);
        assert!((links[1].potential_revenue - 15.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_affiliate_links_only_show_callers_mods() {
        let pool = test_pool().await;
        let alice = create_test_user(&pool, "alice").await;
        let bob = create_test_user(&pool, "bob").await;
        let car = create_car(&pool, &alice.id, "Supra").await;
        let kit = create_mod(&pool, &alice.id, &car.id, "Turbo Kit", 1000.0).await;

        TrackingService::new(pool.clone())
            .track_mod_click(&kit.id, &VisitContext::default())
            .await
            .unwrap();

        let links = AnalyticsService::new(pool.clone())
            .affiliate_links(&bob.id, &WindowQuery::default(), now_millis() + 1)
            .await
            .unwrap();
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn test_time_series_sums_match_raw_events() {
        let pool = test_pool().await;
        let owner = create_test_user(&pool, "alice").await;
        let car = create_car(&pool, &owner.id, "Supra").await;

        let samples = [
            (NOW - 3 * DAY_MS, 2),
            (NOW - 3 * DAY_MS + 60_000, 1),
            (NOW - DAY_MS, 5),
            (NOW - 1, 1),
            (NOW, 9),
            (NOW - 40 * DAY_MS, 7),
        ];
        for (timestamp, value) in samples {
            insert_event(&pool, &owner.id, metrics::CAR_VIEWS, value, timestamp, Some(&car.id)).await;
        }
        insert_event(&pool, &owner.id, metrics::PROFILE_VIEWS, 4, NOW - DAY_MS, None).await;

        let query = TimeSeriesQuery {
            metric: metrics::CAR_VIEWS.to_string(),
            car_id: None,
            mod_id: None,
            start_date: Some(NOW - 30 * DAY_MS),
            end_date: Some(NOW),
        };
        let points = AnalyticsService::new(pool.clone())
            .time_series(&owner.id, &query, NOW)
            .await
            .unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0], TimeSeriesPoint { date: "2024-03-08".to_string(), value: 3 });
        assert_eq!(points[1], TimeSeriesPoint { date: "2024-03-10".to_string(), value: 6 });
        assert_eq!(points.iter().map(|p| p.value).sum::<i64>(), 9);
    }

    #[tokio::test]
    async fn test_time_series_foreign_or_inverted_filters_are_empty() {
        let pool = test_pool().await;
        let alice = create_test_user(&pool, "alice").await;
        let bob = create_test_user(&pool, "bob").await;
        let car = create_car(&pool, &alice.id, "Supra").await;
        insert_event(&pool, &alice.id, metrics::CAR_VIEWS, 1, NOW - DAY_MS, Some(&car.id)).await;

        let service = AnalyticsService::new(pool.clone());
        let foreign = TimeSeriesQuery {
            metric: metrics::CAR_VIEWS.to_string(),
            car_id: Some(car.id.clone()),
            mod_id: None,
            start_date: Some(NOW - 7 * DAY_MS),
            end_date: Some(NOW),
        };
        assert!(service.time_series(&bob.id, &foreign, NOW).await.unwrap().is_empty());
        assert_eq!(service.time_series(&alice.id, &foreign, NOW).await.unwrap().len(), 1);

        let inverted = TimeSeriesQuery {
            start_date: Some(NOW),
            end_date: Some(NOW - DAY_MS),
            ..foreign
        };
        assert!(service.time_series(&alice.id, &inverted, NOW).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dashboard_growth() {
        let pool = test_pool().await;
        let owner = create_test_user(&pool, "alice").await;
        let car = create_car(&pool, &owner.id, "Supra").await;

        // Current 7-day window: 6 car views; previous: 4
        insert_event(&pool, &owner.id, metrics::CAR_VIEWS, 6, NOW - DAY_MS, Some(&car.id)).await;
        insert_event(&pool, &owner.id, metrics::CAR_VIEWS, 4, NOW - 10 * DAY_MS, Some(&car.id)).await;
        // Only current-window profile views
        insert_event(&pool, &owner.id, metrics::PROFILE_VIEWS, 12, NOW - 2 * DAY_MS, None).await;
        // Outside both windows
        insert_event(&pool, &owner.id, metrics::CAR_VIEWS, 100, NOW - 20 * DAY_MS, Some(&car.id)).await;

        let summary = AnalyticsService::new(pool.clone())
            .dashboard_summary_at(&owner.id, None, NOW)
            .await
            .unwrap();

        assert_eq!(summary.days, 7);
        assert_eq!(summary.car_views.current, 6);
        assert_eq!(summary.car_views.previous, 4);
        assert_eq!(summary.car_views.growth, 50.0);
        assert_eq!(summary.profile_views.current, 12);
        assert_eq!(summary.profile_views.growth, 0.0);
        assert_eq!(summary.mod_clicks.current, 0);
        assert_eq!(summary.total_cars, 1);
        assert_eq!(summary.total_mods, 0);
    }

    #[tokio::test]
    async fn test_dashboard_rejects_bad_day_count() {
        let pool = test_pool().await;
        let owner = create_test_user(&pool, "alice").await;

        let result = AnalyticsService::new(pool)
            .dashboard_summary_at(&owner.id, Some(0), NOW)
            .await;
        assert!(matches!(result, Err(ApiError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_car_breakdown_query() {
        let pool = test_pool().await;
        let owner = create_test_user(&pool, "alice").await;
        let supra = create_car(&pool, &owner.id, "Supra").await;
        let skyline = create_car(&pool, &owner.id, "Skyline").await;

        insert_event(&pool, &owner.id, metrics::CAR_VIEWS, 1, NOW - DAY_MS, Some(&supra.id)).await;
        insert_event(&pool, &owner.id, metrics::CAR_VIEWS, 3, NOW - DAY_MS, Some(&skyline.id)).await;
        insert_event(&pool, &owner.id, metrics::PROFILE_VIEWS, 8, NOW - DAY_MS, None).await;

        let breakdown = AnalyticsService::new(pool.clone())
            .car_breakdown(&owner.id, &WindowQuery::new(NOW - 7 * DAY_MS, NOW), NOW)
            .await
            .unwrap();

        assert_eq!(breakdown.total_views, 4);
        assert_eq!(breakdown.total_profile_views, 8);
        assert_eq!(breakdown.cars[0].title.as_deref(), Some("Skyline"));
        assert_eq!(breakdown.cars[0].percentage_of_total, 75.0);
        assert_eq!(breakdown.cars[0].click_through_rate, 37.5);
        assert_eq!(breakdown.cars[1].percentage_of_total, 25.0);
    }

    #[tokio::test]
    async fn test_record_event() {
        let pool = test_pool().await;
        let alice = create_test_user(&pool, "alice").await;
        let bob = create_test_user(&pool, "bob").await;
        let car = create_car(&pool, &alice.id, "Supra").await;
        let service = AnalyticsService::new(pool.clone());

        let event = service
            .record_event(
                &alice.id,
                &RecordEventRequest {
                    metric: "share_clicks".to_string(),
                    value: None,
                    car_id: Some(car.id.clone()),
                    mod_id: None,
                },
            )
            .await
            .unwrap();
        assert!(event.id.starts_with("A_"));
        assert_eq!(event.value, 1);

        let foreign = service
            .record_event(
                &bob.id,
                &RecordEventRequest {
                    metric: "share_clicks".to_string(),
                    value: Some(1),
                    car_id: Some(car.id.clone()),
                    mod_id: None,
                },
            )
            .await;
        assert!(matches!(foreign, Err(ApiError::NotAuthorized(_))));

        let blank = service
            .record_event(
                &alice.id,
                &RecordEventRequest {
                    metric: "  ".to_string(),
                    value: None,
                    car_id: None,
                    mod_id: None,
                },
            )
            .await;
        assert!(matches!(blank, Err(ApiError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_record_event_value_bounds() {
        let pool = test_pool().await;
        let alice = create_test_user(&pool, "alice").await;
        let service = AnalyticsService::new(pool.clone());

        for value in [0, -1, MAX_EVENT_VALUE + 1, i64::MAX] {
            let result = service
                .record_event(
                    &alice.id,
                    &RecordEventRequest {
                        metric: metrics::LINK_CLICKS.to_string(),
                        value: Some(value),
                        car_id: None,
                        mod_id: None,
                    },
                )
                .await;
            assert!(
                matches!(result, Err(ApiError::ValidationError(_))),
                "value {} should be rejected",
                value
            );
        }

        let event = service
            .record_event(
                &alice.id,
                &RecordEventRequest {
                    metric: metrics::LINK_CLICKS.to_string(),
                    value: Some(MAX_EVENT_VALUE),
                    car_id: None,
                    mod_id: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(event.value, MAX_EVENT_VALUE);

        let stored = count(&pool, "SELECT COUNT(*) FROM analytics WHERE user_id = ?", &alice.id).await;
        assert_eq!(stored, 1);
    }

    #[tokio::test]
    async fn test_time_series_survives_huge_stored_values() {
        let pool = test_pool().await;
        let owner = create_test_user(&pool, "alice").await;
        insert_event(&pool, &owner.id, metrics::LINK_CLICKS, i64::MAX, NOW - DAY_MS, None).await;
        insert_event(&pool, &owner.id, metrics::LINK_CLICKS, i64::MAX, NOW - DAY_MS + 1, None).await;

        let query = TimeSeriesQuery {
            metric: metrics::LINK_CLICKS.to_string(),
            car_id: None,
            mod_id: None,
            start_date: Some(NOW - 7 * DAY_MS),
            end_date: Some(NOW),
        };
        let points = AnalyticsService::new(pool.clone())
            .time_series(&owner.id, &query, NOW)
            .await
            .unwrap();

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value, i64::MAX);
    }
}
