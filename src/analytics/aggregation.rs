// src/analytics/aggregation.rs
//! Pure data shaping over already-fetched rows. No database access here.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use super::models::{AffiliateClickRow, AffiliateLinkStats, CarAnalytics, TrafficSource, TimeSeriesPoint};
use crate::common::helpers::day_key;

/// Assumed affiliate commission on every clicked mod
pub const COMMISSION_RATE: f64 = 0.05;

/// Sum `(timestamp, value)` pairs per UTC day inside `[start, end)`.
/// Days without events are omitted.
pub fn bucket_by_day(events: &[(i64, i64)], start: i64, end: i64) -> Vec<TimeSeriesPoint> {
    if start > end {
        return Vec::new();
    }

    let mut buckets: BTreeMap<String, i64> = BTreeMap::new();
    for &(timestamp, value) in events {
        if timestamp < start || timestamp >= end {
            continue;
        }
        let total = buckets.entry(day_key(timestamp)).or_insert(0);
        *total = total.saturating_add(value);
    }

    buckets
        .into_iter()
        .map(|(date, value)| TimeSeriesPoint { date, value })
        .collect()
}

pub fn growth_percentage(current: i64, previous: i64) -> f64 {
    if previous == 0 {
        return 0.0;
    }
    (current - previous) as f64 / previous as f64 * 100.0
}

fn ratio_percent(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Per-car share of views, most viewed first
pub fn car_breakdown(
    views_by_car: &[(String, i64)],
    titles: &HashMap<String, String>,
    total_profile_views: i64,
) -> Vec<CarAnalytics> {
    let total_views = views_by_car
        .iter()
        .fold(0i64, |acc, (_, views)| acc.saturating_add(*views));

    let mut cars: Vec<CarAnalytics> = views_by_car
        .iter()
        .map(|(car_id, views)| CarAnalytics {
            car_id: car_id.clone(),
            title: titles.get(car_id).cloned(),
            views: *views,
            percentage_of_total: ratio_percent(*views, total_views),
            click_through_rate: ratio_percent(*views, total_profile_views),
        })
        .collect();

    cars.sort_by(|a, b| b.views.cmp(&a.views).then_with(|| a.car_id.cmp(&b.car_id)));
    cars
}

pub fn potential_revenue(price: Option<f64>, clicks: i64) -> f64 {
    price.unwrap_or(0.0) * COMMISSION_RATE * clicks as f64
}

/// Attach revenue estimates and order by clicks, then revenue
pub fn affiliate_breakdown(rows: Vec<AffiliateClickRow>) -> Vec<AffiliateLinkStats> {
    let mut stats: Vec<AffiliateLinkStats> = rows
        .into_iter()
        .map(|row| AffiliateLinkStats {
            potential_revenue: potential_revenue(row.price, row.clicks),
            mod_id: row.mod_id,
            title: row.title,
            brand: row.brand,
            category: row.category,
            price: row.price,
            affiliate_link: row.affiliate_link,
            car_id: row.car_id,
            car_title: row.car_title,
            clicks: row.clicks,
        })
        .collect();

    stats.sort_by(|a, b| {
        b.clicks.cmp(&a.clicks).then_with(|| {
            b.potential_revenue
                .partial_cmp(&a.potential_revenue)
                .unwrap_or(Ordering::Equal)
        })
    });
    stats
}

// TODO: group `events.referrer` by host over the window once referrers are normalized
pub fn placeholder_traffic_sources() -> Vec<TrafficSource> {
    [
        ("Direct", 45),
        ("Social Media", 30),
        ("Search", 15),
        ("Referral", 10),
    ]
    .into_iter()
    .map(|(source, count)| TrafficSource {
        source: source.to_string(),
        count,
    })
    .collect()
}
