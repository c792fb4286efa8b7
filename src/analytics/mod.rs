// src/analytics/mod.rs
//! # Analytics Module
//!
//! Append-only metric events and the queries built on them:
//! - Public tracking of profile views, car views and mod clicks
//! - Daily time series, dashboard growth, per-car and affiliate breakdowns
//!
//! Aggregation math lives in `aggregation` and never touches the database.

pub mod aggregation;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

#[cfg(test)]
mod tests;

pub use routes::{analytics_routes, tracking_routes};
