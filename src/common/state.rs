// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use super::config::AppConfig;
use crate::services::{RateLimitService, StorageService};

/// Application state containing database pool, services, and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub storage_service: Arc<StorageService>,
    pub rate_limit_service: Arc<RateLimitService>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: AppConfig) -> Self {
        let storage_service = Arc::new(StorageService::new(config.storage.clone()));
        let rate_limit_service = Arc::new(RateLimitService::new(
            config.tracking_rate_limit,
            config.tracking_rate_window_secs,
        ));

        Self {
            db,
            config: Arc::new(config),
            storage_service,
            rate_limit_service,
        }
    }
}
