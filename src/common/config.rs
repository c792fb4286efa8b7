// src/common/config.rs
//! Runtime configuration collected from environment variables

use std::env;

use super::dev_mode::DevModeConfig;

/// Object storage settings used for signed upload URLs
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub bucket: Option<String>,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// CDN domain used for public URLs instead of the bucket endpoint
    pub public_domain: Option<String>,
    pub upload_url_ttl_secs: u64,
}

impl StorageConfig {
    pub fn is_configured(&self) -> bool {
        self.bucket.as_deref().is_some_and(|b| !b.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub log_level: String,
    pub jwt_secret: String,
    pub jwt_issuer: Option<String>,
    pub webhook_secret: Option<String>,
    pub cors_origins: Vec<String>,
    pub sentry_dsn: Option<String>,
    pub tracking_rate_limit: u32,
    pub tracking_rate_window_secs: u64,
    /// Take the client IP from x-forwarded-for / x-real-ip (only behind a proxy that sets them)
    pub trust_proxy_headers: bool,
    pub storage: StorageConfig,
    pub dev_mode: DevModeConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://carfolio.db".to_string()),
            port: parse_var("PORT", 8080),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            jwt_secret: env::var("AUTH_JWT_SECRET")
                .unwrap_or_else(|_| "replace_with_strong_secret".to_string()),
            jwt_issuer: non_empty_var("AUTH_JWT_ISSUER"),
            webhook_secret: non_empty_var("AUTH_WEBHOOK_SECRET"),
            cors_origins,
            sentry_dsn: non_empty_var("SENTRY_DSN"),
            tracking_rate_limit: parse_var("TRACKING_RATE_LIMIT", 60),
            tracking_rate_window_secs: parse_var("TRACKING_RATE_WINDOW_SECONDS", 60),
            trust_proxy_headers: parse_var("TRUST_PROXY_HEADERS", false),
            storage: StorageConfig {
                bucket: non_empty_var("STORAGE_BUCKET"),
                region: env::var("STORAGE_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
                access_key_id: non_empty_var("STORAGE_ACCESS_KEY_ID"),
                secret_access_key: non_empty_var("STORAGE_SECRET_ACCESS_KEY"),
                public_domain: non_empty_var("STORAGE_PUBLIC_DOMAIN"),
                upload_url_ttl_secs: parse_var("STORAGE_UPLOAD_URL_TTL_SECONDS", 900),
            },
            dev_mode: DevModeConfig::from_env(),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
impl AppConfig {
    /// Configuration for tests: in-memory database, no external services
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            port: 0,
            log_level: "debug".to_string(),
            jwt_secret: "test_secret".to_string(),
            jwt_issuer: None,
            webhook_secret: Some("whsec_test".to_string()),
            cors_origins: Vec::new(),
            sentry_dsn: None,
            tracking_rate_limit: 60,
            tracking_rate_window_secs: 60,
            trust_proxy_headers: false,
            storage: StorageConfig {
                bucket: None,
                region: "us-east-1".to_string(),
                access_key_id: None,
                secret_access_key: None,
                public_domain: None,
                upload_url_ttl_secs: 900,
            },
            dev_mode: DevModeConfig::disabled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_not_configured_without_bucket() {
        let config = AppConfig::for_tests();
        assert!(!config.storage.is_configured());

        let mut storage = config.storage.clone();
        storage.bucket = Some("carfolio-media".to_string());
        assert!(storage.is_configured());
    }

    #[test]
    fn test_parse_var_falls_back_to_default() {
        env::set_var("CARFOLIO_TEST_PORT", "not-a-number");
        assert_eq!(parse_var::<u16>("CARFOLIO_TEST_PORT", 8080), 8080);
        env::set_var("CARFOLIO_TEST_PORT", "9001");
        assert_eq!(parse_var::<u16>("CARFOLIO_TEST_PORT", 8080), 9001);
        env::remove_var("CARFOLIO_TEST_PORT");
    }
}
