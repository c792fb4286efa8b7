// Error tracking with Sentry
use std::env;
use tracing::info;

use crate::common::AppConfig;

/// Start the Sentry client when a DSN is configured.
/// The returned guard must live until shutdown so queued events are flushed.
pub fn init_error_tracking(config: &AppConfig) -> Option<sentry::ClientInitGuard> {
    let Some(dsn) = config.sentry_dsn.as_deref().filter(|d| !d.is_empty()) else {
        info!("Sentry DSN not configured, error tracking disabled");
        return None;
    };

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some(
                env::var("ENVIRONMENT")
                    .unwrap_or_else(|_| "development".to_string())
                    .into(),
            ),
            traces_sample_rate: 0.0,
            ..Default::default()
        },
    ));

    if guard.is_enabled() {
        info!("Sentry initialized successfully");
        Some(guard)
    } else {
        info!("Sentry DSN rejected, error tracking disabled");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_dsn_means_no_client() {
        let config = AppConfig::for_tests();
        assert!(init_error_tracking(&config).is_none());
    }

    #[test]
    fn test_blank_dsn_is_ignored() {
        let mut config = AppConfig::for_tests();
        config.sentry_dsn = Some(String::new());
        assert!(init_error_tracking(&config).is_none());
    }
}
