// src/main.rs
use axum::{extract::Extension, middleware, Router};
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::PathBuf;
use std::time::Duration;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod analytics;
mod auth;
mod cars;
mod common;
mod logging_middleware;
mod media;
mod mods;
mod profiles;
mod rate_limit_middleware;
mod services;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use common::dev_mode::{apply_cli_override, print_dev_mode_status};
use common::{AppConfig, AppState};
use logging_middleware::REQUEST_ID_HEADER;

/// How often stale rate-limit windows are dropped
const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let mut config = AppConfig::from_env();
    config.dev_mode = apply_cli_override(config.dev_mode);

    // Kept alive for the whole process so buffered events are flushed on exit
    let _sentry_guard = services::monitoring::init_error_tracking(&config);

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(sentry_tracing::layer())
        .init();

    print_dev_mode_status(&config.dev_mode);

    if !config.storage.is_configured() {
        warn!("STORAGE_BUCKET not set - upload URLs will be unavailable");
    }
    if config.webhook_secret.is_none() {
        warn!("AUTH_WEBHOOK_SECRET not set - identity webhooks will be rejected");
    }

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    if let Some(path_part) = config.database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options =
        SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    common::migrations::run_migrations(&pool).await?;

    if config.dev_mode.is_enabled() {
        let dev_user = config.dev_mode.ensure_dev_user(&pool).await?;
        info!(user_id = %dev_user.id, "Dev user ready");
    }

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let port = config.port;
    let cors_origins = config.cors_origins.clone();
    let shared = Arc::new(AppState::new(pool, config));

    let rate_limit_service = shared.rate_limit_service.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RATE_LIMIT_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            rate_limit_service.cleanup_expired().await;
        }
    });

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        // Users, identity sync and webhooks
        .merge(auth::auth_routes())
        // Garage: cars, mods, media
        .merge(cars::cars_routes())
        .merge(mods::mods_routes())
        .merge(media::media_routes())
        // Analytics queries and public tracking
        .merge(analytics::analytics_routes())
        .merge(analytics::tracking_routes())
        // Public profile pages
        .merge(profiles::profiles_routes())
        // ====================================================================
        // MIDDLEWARE AND LAYERS
        // ====================================================================
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(Extension(shared.clone()))
        .layer({
            let origins: Vec<axum::http::HeaderValue> = cors_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::DELETE,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                    axum::http::HeaderName::from_static(REQUEST_ID_HEADER),
                ])
                .expose_headers([axum::http::HeaderName::from_static(REQUEST_ID_HEADER)])
                .allow_credentials(true)
        })
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
