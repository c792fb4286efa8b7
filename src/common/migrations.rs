// src/common/migrations.rs
//! Database schema management
//!
//! Six collections: users, cars, mods, media, analytics, events. Referential
//! integrity between them is checked by the services, not by the schema.

use sqlx::SqlitePool;
use std::env;
use tracing::{info, warn};

/// Run all database migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Only drop tables if RESET_DB is set, otherwise restarts keep data
    let should_reset_db = env::var("RESET_DB").unwrap_or_else(|_| "false".to_string()) == "true";

    if should_reset_db {
        warn!("⚠️  RESET_DB=true - Dropping all tables and recreating schema...");
        drop_all_tables(pool).await?;
    }

    create_tables(pool).await?;
    create_indexes(pool).await?;

    info!("✅ Database migration completed successfully!");
    Ok(())
}

async fn drop_all_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for table in ["events", "analytics", "media", "mods", "cars", "users"] {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await?;
    }
    info!("✅ Dropped old tables");
    Ok(())
}

async fn create_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            external_id TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL,
            name TEXT,
            username TEXT UNIQUE,
            bio TEXT,
            avatar_url TEXT,
            plan TEXT NOT NULL DEFAULT 'free',
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS cars (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            make TEXT NOT NULL,
            model TEXT NOT NULL,
            year INTEGER NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            main_image_url TEXT,
            is_public INTEGER NOT NULL DEFAULT 1,
            views INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS mods (
            id TEXT PRIMARY KEY,
            car_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            brand TEXT,
            category TEXT NOT NULL,
            description TEXT,
            affiliate_link TEXT,
            price REAL,
            clicks INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS media (
            id TEXT PRIMARY KEY,
            car_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            url TEXT NOT NULL,
            media_type TEXT NOT NULL CHECK (media_type IN ('image', 'video')),
            uploaded_at INTEGER NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS analytics (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            metric TEXT NOT NULL,
            value INTEGER NOT NULL,
            timestamp INTEGER NOT NULL,
            car_id TEXT,
            mod_id TEXT
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS events (
            id TEXT PRIMARY KEY,
            event_type TEXT NOT NULL,
            user_id TEXT NOT NULL,
            car_id TEXT,
            mod_id TEXT,
            referrer TEXT,
            user_agent TEXT,
            timestamp INTEGER NOT NULL
        )
        "#,
    ];

    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_cars_user ON cars(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_mods_car ON mods(car_id)",
        "CREATE INDEX IF NOT EXISTS idx_mods_user ON mods(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_media_car ON media(car_id)",
        "CREATE INDEX IF NOT EXISTS idx_analytics_user_metric_ts ON analytics(user_id, metric, timestamp)",
        "CREATE INDEX IF NOT EXISTS idx_analytics_car ON analytics(car_id)",
        "CREATE INDEX IF NOT EXISTS idx_analytics_mod ON analytics(mod_id)",
        "CREATE INDEX IF NOT EXISTS idx_events_user_ts ON events(user_id, timestamp)",
    ];

    for index in indexes {
        sqlx::query(index).execute(pool).await?;
    }

    info!("📊 Created collection indexes");
    Ok(())
}
