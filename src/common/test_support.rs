// Shared fixtures for service tests

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use super::migrations::run_migrations;
use super::{generate_user_id, now_millis};
use crate::auth::AuthedUser;

/// In-memory database with the full schema applied.
/// A single connection keeps the in-memory database alive for the whole test.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    run_migrations(&pool).await.unwrap();
    pool
}

/// Insert a user row and return the matching authenticated caller
pub async fn create_test_user(pool: &SqlitePool, username: &str) -> AuthedUser {
    let id = generate_user_id();
    let external_id = format!("idp|{}", username);
    let email = format!("{}@example.com", username);
    let now = now_millis();

    sqlx::query(
        r#"
        INSERT INTO users (id, external_id, email, name, username, plan, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, 'free', ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&external_id)
    .bind(&email)
    .bind(username)
    .bind(username)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .unwrap();

    AuthedUser { id }
}
