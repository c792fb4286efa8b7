// src/common/dev_mode.rs
//! Development mode configuration and utilities
//! Allows bypassing authentication for local testing

use sqlx::SqlitePool;
use std::env;
use tracing::info;

use super::helpers::now_millis;
use crate::auth::models::User;

/// Fixed ID so every request in dev mode resolves to the same user row
pub const DEV_USER_ID: &str = "U_DEVUSR";
pub const DEV_USER_EXTERNAL_ID: &str = "dev|local";

#[derive(Debug, Clone)]
pub struct DevModeConfig {
    pub enabled: bool,
    pub user_email: String,
    pub user_name: String,
    pub username: String,
}

impl DevModeConfig {
    pub fn from_env() -> Self {
        let enabled = env::var("DEV_MODE")
            .unwrap_or_else(|_| "false".to_string())
            .to_lowercase()
            == "true";

        Self {
            enabled,
            user_email: env::var("DEV_USER_EMAIL").unwrap_or_else(|_| "dev@test.com".to_string()),
            user_name: env::var("DEV_USER_NAME").unwrap_or_else(|_| "Dev User".to_string()),
            username: env::var("DEV_USERNAME").unwrap_or_else(|_| "devgarage".to_string()),
        }
    }

    #[cfg(test)]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            user_email: "dev@test.com".to_string(),
            user_name: "Dev User".to_string(),
            username: "devgarage".to_string(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Insert the dev user if it is missing so ownership checks have a real row
    pub async fn ensure_dev_user(&self, pool: &SqlitePool) -> Result<User, sqlx::Error> {
        let now = now_millis();
        sqlx::query(
            r#"
            INSERT INTO users (id, external_id, email, name, username, plan, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 'free', ?, ?)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(DEV_USER_ID)
        .bind(DEV_USER_EXTERNAL_ID)
        .bind(&self.user_email)
        .bind(&self.user_name)
        .bind(&self.username)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(DEV_USER_ID)
            .fetch_one(pool)
            .await?;

        info!(user_id = %user.id, "Dev user ready");
        Ok(user)
    }
}

/// Print dev mode status on startup
pub fn print_dev_mode_status(config: &DevModeConfig) {
    if config.enabled {
        println!("⚠️  🔓 DEV MODE ENABLED 🔓 ⚠️");
        println!("   Authentication bypassed for testing");
        println!("   Dev User: {} ({})", config.user_name, config.user_email);
        println!("   ⚠️  DO NOT USE IN PRODUCTION ⚠️");
        println!();
    } else {
        println!("🔒 Production mode - Authentication required");
    }
}

/// CLI argument parsing for dev mode
pub fn parse_dev_mode_args() -> Option<bool> {
    for arg in env::args() {
        match arg.as_str() {
            "--dev" | "--dev-mode" => return Some(true),
            "--no-dev" | "--prod" | "--production" => return Some(false),
            _ => {}
        }
    }

    None
}

/// Override dev mode from CLI args
pub fn apply_cli_override(mut config: DevModeConfig) -> DevModeConfig {
    if let Some(cli_dev_mode) = parse_dev_mode_args() {
        println!("🔧 CLI override: DEV_MODE = {}", cli_dev_mode);
        config.enabled = cli_dev_mode;
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::test_pool;

    #[test]
    fn test_dev_mode_config_defaults() {
        let original_dev_mode = env::var("DEV_MODE").ok();
        env::remove_var("DEV_MODE");

        let config = DevModeConfig::from_env();
        assert!(!config.enabled, "Dev mode should be disabled by default");

        if let Some(val) = original_dev_mode {
            env::set_var("DEV_MODE", val);
        }
    }

    #[tokio::test]
    async fn test_ensure_dev_user_is_idempotent() {
        let pool = test_pool().await;
        let config = DevModeConfig::disabled();

        let first = config.ensure_dev_user(&pool).await.unwrap();
        let second = config.ensure_dev_user(&pool).await.unwrap();

        assert_eq!(first.id, DEV_USER_ID);
        assert_eq!(first.id, second.id);
        assert_eq!(second.username.as_deref(), Some("devgarage"));
    }
}
