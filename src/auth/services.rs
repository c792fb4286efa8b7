// src/auth/services.rs

use sqlx::SqlitePool;
use tracing::{info, warn};

use super::models::{IdentityUserData, IdentityWebhookEvent, UpdateProfileRequest, User};
use super::validators::ProfileValidator;
use crate::common::{generate_user_id, now_millis, safe_email_log, ApiError, Validator};

/// Outcome of applying a webhook event, reported back to the provider
#[derive(Debug, PartialEq, Eq)]
pub enum WebhookOutcome {
    Upserted(String),
    Deleted,
    Ignored,
}

pub struct UsersService {
    db: SqlitePool,
}

impl UsersService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn get_by_id(&self, user_id: &str) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    pub async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE external_id = ?")
            .bind(external_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    pub async fn get_by_username(&self, username: &str) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))
    }

    /// Create the user on first sign-in, or refresh email/name from the identity
    pub async fn upsert_from_identity(
        &self,
        external_id: &str,
        email: Option<&str>,
        name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<User, ApiError> {
        let now = now_millis();

        if let Some(existing) = self.find_by_external_id(external_id).await? {
            sqlx::query(
                r#"
                UPDATE users
                SET email = COALESCE(?, email),
                    name = COALESCE(?, name),
                    avatar_url = COALESCE(?, avatar_url),
                    updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(email)
            .bind(name)
            .bind(avatar_url)
            .bind(now)
            .bind(&existing.id)
            .execute(&self.db)
            .await?;

            info!(user_id = %existing.id, "User refreshed from identity");
            return self.get_by_id(&existing.id).await;
        }

        let email = email.ok_or_else(|| {
            ApiError::ValidationError("email: is required to create a user".to_string())
        })?;

        let user_id = generate_user_id();
        sqlx::query(
            r#"
            INSERT INTO users (id, external_id, email, name, avatar_url, plan, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 'free', ?, ?)
            "#,
        )
        .bind(&user_id)
        .bind(external_id)
        .bind(email)
        .bind(name)
        .bind(avatar_url)
        .bind(now)
        .bind(now)
        .execute(&self.db)
        .await?;

        info!(
            user_id = %user_id,
            email = %safe_email_log(email),
            "User created from identity"
        );
        self.get_by_id(&user_id).await
    }

    /// Partial update of the caller's own profile fields
    pub async fn update_profile(
        &self,
        user_id: &str,
        request: &UpdateProfileRequest,
    ) -> Result<User, ApiError> {
        let validation_result = ProfileValidator.validate(request);
        if !validation_result.is_valid {
            warn!(user_id = %user_id, errors = ?validation_result.errors, "Profile update validation failed");
            return Err(ApiError::from(validation_result));
        }

        if let Some(username) = &request.username {
            let taken: Option<(String,)> =
                sqlx::query_as("SELECT id FROM users WHERE username = ? AND id != ?")
                    .bind(username)
                    .bind(user_id)
                    .fetch_optional(&self.db)
                    .await?;
            if taken.is_some() {
                return Err(ApiError::ValidationError(
                    "username: is already taken".to_string(),
                ));
            }
        }

        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE(?, name),
                username = COALESCE(?, username),
                bio = COALESCE(?, bio),
                avatar_url = COALESCE(?, avatar_url),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(request.name.as_deref())
        .bind(request.username.as_deref())
        .bind(request.bio.as_deref())
        .bind(request.avatar_url.as_deref())
        .bind(now_millis())
        .bind(user_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        info!(user_id = %user_id, "Profile updated");
        self.get_by_id(user_id).await
    }

    /// Mirror an identity-provider lifecycle event into the users table
    pub async fn apply_webhook(&self, event: IdentityWebhookEvent) -> Result<WebhookOutcome, ApiError> {
        match event {
            IdentityWebhookEvent::UserCreated(data) | IdentityWebhookEvent::UserUpdated(data) => {
                let user = self.upsert_from_webhook(&data).await?;
                Ok(WebhookOutcome::Upserted(user.id))
            }
            IdentityWebhookEvent::UserDeleted(data) => {
                // Cars, mods and media of the user are left in place
                let result = sqlx::query("DELETE FROM users WHERE external_id = ?")
                    .bind(&data.id)
                    .execute(&self.db)
                    .await?;

                if result.rows_affected() == 0 {
                    warn!(external_id = %data.id, "Webhook deletion for unknown user");
                    Ok(WebhookOutcome::Ignored)
                } else {
                    info!(external_id = %data.id, "User deleted via identity webhook");
                    Ok(WebhookOutcome::Deleted)
                }
            }
        }
    }

    async fn upsert_from_webhook(&self, data: &IdentityUserData) -> Result<User, ApiError> {
        self.upsert_from_identity(
            &data.id,
            data.email.as_deref(),
            data.name.as_deref(),
            data.image_url.as_deref(),
        )
        .await
    }
}
