//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::models::{Claims, User};
use crate::common::config::AppConfig;
use crate::common::dev_mode::DEV_USER_EXTERNAL_ID;
use crate::common::{safe_email_log, ApiError, AppState};

/// Verified identity from the bearer token, without requiring a user row.
/// Used by the first-sign-in sync endpoint.
#[derive(Debug, Clone)]
pub struct AuthIdentity {
    pub external_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Authenticated caller with a resolved user record
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: String,
}

async fn app_state<S: Send + Sync>(parts: &mut Parts, state: &S) -> Result<Arc<AppState>, ApiError> {
    let Extension(app_state): Extension<Arc<AppState>> =
        Extension::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;
    Ok(app_state)
}

/// Decode and validate an identity-provider token
pub fn verify_token(config: &AppConfig, token: &str) -> Result<Claims, ApiError> {
    let bare_token = token.strip_prefix("Bearer ").unwrap_or(token).trim();

    let mut validation = Validation::new(Algorithm::HS256);
    if let Some(issuer) = &config.jwt_issuer {
        validation.set_issuer(&[issuer]);
    }

    decode::<Claims>(
        bare_token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|decoded| decoded.claims)
    .map_err(|e| {
        warn!(error = %e, "Token validation failed");
        ApiError::NotAuthenticated("invalid token".into())
    })
}

fn identity_from_parts(parts: &Parts, app_state: &AppState) -> Result<AuthIdentity, ApiError> {
    // DEV MODE: every request is the dev user
    if app_state.config.dev_mode.is_enabled() {
        debug!("DEV MODE: Authentication bypassed");
        return Ok(AuthIdentity {
            external_id: DEV_USER_EXTERNAL_ID.to_string(),
            email: Some(app_state.config.dev_mode.user_email.clone()),
            name: Some(app_state.config.dev_mode.user_name.clone()),
        });
    }

    let token = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            warn!("Authentication failed: missing Authorization header");
            ApiError::NotAuthenticated("missing auth".into())
        })?;

    let claims = verify_token(&app_state.config, token)?;

    Ok(AuthIdentity {
        external_id: claims.sub,
        email: claims.email,
        name: claims.name,
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = app_state(parts, state).await?;
        identity_from_parts(parts, &app_state)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = app_state(parts, state).await?;
        let identity = identity_from_parts(parts, &app_state)?;

        let user: Option<User> = sqlx::query_as::<_, User>("SELECT * FROM users WHERE external_id = ?")
            .bind(&identity.external_id)
            .fetch_optional(&app_state.db)
            .await
            .map_err(|e| {
                error!(
                    error = %e,
                    external_id = %identity.external_id,
                    "Database error during user lookup in authentication"
                );
                ApiError::DatabaseError(e)
            })?;

        match user {
            Some(u) => {
                debug!(
                    user_id = %u.id,
                    email = %safe_email_log(&u.email),
                    "User authentication successful via extractor"
                );
                Ok(AuthedUser { id: u.id })
            }
            None => {
                warn!(
                    external_id = %identity.external_id,
                    "Authentication failed: user not found in database"
                );
                Err(ApiError::NotAuthenticated("user not found".into()))
            }
        }
    }
}
