//! Authentication and user handlers

use axum::{
    extract::{Extension, Json},
    http::HeaderMap,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use super::extractors::{AuthIdentity, AuthedUser};
use super::models::{IdentityWebhookEvent, UpdateProfileRequest, User};
use super::services::{UsersService, WebhookOutcome};
use crate::common::{ApiError, AppState};

pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

/// POST /api/users/sync
/// Creates the user record on first sign-in, or refreshes it from the token claims
pub async fn sync_user_handler(
    Extension(state): Extension<Arc<AppState>>,
    identity: AuthIdentity,
) -> Result<Json<User>, ApiError> {
    info!(external_id = %identity.external_id, "Syncing user from identity");

    let user = UsersService::new(state.db.clone())
        .upsert_from_identity(
            &identity.external_id,
            identity.email.as_deref(),
            identity.name.as_deref(),
            None,
        )
        .await?;

    Ok(Json(user))
}

/// GET /api/me
pub async fn me_handler(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
) -> Result<Json<User>, ApiError> {
    let user = UsersService::new(state.db.clone())
        .get_by_id(&authed.id)
        .await?;
    Ok(Json(user))
}

/// PUT /api/me
pub async fn update_me_handler(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<User>, ApiError> {
    info!(user_id = %authed.id, "Updating profile");

    let user = UsersService::new(state.db.clone())
        .update_profile(&authed.id, &request)
        .await?;
    Ok(Json(user))
}

/// POST /api/webhooks/identity
/// Mirrors user lifecycle events from the identity provider
pub async fn identity_webhook_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Json(event): Json<IdentityWebhookEvent>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let expected = state.config.webhook_secret.as_deref().ok_or_else(|| {
        warn!("Identity webhook received but AUTH_WEBHOOK_SECRET is not configured");
        ApiError::ServiceUnavailable("webhook not configured".to_string())
    })?;

    let provided = headers
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !secrets_match(provided, expected) {
        warn!("Identity webhook rejected: bad secret");
        return Err(ApiError::NotAuthenticated("invalid webhook secret".to_string()));
    }

    let outcome = UsersService::new(state.db.clone())
        .apply_webhook(event)
        .await?;

    let body = match outcome {
        WebhookOutcome::Upserted(user_id) => json!({ "status": "upserted", "userId": user_id }),
        WebhookOutcome::Deleted => json!({ "status": "deleted" }),
        WebhookOutcome::Ignored => json!({ "status": "ignored" }),
    };

    Ok(Json(body))
}

/// Compare secrets without short-circuiting on the first differing byte
pub(crate) fn secrets_match(provided: &str, expected: &str) -> bool {
    let (a, b) = (provided.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
