// src/profiles/handlers.rs

use axum::extract::{Extension, Json, Path};
use std::sync::Arc;

use super::models::PublicProfile;
use super::services::ProfilesService;
use crate::common::{ApiError, AppState};

/// GET /api/profiles/:username
pub async fn get_public_profile(
    Extension(state): Extension<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<PublicProfile>, ApiError> {
    let profile = ProfilesService::new(state.db.clone())
        .get_public_profile(&username)
        .await?;
    Ok(Json(profile))
}
