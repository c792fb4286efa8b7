// src/media/handlers.rs

use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::info;

use super::models::{CreateMediaRequest, Media, UploadUrlRequest, UploadUrlResponse};
use super::services::MediaService;
use crate::auth::AuthedUser;
use crate::cars::Car;
use crate::common::{ApiError, AppState};

fn media_service(state: &AppState) -> MediaService {
    MediaService::new(state.db.clone(), state.storage_service.clone())
}

/// POST /api/uploads/url
/// Presigned PUT URL for a direct upload to object storage
pub async fn create_upload_url(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Json(request): Json<UploadUrlRequest>,
) -> Result<Json<UploadUrlResponse>, ApiError> {
    info!(
        user_id = %authed.id,
        file_name = %request.file_name,
        content_type = %request.content_type,
        "Upload URL requested"
    );

    let response = media_service(&state)
        .create_upload_url(&authed.id, &request)
        .await?;
    Ok(Json(response))
}

/// POST /api/cars/:id/media
pub async fn add_media(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Path(car_id): Path<String>,
    Json(request): Json<CreateMediaRequest>,
) -> Result<(StatusCode, Json<Media>), ApiError> {
    let row = media_service(&state)
        .add_media(&authed.id, &car_id, &request)
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/cars/:id/media
pub async fn list_car_media(
    Extension(state): Extension<Arc<AppState>>,
    viewer: Option<AuthedUser>,
    Path(car_id): Path<String>,
) -> Result<Json<Vec<Media>>, ApiError> {
    let media = media_service(&state)
        .list_for_car(&car_id, viewer.as_ref().map(|v| v.id.as_str()))
        .await?;
    Ok(Json(media))
}

/// DELETE /api/media/:id
pub async fn delete_media(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Path(media_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    media_service(&state)
        .delete_media(&authed.id, &media_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/media/:id/main
pub async fn set_main_media(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Path(media_id): Path<String>,
) -> Result<Json<Car>, ApiError> {
    let car = media_service(&state).set_main(&authed.id, &media_id).await?;
    Ok(Json(car))
}
