// src/mods/handlers.rs

use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
};
use std::sync::Arc;

use super::models::{CreateModRequest, Mod, UpdateModRequest};
use super::services::ModsService;
use crate::auth::AuthedUser;
use crate::cars::CarsService;
use crate::common::{ApiError, AppState};

/// POST /api/cars/:id/mods
pub async fn create_mod(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Path(car_id): Path<String>,
    Json(request): Json<CreateModRequest>,
) -> Result<(StatusCode, Json<Mod>), ApiError> {
    let row = ModsService::new(state.db.clone())
        .create_mod(&authed.id, &car_id, &request)
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/cars/:id/mods
pub async fn list_car_mods(
    Extension(state): Extension<Arc<AppState>>,
    viewer: Option<AuthedUser>,
    Path(car_id): Path<String>,
) -> Result<Json<Vec<Mod>>, ApiError> {
    // Same visibility as the car itself
    CarsService::new(state.db.clone())
        .get_car(&car_id, viewer.as_ref().map(|v| v.id.as_str()))
        .await?;

    let mods = ModsService::new(state.db.clone())
        .list_for_car(&car_id)
        .await?;
    Ok(Json(mods))
}

/// GET /api/mods/:id
pub async fn get_mod(
    Extension(state): Extension<Arc<AppState>>,
    viewer: Option<AuthedUser>,
    Path(mod_id): Path<String>,
) -> Result<Json<Mod>, ApiError> {
    let row = ModsService::new(state.db.clone())
        .get_mod(&mod_id, viewer.as_ref().map(|v| v.id.as_str()))
        .await?;
    Ok(Json(row))
}

/// PUT /api/mods/:id
pub async fn update_mod(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Path(mod_id): Path<String>,
    Json(request): Json<UpdateModRequest>,
) -> Result<Json<Mod>, ApiError> {
    let row = ModsService::new(state.db.clone())
        .update_mod(&authed.id, &mod_id, &request)
        .await?;
    Ok(Json(row))
}

/// DELETE /api/mods/:id
pub async fn delete_mod(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Path(mod_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    ModsService::new(state.db.clone())
        .delete_mod(&authed.id, &mod_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
