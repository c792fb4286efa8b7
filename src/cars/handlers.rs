// src/cars/handlers.rs

use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::info;

use super::models::{Car, CreateCarRequest, UpdateCarRequest, WizardResult, WizardSubmission};
use super::services::CarsService;
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};

/// POST /api/cars
pub async fn create_car(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Json(request): Json<CreateCarRequest>,
) -> Result<(StatusCode, Json<Car>), ApiError> {
    let car = CarsService::new(state.db.clone())
        .create_car(&authed.id, &request)
        .await?;
    Ok((StatusCode::CREATED, Json(car)))
}

/// GET /api/cars
/// The caller's garage, newest first
pub async fn list_my_cars(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
) -> Result<Json<Vec<Car>>, ApiError> {
    let cars = CarsService::new(state.db.clone())
        .list_user_cars(&authed.id)
        .await?;
    Ok(Json(cars))
}

/// GET /api/cars/:id
/// Anonymous callers can read public cars
pub async fn get_car(
    Extension(state): Extension<Arc<AppState>>,
    viewer: Option<AuthedUser>,
    Path(car_id): Path<String>,
) -> Result<Json<Car>, ApiError> {
    let car = CarsService::new(state.db.clone())
        .get_car(&car_id, viewer.as_ref().map(|v| v.id.as_str()))
        .await?;
    Ok(Json(car))
}

/// PUT /api/cars/:id
pub async fn update_car(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Path(car_id): Path<String>,
    Json(request): Json<UpdateCarRequest>,
) -> Result<Json<Car>, ApiError> {
    let car = CarsService::new(state.db.clone())
        .update_car(&authed.id, &car_id, &request)
        .await?;
    Ok(Json(car))
}

/// DELETE /api/cars/:id
pub async fn delete_car(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Path(car_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    CarsService::new(state.db.clone())
        .delete_car(&authed.id, &car_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/cars/wizard
pub async fn submit_wizard(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Json(submission): Json<WizardSubmission>,
) -> Result<(StatusCode, Json<WizardResult>), ApiError> {
    info!(
        user_id = %authed.id,
        mods = submission.mods.len(),
        media = submission.media.len(),
        "Wizard submission received"
    );

    let result = CarsService::new(state.db.clone())
        .submit_wizard(&authed.id, &submission)
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}
