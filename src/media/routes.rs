// src/media/routes.rs

use axum::{
    routing::{delete, post},
    Router,
};

use super::handlers;

/// Photo/video records for cars and presigned upload URLs
pub fn media_routes() -> Router {
    Router::new()
        .route("/api/uploads/url", post(handlers::create_upload_url))
        .route(
            "/api/cars/:id/media",
            post(handlers::add_media).get(handlers::list_car_media),
        )
        .route("/api/media/:id", delete(handlers::delete_media))
        .route("/api/media/:id/main", post(handlers::set_main_media))
}
