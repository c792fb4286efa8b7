// src/cars/routes.rs

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Car CRUD plus the multi-step creation wizard
pub fn cars_routes() -> Router {
    Router::new()
        .route(
            "/api/cars",
            post(handlers::create_car).get(handlers::list_my_cars),
        )
        .route("/api/cars/wizard", post(handlers::submit_wizard))
        .route(
            "/api/cars/:id",
            get(handlers::get_car)
                .put(handlers::update_car)
                .delete(handlers::delete_car),
        )
}
