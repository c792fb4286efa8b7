// src/mods/routes.rs

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

pub fn mods_routes() -> Router {
    Router::new()
        .route(
            "/api/cars/:id/mods",
            post(handlers::create_mod).get(handlers::list_car_mods),
        )
        .route(
            "/api/mods/:id",
            get(handlers::get_mod)
                .put(handlers::update_mod)
                .delete(handlers::delete_mod),
        )
}
