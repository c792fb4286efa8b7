// src/profiles/routes.rs

use axum::{routing::get, Router};

use super::handlers;

pub fn profiles_routes() -> Router {
    Router::new().route(
        "/api/profiles/:username",
        get(handlers::get_public_profile),
    )
}
