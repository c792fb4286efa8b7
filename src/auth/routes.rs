//! Authentication and user routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the user/identity router
///
/// # Routes
/// - `POST /api/users/sync` - Create or refresh the caller's user record
/// - `GET /api/me` - Current user
/// - `PUT /api/me` - Partial profile update
/// - `POST /api/webhooks/identity` - Identity provider lifecycle events
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/users/sync", post(handlers::sync_user_handler))
        .route(
            "/api/me",
            get(handlers::me_handler).put(handlers::update_me_handler),
        )
        .route(
            "/api/webhooks/identity",
            post(handlers::identity_webhook_handler),
        )
}
