//! # Auth Module
//!
//! Identity handling for the API:
//! - Bearer token verification against the identity provider's shared secret
//! - `AuthIdentity` / `AuthedUser` extractors for protected routes
//! - User records mirrored from sign-ins and provider webhooks

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;

#[cfg(test)]
mod tests;

pub use extractors::AuthedUser;
pub use routes::auth_routes;
pub use services::UsersService;
