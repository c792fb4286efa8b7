// src/profiles/mod.rs
//! Read-only public profile pages

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;


pub use routes::profiles_routes;
