// src/media/mod.rs
//! Car photos and videos. Bytes go straight to object storage; only URLs are kept here.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;


pub use routes::media_routes;
