// src/mods/mod.rs
//! Modifications attached to cars, each optionally carrying an affiliate link

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;


pub use models::Mod;
pub use routes::mods_routes;
