// src/cars/mod.rs
//! Cars owned by users: CRUD, visibility and the creation wizard

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;


pub use models::Car;
pub use routes::cars_routes;
pub use services::CarsService;
