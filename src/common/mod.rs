// Common module - shared types and utilities across all modules

pub mod config;
pub mod dev_mode;
pub mod error;
pub mod helpers;
pub mod id_generator;
pub mod migrations;
pub mod ownership;
pub mod state;
pub mod validation;

#[cfg(test)]
pub mod test_support;

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use error::ApiError;
pub use helpers::{now_millis, safe_email_log, DAY_MS};
pub use id_generator::*;
pub use ownership::{authorize_owned, find_by_id, Owned};
pub use state::AppState;
pub use validation::{ValidationResult, Validator};
