// src/services/mod.rs
//
// Infrastructure services shared by the domain modules

pub mod monitoring;
pub mod rate_limit;
pub mod storage;

// Re-export commonly used types for convenience
pub use rate_limit::RateLimitService;
pub use storage::StorageService;
