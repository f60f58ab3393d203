// Blog CMS - articles, comments, engagement counters and analytics over a document store

pub mod app_state;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod routes;
pub mod services;

// Common utilities
pub mod error;

// Re-exports for convenience
pub use error::{AppError, AppResult};
