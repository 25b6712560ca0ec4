//! Shared types, errors, and configuration for Arus.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Pagination types for list endpoints
//! - Application-wide error taxonomy
//! - Configuration management and the business clock

pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::BusinessClock;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
