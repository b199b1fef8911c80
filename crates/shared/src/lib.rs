//! Shared types, errors, and configuration for Fisca.
//!
//! This crate provides common types used across all other crates:
//! - The composite transaction business key (`UniqueCode`)
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use types::code::UniqueCode;
