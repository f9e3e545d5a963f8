//! Jobtrack Core Library
//!
//! This crate provides core domain models, error types, configuration, and
//! validation that are shared across all jobtrack components.

pub mod config;
pub mod constants;
pub mod error;
pub mod filescan;
pub mod models;
pub mod storage_types;
pub mod validation;
pub mod workflow;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, FieldError, LogLevel};
pub use storage_types::StorageBackend;
