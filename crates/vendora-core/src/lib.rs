//! Vendora Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! the catalog store, the ingestion pipeline and the HTTP service.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{CompressionSettings, Config, ImageLimitsConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
