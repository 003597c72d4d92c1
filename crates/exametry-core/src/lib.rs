//! Exametry Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! the storage, services and API crates of the Exametry download packager.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, PackageConfig, ServerConfig, StorageConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    FormMetadata, ImageReference, ItemOutcome, PackageMetadataDocument, PackageReport,
    PackageRequest, PackageResult,
};
pub use storage_types::StorageBackend;
