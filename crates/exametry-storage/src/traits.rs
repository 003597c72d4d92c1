//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    /// True when the object does not exist, as opposed to a transient backend fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Chunked object body returned by [`Storage::download_stream`].
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Object attributes written alongside the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObjectOptions {
    pub content_type: String,
    /// e.g. `attachment; filename="package.zip"`
    pub content_disposition: Option<String>,
}

impl PutObjectOptions {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            content_disposition: None,
        }
    }

    /// Mark the object as a download named `filename`.
    pub fn attachment(mut self, filename: &str) -> Self {
        self.content_disposition = Some(format!("attachment; filename=\"{}\"", filename));
        self
    }
}

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) implement this trait. The package
/// assembler only talks to `Arc<dyn Storage>`, so backends are chosen once at
/// startup and shared across requests.
///
/// No operation retries: a failed call is returned to the caller immediately.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Download the full content of an object.
    ///
    /// Returns `StorageError::NotFound` when the key does not exist.
    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Download an object as a stream of chunks (for serving large files).
    async fn download_stream(&self, storage_key: &str) -> StorageResult<ByteStream>;

    /// Write `data` under `storage_key`, replacing any existing object.
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        options: &PutObjectOptions,
    ) -> StorageResult<()>;

    /// Delete an object. Deleting a missing object is not an error.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Generate a URL that allows an unauthenticated GET of `storage_key`
    /// until `expires_in` has elapsed.
    async fn get_presigned_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Check if an object exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
