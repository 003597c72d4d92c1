//! Exametry Storage Library
//!
//! Storage abstraction for the download packager: the `Storage` trait and its S3
//! and local filesystem implementations.
//!
//! # Key format
//!
//! Source images are addressed by whatever key the uploader stored them under.
//! Generated packages are written to `{prefix}/{epoch_millis}_{suffix}.zip` (see
//! the `keys` module). Keys must not contain `..` or a leading `/`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod signing;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
pub mod traits;

// Re-export commonly used types
pub use exametry_core::StorageBackend;
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ByteStream, PutObjectOptions, Storage, StorageError, StorageResult};
