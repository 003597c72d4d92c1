use exametry_core::AppError;
use exametry_storage::StorageError;
use thiserror::Error;

/// Failures that abort a whole package.
///
/// Per-image fetch failures are not errors at this level; they are recorded in the
/// package report and replaced by placeholder entries.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{failed} of {total} images could not be retrieved")]
    TooManyFailures { failed: usize, total: usize },

    #[error("Archive serialization failed: {0}")]
    Archive(String),

    #[error("Storage operation failed: {0}")]
    Storage(#[from] StorageError),
}

impl From<PackageError> for AppError {
    fn from(err: PackageError) -> Self {
        match err {
            PackageError::InvalidRequest(msg) => AppError::InvalidInput(msg),
            other => AppError::PackageAssemblyFailed(other.to_string()),
        }
    }
}
