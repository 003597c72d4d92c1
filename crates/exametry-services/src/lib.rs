//! Exametry Services Layer
//!
//! Business logic for download packages: the zip [`ArchiveBuilder`] and the
//! [`PackageAssembler`] that fetches images, records per-image outcomes, and
//! publishes the finished archive. HTTP concerns stay in exametry-api.

pub mod archive;
pub mod package;

pub use archive::{ArchiveBuilder, ArchiveEntry, EntryContent};
pub use exametry_storage::{
    create_storage, PutObjectOptions, Storage, StorageBackend, StorageError, StorageResult,
};
pub use package::{PackageAssembler, PackageError, PackageOutcome, PackageSettings};
