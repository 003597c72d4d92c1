//! Request-scoped domain models for download packages.
//!
//! Nothing here is persisted: every value lives for the duration of one package
//! assembly. Source images and the produced archive live in object storage.

pub mod package;

pub use package::{
    FormMetadata, ImageReference, ItemOutcome, PackageMetadataDocument, PackageReport,
    PackageRequest, PackageResult,
};
