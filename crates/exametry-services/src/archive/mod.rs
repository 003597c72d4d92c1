//! In-memory zip archive construction.

mod builder;

pub use builder::{sanitize_archive_filename, ArchiveBuilder, ArchiveEntry, EntryContent};
pub(crate) use builder::split_extension;
