use anyhow::{Context, Result};
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

/// Content of one archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryContent {
    Bytes(Vec<u8>),
    /// UTF-8 text, used for placeholders.
    Text(String),
}

impl EntryContent {
    fn as_bytes(&self) -> &[u8] {
        match self {
            EntryContent::Bytes(bytes) => bytes,
            EntryContent::Text(text) => text.as_bytes(),
        }
    }
}

/// One named file inside the produced archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub content: EntryContent,
}

/// Sanitize filename for archive entry to prevent path traversal.
/// Extracts only the base name (strips path components like `../`).
pub fn sanitize_archive_filename(filename: &str, fallback: &str) -> String {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or(fallback)
        .to_string()
}

/// Accumulates named entries and serializes them into a zip archive.
///
/// Entries keep insertion order. Names are unique: a name that is already taken
/// gets a numeric suffix before its extension (`photo.jpg` -> `photo_2.jpg`).
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    entries: Vec<ArchiveEntry>,
    taken: HashSet<String>,
    reserved: HashSet<String>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold `name` back for a later [`ArchiveBuilder::add_reserved`] call.
    pub fn reserve(&mut self, name: &str) {
        self.reserved.insert(name.to_string());
    }

    /// Whether `name` is already used by an entry or a reservation.
    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name) || self.reserved.contains(name)
    }

    /// Add an entry and return the name it was stored under.
    pub fn add_entry(&mut self, name: &str, content: EntryContent) -> String {
        let sanitized = sanitize_archive_filename(name, "unnamed");
        let unique = self.unique_name(&sanitized);
        self.push(unique.clone(), content);
        unique
    }

    /// Add an entry under a previously reserved name, keeping that exact name.
    pub fn add_reserved(&mut self, name: &str, content: EntryContent) -> String {
        if self.reserved.remove(name) && !self.taken.contains(name) {
            self.push(name.to_string(), content);
            name.to_string()
        } else {
            self.add_entry(name, content)
        }
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write all entries, in insertion order, into a zip byte buffer.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        use zip::write::{FileOptions, ZipWriter};
        use zip::CompressionMethod;

        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(std::io::Cursor::new(&mut buffer));
            let options = FileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .unix_permissions(0o644);

            for entry in &self.entries {
                zip.start_file(entry.name.as_str(), options)
                    .with_context(|| format!("Failed to add file to ZIP: {}", entry.name))?;
                zip.write_all(entry.content.as_bytes()).with_context(|| {
                    format!("Failed to write file data to ZIP: {}", entry.name)
                })?;
            }

            zip.finish().context("Failed to finalize ZIP archive")?;
        }

        Ok(buffer)
    }

    fn push(&mut self, name: String, content: EntryContent) {
        self.taken.insert(name.clone());
        self.entries.push(ArchiveEntry { name, content });
    }

    fn unique_name(&self, name: &str) -> String {
        if !self.is_taken(name) {
            return name.to_string();
        }
        let (stem, extension) = split_extension(name);
        (2..)
            .map(|n| match extension {
                Some(ext) => format!("{}_{}.{}", stem, n, ext),
                None => format!("{}_{}", stem, n),
            })
            .find(|candidate| !self.is_taken(candidate))
            .unwrap_or_else(|| name.to_string())
    }
}

/// Split `photo.jpg` into (`photo`, Some(`jpg`)). Dotfiles have no extension.
pub(crate) fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => (&name[..idx], Some(&name[idx + 1..])),
        _ => (name, None),
    }
}
