use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One image selected for a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageReference {
    /// Caller-side identifier; only used to disambiguate clashing filenames.
    #[serde(default)]
    pub id: String,
    pub filename: String,
    /// Key under which the storage backend holds the image bytes.
    pub storage_key: String,
}

impl ImageReference {
    pub fn new(
        id: impl Into<String>,
        filename: impl Into<String>,
        storage_key: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
            storage_key: storage_key.into(),
        }
    }
}

/// Project identifiers entered alongside the selected images.
///
/// Copied into `metadata.json` as-is; values are not validated here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormMetadata {
    #[serde(default)]
    pub elr: String,
    #[serde(default)]
    pub structure_no: String,
    #[serde(default)]
    pub date: String,
}

/// Complete input to package assembly. `images` must be non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRequest {
    pub images: Vec<ImageReference>,
    pub metadata: Option<FormMetadata>,
}

impl PackageRequest {
    pub fn new(images: Vec<ImageReference>, metadata: Option<FormMetadata>) -> Self {
        Self { images, metadata }
    }
}

/// Returned when a package has been stored and signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PackageResult {
    /// Time-limited GET URL for the archive.
    pub download_url: String,
    pub archive_key: String,
    /// Number of images requested, including those replaced by placeholders.
    pub image_count: usize,
}

/// What happened to a single requested image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ItemOutcome {
    #[serde(rename_all = "camelCase")]
    Included {
        id: String,
        filename: String,
        entry_name: String,
    },
    #[serde(rename_all = "camelCase")]
    Failed {
        id: String,
        filename: String,
        placeholder: String,
        reason: String,
    },
}

impl ItemOutcome {
    pub fn filename(&self) -> &str {
        match self {
            ItemOutcome::Included { filename, .. } | ItemOutcome::Failed { filename, .. } => {
                filename
            }
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ItemOutcome::Failed { .. })
    }
}

/// Per-item outcomes of one assembly, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageReport {
    pub outcomes: Vec<ItemOutcome>,
}

impl PackageReport {
    pub fn included_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_failed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    pub fn failed_filenames(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|o| o.is_failed())
            .map(|o| o.filename().to_string())
            .collect()
    }
}

/// Body of the `metadata.json` archive entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageMetadataDocument<'a> {
    pub project_details: &'a FormMetadata,
    pub processed_at: DateTime<Utc>,
    pub total_images: usize,
}
