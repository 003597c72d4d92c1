use super::error::PackageError;
use crate::archive::{sanitize_archive_filename, split_extension, ArchiveBuilder, EntryContent};
use exametry_core::constants::{
    DEFAULT_FETCH_CONCURRENCY, DEFAULT_PACKAGE_KEY_PREFIX, DEFAULT_PACKAGE_URL_TTL_SECS,
    METADATA_ENTRY_NAME, ZIP_CONTENT_TYPE,
};
use exametry_core::{
    Config, FormMetadata, ImageReference, ItemOutcome, PackageMetadataDocument, PackageReport,
    PackageRequest, PackageResult,
};
use exametry_storage::keys::{file_name_of, generate_archive_key};
use exametry_storage::{PutObjectOptions, Storage, StorageResult};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Tunables for package assembly.
#[derive(Debug, Clone)]
pub struct PackageSettings {
    /// Maximum number of image downloads in flight at once.
    pub fetch_concurrency: usize,
    /// Lifetime of the returned download URL.
    pub url_ttl: Duration,
    /// Key prefix under which archives are written.
    pub key_prefix: String,
    /// Reject the package when more than this share of images failed. `None` never rejects.
    pub max_failure_ratio: Option<f64>,
}

impl Default for PackageSettings {
    fn default() -> Self {
        Self {
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            url_ttl: Duration::from_secs(DEFAULT_PACKAGE_URL_TTL_SECS),
            key_prefix: DEFAULT_PACKAGE_KEY_PREFIX.to_string(),
            max_failure_ratio: None,
        }
    }
}

impl PackageSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            fetch_concurrency: config.package_fetch_concurrency().max(1),
            url_ttl: config.package_url_ttl(),
            key_prefix: config.package_key_prefix().to_string(),
            max_failure_ratio: config.package_max_failure_ratio(),
        }
    }
}

/// A published package together with what happened to each requested image.
#[derive(Debug, Clone)]
pub struct PackageOutcome {
    pub result: PackageResult,
    pub report: PackageReport,
}

/// Builds download packages: fetch images, zip them with a metadata entry,
/// store the archive and hand back a time-limited download URL.
///
/// A missing or unreadable image never aborts the package; it is replaced by an
/// `error_<filename>.txt` placeholder and reported as failed.
#[derive(Clone)]
pub struct PackageAssembler {
    storage: Arc<dyn Storage>,
    settings: PackageSettings,
}

impl PackageAssembler {
    pub fn new(storage: Arc<dyn Storage>, settings: PackageSettings) -> Self {
        Self { storage, settings }
    }

    pub fn settings(&self) -> &PackageSettings {
        &self.settings
    }

    #[tracing::instrument(skip(self, request), fields(image_count = request.images.len()))]
    pub async fn assemble(&self, request: &PackageRequest) -> Result<PackageOutcome, PackageError> {
        if request.images.is_empty() {
            return Err(PackageError::InvalidRequest(
                "At least one image must be selected".to_string(),
            ));
        }

        let start = Instant::now();
        let total = request.images.len();

        let fetched = self.fetch_images(&request.images).await;

        let mut builder = ArchiveBuilder::new();
        if request.metadata.is_some() {
            builder.reserve(METADATA_ENTRY_NAME);
        }

        let mut report = PackageReport {
            outcomes: Vec::with_capacity(total),
        };
        for (image, result) in request.images.iter().zip(fetched) {
            let outcome = match result {
                Ok(bytes) => {
                    let preferred = image_entry_name(image, &builder);
                    let entry_name = builder.add_entry(&preferred, EntryContent::Bytes(bytes));
                    ItemOutcome::Included {
                        id: image.id.clone(),
                        filename: image.filename.clone(),
                        entry_name,
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        image_id = %image.id,
                        filename = %image.filename,
                        storage_key = %image.storage_key,
                        "Image not available, adding placeholder"
                    );
                    let placeholder = builder.add_entry(
                        &placeholder_name(&image.filename),
                        EntryContent::Text(format!("Image not available: {}", image.filename)),
                    );
                    ItemOutcome::Failed {
                        id: image.id.clone(),
                        filename: image.filename.clone(),
                        placeholder,
                        reason: e.to_string(),
                    }
                }
            };
            report.outcomes.push(outcome);
        }

        let failed = report.failed_count();
        if let Some(ratio) = self.settings.max_failure_ratio {
            if failed as f64 / total as f64 > ratio {
                tracing::warn!(failed, total, ratio, "Too many images failed, rejecting package");
                return Err(PackageError::TooManyFailures { failed, total });
            }
        }

        if let Some(ref metadata) = request.metadata {
            let document = metadata_document(metadata, total)?;
            builder.add_reserved(METADATA_ENTRY_NAME, EntryContent::Bytes(document));
        }

        let archive = tokio::task::spawn_blocking(move || builder.serialize())
            .await
            .map_err(|e| PackageError::Archive(e.to_string()))?
            .map_err(|e| PackageError::Archive(format!("{:#}", e)))?;
        let archive_size = archive.len();

        let archive_key = generate_archive_key(&self.settings.key_prefix);
        let options = PutObjectOptions::new(ZIP_CONTENT_TYPE).attachment(file_name_of(&archive_key));
        self.storage
            .upload_with_key(&archive_key, archive, &options)
            .await?;

        let download_url = self
            .storage
            .get_presigned_url(&archive_key, self.settings.url_ttl)
            .await?;

        tracing::info!(
            archive_key = %archive_key,
            image_count = total,
            failed_count = failed,
            size_bytes = archive_size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Download package created"
        );

        Ok(PackageOutcome {
            result: PackageResult {
                download_url,
                archive_key,
                image_count: total,
            },
            report,
        })
    }

    /// Download every image, at most `fetch_concurrency` at a time, keeping input order.
    async fn fetch_images(&self, images: &[ImageReference]) -> Vec<StorageResult<Vec<u8>>> {
        let keys: Vec<String> = images.iter().map(|i| i.storage_key.clone()).collect();
        stream::iter(keys)
            .map(|key| {
                let storage = Arc::clone(&self.storage);
                async move { storage.download(&key).await }
            })
            .buffered(self.settings.fetch_concurrency.max(1))
            .collect()
            .await
    }
}

/// Entry name for a fetched image; a clashing filename gets the image id appended.
/// Without a usable id the name is left for the builder to number.
fn image_entry_name(image: &ImageReference, builder: &ArchiveBuilder) -> String {
    let filename = sanitize_archive_filename(&image.filename, &format!("image_{}", image.id));
    if !builder.is_taken(&filename) {
        return filename;
    }
    let id = sanitize_archive_filename(&image.id, "");
    if id.is_empty() {
        return filename;
    }
    match split_extension(&filename) {
        (stem, Some(ext)) => format!("{}_{}.{}", stem, id, ext),
        (stem, None) => format!("{}_{}", stem, id),
    }
}

fn placeholder_name(filename: &str) -> String {
    format!("error_{}.txt", sanitize_archive_filename(filename, "unnamed"))
}

fn metadata_document(metadata: &FormMetadata, total: usize) -> Result<Vec<u8>, PackageError> {
    let document = PackageMetadataDocument {
        project_details: metadata,
        processed_at: chrono::Utc::now(),
        total_images: total,
    };
    serde_json::to_vec_pretty(&document).map_err(|e| PackageError::Archive(e.to_string()))
}
