use crate::keys::validate_key;
use crate::signing;
use crate::traits::{ByteStream, PutObjectOptions, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// Download URLs point back at this service (`{public_base_url}/files?token=...`)
/// and carry an HMAC-signed, expiring token instead of a cloud presignature.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    public_base_url: String,
    signing_secret: Vec<u8>,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/exametry")
    /// * `public_base_url` - Externally reachable base URL of the API (e.g., "http://localhost:4000")
    /// * `signing_secret` - Secret used to sign download tokens
    pub async fn new(
        base_path: impl Into<PathBuf>,
        public_base_url: String,
        signing_secret: impl Into<Vec<u8>>,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            public_base_url,
            signing_secret: signing_secret.into(),
        })
    }

    /// Secret shared with the file-serving route that verifies tokens.
    pub fn signing_secret(&self) -> &[u8] {
        &self.signing_secret
    }

    /// Convert storage key to filesystem path with security validation
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        validate_key(storage_key)?;

        let path = self.base_path.join(storage_key);

        let base_canonical = self.base_path.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
        })?;

        if let Ok(canonical) = path.canonicalize() {
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        tracing::debug!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage download successful"
        );

        Ok(data)
    }

    async fn download_stream(&self, storage_key: &str) -> StorageResult<ByteStream> {
        let path = self.key_to_path(storage_key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }

        let file = fs::File::open(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to open file {}: {}", path.display(), e))
        })?;

        let stream = tokio_util::io::ReaderStream::new(file).map(|result| {
            result.map_err(|e| StorageError::DownloadFailed(format!("Failed to read chunk: {}", e)))
        });

        Ok(Box::pin(stream))
    }

    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        options: &PutObjectOptions,
    ) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = size,
            content_type = %options.content_type,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload_with_key successful"
        );

        Ok(())
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        Ok(())
    }

    async fn get_presigned_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.key_to_path(storage_key)?;
        let token = signing::create(storage_key, expires_in, &self.signing_secret);
        Ok(format!(
            "{}/files?token={}",
            self.public_base_url.trim_end_matches('/'),
            token
        ))
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    async fn storage_in(dir: &Path) -> LocalStorage {
        LocalStorage::new(dir, "http://localhost:4000/".to_string(), SECRET)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_local_storage_upload_download() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;

        let data = b"zip bytes".to_vec();
        storage
            .upload_with_key(
                "downloads/1_abc.zip",
                data.clone(),
                &PutObjectOptions::new("application/zip"),
            )
            .await
            .unwrap();

        let downloaded = storage.download("downloads/1_abc.zip").await.unwrap();
        assert_eq!(data, downloaded);
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;

        let result = storage.download("images/missing.jpg").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;

        let result = storage.download("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete("../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.exists("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_upload_overwrites() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;
        let options = PutObjectOptions::new("text/plain");

        storage
            .upload_with_key("a.txt", b"first".to_vec(), &options)
            .await
            .unwrap();
        storage
            .upload_with_key("a.txt", b"second".to_vec(), &options)
            .await
            .unwrap();

        assert_eq!(storage.download("a.txt").await.unwrap(), b"second".to_vec());
    }

    #[tokio::test]
    async fn test_delete_and_exists() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;

        storage
            .upload_with_key("a.txt", b"x".to_vec(), &PutObjectOptions::new("text/plain"))
            .await
            .unwrap();
        assert!(storage.exists("a.txt").await.unwrap());

        storage.delete("a.txt").await.unwrap();
        assert!(!storage.exists("a.txt").await.unwrap());
        assert!(storage.delete("a.txt").await.is_ok());
    }

    #[tokio::test]
    async fn test_presigned_url_carries_verifiable_token() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;

        let url = storage
            .get_presigned_url("downloads/1_abc.zip", Duration::from_secs(3600))
            .await
            .unwrap();
        assert!(url.starts_with("http://localhost:4000/files?token="));

        let token = url.split_once("token=").unwrap().1;
        assert_eq!(
            signing::verify(token, SECRET.as_bytes()).unwrap(),
            "downloads/1_abc.zip"
        );
    }

    #[tokio::test]
    async fn test_stream_download() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;
        let data = b"stream download test".to_vec();

        storage
            .upload_with_key("s.bin", data.clone(), &PutObjectOptions::new("application/octet-stream"))
            .await
            .unwrap();

        let mut stream = storage.download_stream("s.bin").await.unwrap();
        let mut downloaded = Vec::new();
        while let Some(chunk) = stream.next().await {
            downloaded.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(data, downloaded);
    }
}
