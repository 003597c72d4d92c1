//! In-memory storage for tests of code that depends on `Storage`.

use crate::traits::{ByteStream, PutObjectOptions, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock storage implementation that stores files in memory
#[derive(Default)]
pub struct MockStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    put_options: Arc<Mutex<HashMap<String, PutObjectOptions>>>,
    failing_keys: Arc<Mutex<HashSet<String>>>,
    fail_uploads: AtomicBool,
    fail_signing: AtomicBool,
    download_calls: AtomicUsize,
    upload_calls: AtomicUsize,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a file in the mock storage
    pub fn set_file(&self, key: &str, data: Vec<u8>) {
        self.files.lock().unwrap().insert(key.to_string(), data);
    }

    /// Make downloads of `key` fail with a backend fault instead of NotFound
    pub fn fail_download(&self, key: &str) {
        self.failing_keys.lock().unwrap().insert(key.to_string());
    }

    /// Make every upload fail
    pub fn fail_uploads(&self) {
        self.fail_uploads.store(true, Ordering::SeqCst);
    }

    /// Make presigned URL generation fail
    pub fn fail_signing(&self) {
        self.fail_signing.store(true, Ordering::SeqCst);
    }

    /// Check if a file exists in the mock storage
    pub fn has_file(&self, key: &str) -> bool {
        self.files.lock().unwrap().contains_key(key)
    }

    /// Get file data (for test assertions)
    pub fn get_file(&self, key: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(key).cloned()
    }

    /// Options the last upload to `key` was made with
    pub fn get_put_options(&self, key: &str) -> Option<PutObjectOptions> {
        self.put_options.lock().unwrap().get(key).cloned()
    }

    pub fn download_calls(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_keys.lock().unwrap().contains(storage_key) {
            return Err(StorageError::DownloadFailed(format!(
                "simulated fault for {}",
                storage_key
            )));
        }
        self.files
            .lock()
            .unwrap()
            .get(storage_key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn download_stream(&self, storage_key: &str) -> StorageResult<ByteStream> {
        let data = self.download(storage_key).await?;
        let byte_stream = stream::once(async move { Ok(Bytes::from(data)) });
        Ok(Box::pin(byte_stream))
    }

    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        options: &PutObjectOptions,
    ) -> StorageResult<()> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed(
                "simulated upload fault".to_string(),
            ));
        }
        self.files
            .lock()
            .unwrap()
            .insert(storage_key.to_string(), data);
        self.put_options
            .lock()
            .unwrap()
            .insert(storage_key.to_string(), options.clone());
        Ok(())
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.files.lock().unwrap().remove(storage_key);
        Ok(())
    }

    async fn get_presigned_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        if self.fail_signing.load(Ordering::SeqCst) {
            return Err(StorageError::BackendError(
                "simulated signing fault".to_string(),
            ));
        }
        if !self.files.lock().unwrap().contains_key(storage_key) {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }
        Ok(format!(
            "https://example.com/presigned/{}?expires_in={}",
            storage_key,
            expires_in.as_secs()
        ))
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.files.lock().unwrap().contains_key(storage_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
