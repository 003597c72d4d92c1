//! Server-wide in-flight request cap.
//!
//! Run with: `cargo test -p exametry-api --test limits_test`

mod helpers;

use async_trait::async_trait;
use axum::http::StatusCode;
use exametry_storage::test_helpers::MockStorage;
use exametry_storage::{ByteStream, PutObjectOptions, Storage, StorageBackend, StorageResult};
use helpers::{api_path, test_config, test_server};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Holds every download until `release` is notified.
struct GatedStorage {
    inner: MockStorage,
    entered: Notify,
    release: Notify,
}

impl GatedStorage {
    fn new() -> Self {
        Self {
            inner: MockStorage::new(),
            entered: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl Storage for GatedStorage {
    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.download(storage_key).await
    }

    async fn download_stream(&self, storage_key: &str) -> StorageResult<ByteStream> {
        self.inner.download_stream(storage_key).await
    }

    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        options: &PutObjectOptions,
    ) -> StorageResult<()> {
        self.inner.upload_with_key(storage_key, data, options).await
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.inner.delete(storage_key).await
    }

    async fn get_presigned_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.inner.get_presigned_url(storage_key, expires_in).await
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        self.inner.exists(storage_key).await
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }
}

#[tokio::test]
async fn test_concurrency_limit_is_shared_across_routes() {
    let storage = Arc::new(GatedStorage::new());
    storage.inner.set_file("k1", b"jpeg".to_vec());
    let server = test_server(
        test_config(&[("HTTP_CONCURRENCY_LIMIT", "1")]),
        storage.clone(),
    );

    let package = async {
        server
            .post(&api_path("/packages"))
            .json(&json!({ "selectedImages": [{ "filename": "a.jpg", "storageKey": "k1" }] }))
            .await
    };

    let other_route = async {
        storage.entered.notified().await;
        let blocked = tokio::time::timeout(Duration::from_millis(200), async {
            server.get("/live").await
        })
        .await
        .is_err();
        storage.release.notify_one();
        blocked
    };

    let (package_response, live_was_blocked) = tokio::join!(package, other_route);

    assert!(live_was_blocked, "/live ran while a package request held the only slot");
    assert_eq!(package_response.status_code(), StatusCode::OK);

    let live = server.get("/live").await;
    assert_eq!(live.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_requests_below_the_limit_run_concurrently() {
    let storage = Arc::new(GatedStorage::new());
    storage.inner.set_file("k1", b"jpeg".to_vec());
    let server = test_server(
        test_config(&[("HTTP_CONCURRENCY_LIMIT", "2")]),
        storage.clone(),
    );

    let package = async {
        server
            .post(&api_path("/packages"))
            .json(&json!({ "selectedImages": [{ "filename": "a.jpg", "storageKey": "k1" }] }))
            .await
    };

    let other_route = async {
        storage.entered.notified().await;
        let live = tokio::time::timeout(Duration::from_secs(5), async {
            server.get("/live").await
        })
        .await;
        storage.release.notify_one();
        live
    };

    let (package_response, live) = tokio::join!(package, other_route);

    let live = live.expect("/live should not wait below the limit");
    assert_eq!(live.status_code(), StatusCode::OK);
    assert_eq!(package_response.status_code(), StatusCode::OK);
}
