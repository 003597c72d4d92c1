//! Test helpers: build the router against in-memory or temp-dir storage.
//!
//! Run from workspace root: `cargo test -p exametry-api`.

#![allow(dead_code)]

use axum_test::TestServer;
use exametry_api::constants;
use exametry_api::setup::routes;
use exametry_api::state::AppState;
use exametry_core::Config;
use exametry_storage::test_helpers::MockStorage;
use exametry_storage::{LocalStorage, Storage};
use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;
use tempfile::TempDir;

pub const TEST_SIGNING_SECRET: &str = "test-signing-secret-0123456789abcdef";
pub const TEST_PUBLIC_BASE_URL: &str = "http://localhost:4000";

/// API path prefix for tests (e.g. `/api/v0/packages`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

pub fn test_config(pairs: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned()).expect("Failed to build test config")
}

pub fn test_server(config: Config, storage: Arc<dyn Storage>) -> TestServer {
    let state = Arc::new(AppState::new(config.clone(), storage));
    let app = routes::setup_routes(&config, state);
    TestServer::new(app.into_make_service()).expect("Failed to create test server")
}

/// Test application backed by `MockStorage`.
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<MockStorage>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Entries of the archive stored under `key`, in archive order.
    pub fn archive_entries(&self, key: &str) -> Vec<(String, Vec<u8>)> {
        let bytes = self
            .storage
            .get_file(key)
            .unwrap_or_else(|| panic!("No archive stored under {}", key));
        read_zip(&bytes)
    }
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with(&[])
}

pub fn setup_test_app_with(pairs: &[(&str, &str)]) -> TestApp {
    let storage = Arc::new(MockStorage::new());
    let server = test_server(test_config(pairs), storage.clone());
    TestApp { server, storage }
}

/// Test application backed by `LocalStorage` in a temp directory.
pub struct LocalTestApp {
    pub server: TestServer,
    pub storage: Arc<LocalStorage>,
    pub _temp_dir: TempDir,
}

impl LocalTestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub async fn setup_local_test_app() -> LocalTestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let storage_path = temp_dir.path().to_string_lossy().to_string();

    let config = test_config(&[
        ("STORAGE_BACKEND", "local"),
        ("LOCAL_STORAGE_PATH", storage_path.as_str()),
        ("PUBLIC_BASE_URL", TEST_PUBLIC_BASE_URL),
        ("URL_SIGNING_SECRET", TEST_SIGNING_SECRET),
    ]);

    let storage = Arc::new(
        LocalStorage::new(
            temp_dir.path(),
            TEST_PUBLIC_BASE_URL.to_string(),
            TEST_SIGNING_SECRET,
        )
        .await
        .expect("Failed to create local storage"),
    );

    let server = test_server(config, storage.clone());
    LocalTestApp {
        server,
        storage,
        _temp_dir: temp_dir,
    }
}

pub fn read_zip(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive =
        zip::ZipArchive::new(std::io::Cursor::new(bytes)).expect("Response is not a zip archive");
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).expect("Failed to read zip entry");
            let mut data = Vec::new();
            file.read_to_end(&mut data).expect("Failed to read zip entry");
            (file.name().to_string(), data)
        })
        .collect()
}

pub fn entry_names(entries: &[(String, Vec<u8>)]) -> Vec<&str> {
    entries.iter().map(|(name, _)| name.as_str()).collect()
}

pub fn form_data() -> serde_json::Value {
    serde_json::json!({ "elr": "E1", "structureNo": "S1", "date": "2024-01-01" })
}
