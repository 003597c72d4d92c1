//! Application state shared by all handlers.

use exametry_core::{Config, StorageBackend};
use exametry_services::{PackageAssembler, PackageSettings};
use exametry_storage::Storage;
use std::sync::Arc;

/// Built once at startup and shared behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub assembler: PackageAssembler,
    /// Secret that `/files` tokens are checked against. Only set for the local
    /// backend, whose download URLs point back at this service.
    pub file_signing_secret: Option<Vec<u8>>,
}

impl AppState {
    pub fn new(config: Config, storage: Arc<dyn Storage>) -> Self {
        let assembler = PackageAssembler::new(storage.clone(), PackageSettings::from_config(&config));
        let file_signing_secret = match storage.backend_type() {
            StorageBackend::Local => config
                .url_signing_secret()
                .map(|secret| secret.as_bytes().to_vec()),
            StorageBackend::S3 => None,
        };

        Self {
            config,
            storage,
            assembler,
            file_signing_secret,
        }
    }
}
