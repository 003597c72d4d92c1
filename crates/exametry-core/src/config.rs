//! Configuration module
//!
//! Configuration is read once at startup from the environment (a `.env` file is
//! loaded first when present) and passed explicitly to the services that need it.

use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_BUCKET, DEFAULT_FETCH_CONCURRENCY, DEFAULT_PACKAGE_KEY_PREFIX,
    DEFAULT_PACKAGE_URL_TTL_SECS, DEFAULT_REGION, MAX_S3_PRESIGNED_URL_TTL_SECS,
    MIN_SIGNING_SECRET_LEN,
};
use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 4000;
const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;

/// HTTP server settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub max_request_body_bytes: usize,
    /// Server-wide cap on in-flight requests.
    pub http_concurrency_limit: usize,
    /// `json` switches log output to JSON lines; anything else is human-readable.
    pub log_format: String,
}

/// Object storage settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub storage_backend: StorageBackend,
    pub s3_bucket: String,
    pub s3_region: String,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub local_storage_path: Option<String>,
    /// Externally reachable base URL of this service, used to build local download links.
    pub public_base_url: Option<String>,
    pub url_signing_secret: Option<String>,
}

/// Package assembly settings
#[derive(Clone, Debug)]
pub struct PackageConfig {
    pub fetch_concurrency: usize,
    pub url_ttl_secs: u64,
    pub key_prefix: String,
    /// When set, packages where more than this share of images failed are rejected.
    pub max_failure_ratio: Option<f64>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub package: PackageConfig,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server = ServerConfig {
            server_port: lookup("PORT")
                .unwrap_or_else(|| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            max_request_body_bytes: lookup("MAX_REQUEST_BODY_BYTES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_REQUEST_BODY_BYTES),
            http_concurrency_limit: lookup("HTTP_CONCURRENCY_LIMIT")
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(HTTP_CONCURRENCY_LIMIT)
                .max(1),
            log_format: lookup("LOG_FORMAT")
                .unwrap_or_else(|| "text".to_string())
                .to_lowercase(),
        };

        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::S3,
        };

        let storage = StorageConfig {
            storage_backend,
            s3_bucket: lookup("S3_BUCKET")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            s3_region: lookup("S3_REGION")
                .or_else(|| lookup("AWS_REGION"))
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            s3_endpoint: lookup("S3_ENDPOINT").filter(|s| !s.trim().is_empty()),
            local_storage_path: lookup("LOCAL_STORAGE_PATH"),
            public_base_url: lookup("PUBLIC_BASE_URL"),
            url_signing_secret: lookup("URL_SIGNING_SECRET"),
        };

        let package = PackageConfig {
            fetch_concurrency: lookup("PACKAGE_FETCH_CONCURRENCY")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_FETCH_CONCURRENCY),
            url_ttl_secs: lookup("PACKAGE_URL_TTL_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PACKAGE_URL_TTL_SECS),
            key_prefix: lookup("PACKAGE_KEY_PREFIX")
                .map(|s| s.trim().trim_matches('/').to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_PACKAGE_KEY_PREFIX.to_string()),
            max_failure_ratio: match lookup("PACKAGE_MAX_FAILURE_RATIO") {
                Some(value) => Some(value.parse().map_err(|_| {
                    anyhow::anyhow!("PACKAGE_MAX_FAILURE_RATIO must be a number between 0 and 1")
                })?),
                None => None,
            },
        };

        Ok(Config {
            server,
            storage,
            package,
        })
    }

    /// Reject configurations that would fail at request time.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.server.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.package.fetch_concurrency == 0 {
            return Err(anyhow::anyhow!(
                "PACKAGE_FETCH_CONCURRENCY must be at least 1"
            ));
        }

        if self.package.url_ttl_secs == 0 {
            return Err(anyhow::anyhow!("PACKAGE_URL_TTL_SECS must be at least 1"));
        }

        if self.storage.storage_backend == StorageBackend::S3
            && self.package.url_ttl_secs > MAX_S3_PRESIGNED_URL_TTL_SECS
        {
            return Err(anyhow::anyhow!(
                "PACKAGE_URL_TTL_SECS must not exceed {} with the S3 backend, got {}",
                MAX_S3_PRESIGNED_URL_TTL_SECS,
                self.package.url_ttl_secs
            ));
        }

        if let Some(ratio) = self.package.max_failure_ratio {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(anyhow::anyhow!(
                    "PACKAGE_MAX_FAILURE_RATIO must be between 0 and 1, got {}",
                    ratio
                ));
            }
        }

        if self.storage.storage_backend == StorageBackend::Local {
            if self.storage.local_storage_path.is_none() {
                return Err(anyhow::anyhow!(
                    "LOCAL_STORAGE_PATH must be set when using local storage backend"
                ));
            }
            if self.storage.public_base_url.is_none() {
                return Err(anyhow::anyhow!(
                    "PUBLIC_BASE_URL must be set when using local storage backend"
                ));
            }
            match self.storage.url_signing_secret.as_deref() {
                Some(secret) if secret.len() >= MIN_SIGNING_SECRET_LEN => {}
                _ => {
                    return Err(anyhow::anyhow!(
                        "URL_SIGNING_SECRET must be at least {} characters when using local storage backend",
                        MIN_SIGNING_SECRET_LEN
                    ))
                }
            }
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.server.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.server.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.server.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.server.environment
    }

    pub fn max_request_body_bytes(&self) -> usize {
        self.server.max_request_body_bytes
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.server.http_concurrency_limit
    }

    pub fn log_format(&self) -> &str {
        &self.server.log_format
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.storage.storage_backend
    }

    pub fn s3_bucket(&self) -> &str {
        &self.storage.s3_bucket
    }

    pub fn s3_region(&self) -> &str {
        &self.storage.s3_region
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.storage.s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.storage.local_storage_path.as_deref()
    }

    pub fn public_base_url(&self) -> Option<&str> {
        self.storage.public_base_url.as_deref()
    }

    pub fn url_signing_secret(&self) -> Option<&str> {
        self.storage.url_signing_secret.as_deref()
    }

    pub fn package_fetch_concurrency(&self) -> usize {
        self.package.fetch_concurrency
    }

    pub fn package_url_ttl(&self) -> Duration {
        Duration::from_secs(self.package.url_ttl_secs)
    }

    pub fn package_key_prefix(&self) -> &str {
        &self.package.key_prefix
    }

    pub fn package_max_failure_ratio(&self) -> Option<f64> {
        self.package.max_failure_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, anyhow::Error> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server_port(), 4000);
        assert_eq!(config.storage_backend(), StorageBackend::S3);
        assert_eq!(config.s3_bucket(), DEFAULT_BUCKET);
        assert_eq!(config.s3_region(), DEFAULT_REGION);
        assert_eq!(config.package_url_ttl(), Duration::from_secs(3600));
        assert_eq!(config.package_key_prefix(), "downloads");
        assert_eq!(config.package_fetch_concurrency(), 4);
        assert!(config.package_max_failure_ratio().is_none());
        assert_eq!(config.cors_origins(), ["*".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_aws_region_fallback() {
        let config = config_from(&[("AWS_REGION", "us-east-1")]).unwrap();
        assert_eq!(config.s3_region(), "us-east-1");

        let config = config_from(&[("AWS_REGION", "us-east-1"), ("S3_REGION", "eu-west-1")])
            .unwrap();
        assert_eq!(config.s3_region(), "eu-west-1");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(config_from(&[("PORT", "http")]).is_err());
    }

    #[test]
    fn test_invalid_backend_is_rejected() {
        assert!(config_from(&[("STORAGE_BACKEND", "ftp")]).is_err());
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        let config = config_from(&[("ENVIRONMENT", "production")]).unwrap();
        assert!(config.is_production());
        assert!(config.validate().is_err());

        let config = config_from(&[
            ("ENVIRONMENT", "prod"),
            ("CORS_ORIGINS", "https://app.example.com"),
        ])
        .unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_local_backend_requires_signing_secret() {
        let config = config_from(&[
            ("STORAGE_BACKEND", "local"),
            ("LOCAL_STORAGE_PATH", "/tmp/exametry"),
            ("PUBLIC_BASE_URL", "http://localhost:4000"),
            ("URL_SIGNING_SECRET", "too-short"),
        ])
        .unwrap();
        assert!(config.validate().is_err());

        let config = config_from(&[
            ("STORAGE_BACKEND", "local"),
            ("LOCAL_STORAGE_PATH", "/tmp/exametry"),
            ("PUBLIC_BASE_URL", "http://localhost:4000"),
            ("URL_SIGNING_SECRET", "0123456789abcdef0123456789abcdef"),
        ])
        .unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_failure_ratio_bounds() {
        let config = config_from(&[("PACKAGE_MAX_FAILURE_RATIO", "0.5")]).unwrap();
        assert_eq!(config.package_max_failure_ratio(), Some(0.5));
        assert!(config.validate().is_ok());

        let config = config_from(&[("PACKAGE_MAX_FAILURE_RATIO", "1.5")]).unwrap();
        assert!(config.validate().is_err());

        assert!(config_from(&[("PACKAGE_MAX_FAILURE_RATIO", "half")]).is_err());
    }

    #[test]
    fn test_key_prefix_is_trimmed() {
        let config = config_from(&[("PACKAGE_KEY_PREFIX", "/exports/")]).unwrap();
        assert_eq!(config.package_key_prefix(), "exports");
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let config = config_from(&[("PACKAGE_FETCH_CONCURRENCY", "0")]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_s3_url_ttl_is_capped_at_seven_days() {
        let config = config_from(&[("PACKAGE_URL_TTL_SECS", "604800")]).unwrap();
        assert!(config.validate().is_ok());

        let config = config_from(&[("PACKAGE_URL_TTL_SECS", "604801")]).unwrap();
        assert!(config.validate().is_err());

        let config = config_from(&[
            ("STORAGE_BACKEND", "local"),
            ("LOCAL_STORAGE_PATH", "/tmp/exametry"),
            ("PUBLIC_BASE_URL", "http://localhost:4000"),
            ("URL_SIGNING_SECRET", "0123456789abcdef0123456789abcdef"),
            ("PACKAGE_URL_TTL_SECS", "1209600"),
        ])
        .unwrap();
        assert!(config.validate().is_ok());
    }
}
