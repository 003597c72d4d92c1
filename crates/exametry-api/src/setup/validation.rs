//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use exametry_core::Config;

/// Validate critical configuration values
///
/// Runs the checks in `Config::validate` and warns about settings that are legal
/// but likely unintended.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if !config.is_production() && config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
    }

    if config.package_fetch_concurrency() > 64 {
        tracing::warn!(
            fetch_concurrency = config.package_fetch_concurrency(),
            "PACKAGE_FETCH_CONCURRENCY is very high - the object store may throttle requests"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&config_from(&[])).is_ok());
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        let config = config_from(&[("ENVIRONMENT", "production")]);
        assert!(validate_config(&config).is_err());

        let config = config_from(&[
            ("ENVIRONMENT", "production"),
            ("CORS_ORIGINS", "https://app.example.com"),
        ]);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_local_backend_requires_secret() {
        let config = config_from(&[
            ("STORAGE_BACKEND", "local"),
            ("LOCAL_STORAGE_PATH", "/tmp/exametry"),
            ("PUBLIC_BASE_URL", "http://localhost:4000"),
            ("URL_SIGNING_SECRET", "short"),
        ]);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_s3_url_ttl_beyond_presign_limit_is_rejected() {
        let config = config_from(&[("PACKAGE_URL_TTL_SECS", "1209600")]);
        assert!(validate_config(&config).is_err());
    }
}
