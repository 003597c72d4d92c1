//! Key generation and validation shared by all storage backends.
//!
//! Package key format: `{prefix}/{epoch_millis}_{suffix}.zip` where `suffix` is
//! nine lowercase alphanumerics. Keys are unique per call but not content-addressed.

use crate::{StorageError, StorageResult};
use rand::Rng;

const SUFFIX_LEN: usize = 9;
const SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a fresh key for a download package under `prefix`.
pub fn generate_archive_key(prefix: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{}_{}.zip", millis, random_suffix())
    } else {
        format!("{}/{}_{}.zip", prefix, millis, random_suffix())
    }
}

fn random_suffix() -> String {
    let mut rng = rand::rng();
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_CHARSET[rng.random_range(0..SUFFIX_CHARSET.len())] as char)
        .collect()
}

/// Last path segment of a key, used as the download filename.
pub fn file_name_of(storage_key: &str) -> &str {
    storage_key.rsplit('/').next().unwrap_or(storage_key)
}

/// Reject keys that are empty, absolute, or contain traversal sequences.
pub fn validate_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if storage_key.contains("..") || storage_key.starts_with('/') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_archive_key_format() {
        let key = generate_archive_key("downloads");
        assert!(key.starts_with("downloads/"));
        assert!(key.ends_with(".zip"));

        let name = file_name_of(&key).trim_end_matches(".zip");
        let (millis, suffix) = name.split_once('_').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_generate_archive_key_is_unique() {
        let a = generate_archive_key("downloads");
        let b = generate_archive_key("downloads");
        assert_ne!(a, b);
    }

    #[test]
    fn test_generate_archive_key_without_prefix() {
        let key = generate_archive_key("/");
        assert!(!key.contains('/'));
    }

    #[test]
    fn test_file_name_of() {
        assert_eq!(file_name_of("downloads/1_abc.zip"), "1_abc.zip");
        assert_eq!(file_name_of("plain.zip"), "plain.zip");
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("images/a.jpg").is_ok());
        assert!(matches!(validate_key(""), Err(StorageError::InvalidKey(_))));
        assert!(matches!(
            validate_key("../etc/passwd"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            validate_key("/etc/passwd"),
            Err(StorageError::InvalidKey(_))
        ));
    }
}
