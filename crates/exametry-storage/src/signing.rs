//! Signed, expiring download tokens for backends without native presigning.
//!
//! Payload: expiry_ts (u64 BE) || storage_key (UTF-8).
//! Token = base64url(payload || HMAC-SHA256(secret, payload)).
//!
//! A token grants GET access to exactly one key until its expiry.

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

const EXPIRY_LEN: usize = 8;
const MAC_LEN: usize = 32; // SHA256

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignedUrlError {
    #[error("Malformed download token")]
    Malformed,

    #[error("Download token signature mismatch")]
    BadSignature,

    #[error("Download link has expired")]
    Expired,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn mac_for(secret: &[u8]) -> Hmac<Sha256> {
    Hmac::<Sha256>::new_from_slice(secret).expect("HMAC accepts any key size")
}

/// Build a token for `storage_key` that expires at the unix time `expires_at`.
pub fn sign(storage_key: &str, expires_at: u64, secret: &[u8]) -> String {
    let mut payload = Vec::with_capacity(EXPIRY_LEN + storage_key.len() + MAC_LEN);
    payload.extend_from_slice(&expires_at.to_be_bytes());
    payload.extend_from_slice(storage_key.as_bytes());

    let mut mac = mac_for(secret);
    mac.update(&payload);
    let tag = mac.finalize().into_bytes();
    payload.extend_from_slice(&tag);

    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(payload)
}

/// Build a token for `storage_key` valid for `expires_in` from now.
pub fn create(storage_key: &str, expires_in: Duration, secret: &[u8]) -> String {
    sign(
        storage_key,
        now_secs().saturating_add(expires_in.as_secs()),
        secret,
    )
}

/// Verify a token against the current time and return the key it grants.
pub fn verify(token: &str, secret: &[u8]) -> Result<String, SignedUrlError> {
    verify_at(token, secret, now_secs())
}

/// Verify a token as of the unix time `now`.
pub fn verify_at(token: &str, secret: &[u8], now: u64) -> Result<String, SignedUrlError> {
    let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(token.trim())
        .map_err(|_| SignedUrlError::Malformed)?;
    if decoded.len() <= EXPIRY_LEN + MAC_LEN {
        return Err(SignedUrlError::Malformed);
    }

    let (payload, tag) = decoded.split_at(decoded.len() - MAC_LEN);
    let mut mac = mac_for(secret);
    mac.update(payload);
    mac.verify_slice(tag)
        .map_err(|_| SignedUrlError::BadSignature)?;

    let (expiry_bytes, key_bytes) = payload.split_at(EXPIRY_LEN);
    let mut expiry = [0u8; EXPIRY_LEN];
    expiry.copy_from_slice(expiry_bytes);
    if now > u64::from_be_bytes(expiry) {
        return Err(SignedUrlError::Expired);
    }

    String::from_utf8(key_bytes.to_vec()).map_err(|_| SignedUrlError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    #[test]
    fn test_token_grants_its_key_until_expiry() {
        let issued_at = 1_700_000_000;
        let token = sign("downloads/1_abc.zip", issued_at + 3600, SECRET);

        assert_eq!(
            verify_at(&token, SECRET, issued_at).unwrap(),
            "downloads/1_abc.zip"
        );
        assert_eq!(
            verify_at(&token, SECRET, issued_at + 3600).unwrap(),
            "downloads/1_abc.zip"
        );
        assert_eq!(
            verify_at(&token, SECRET, issued_at + 3601),
            Err(SignedUrlError::Expired)
        );
    }

    #[test]
    fn test_create_is_valid_now() {
        let token = create("downloads/x.zip", Duration::from_secs(60), SECRET);
        assert_eq!(verify(&token, SECRET).unwrap(), "downloads/x.zip");
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = sign("downloads/x.zip", u64::MAX, SECRET);
        assert_eq!(
            verify_at(&token, b"another-secret-another-secret-xx", 0),
            Err(SignedUrlError::BadSignature)
        );
    }

    #[test]
    fn test_tampered_key_is_rejected() {
        let token = sign("downloads/x.zip", u64::MAX, SECRET);
        let mut raw = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(&token)
            .unwrap();
        raw[EXPIRY_LEN] = b'X';
        let tampered = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(raw);
        assert_eq!(
            verify_at(&tampered, SECRET, 0),
            Err(SignedUrlError::BadSignature)
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert_eq!(
            verify_at("not base64 !!", SECRET, 0),
            Err(SignedUrlError::Malformed)
        );
        assert_eq!(verify_at("AAAA", SECRET, 0), Err(SignedUrlError::Malformed));
    }
}
