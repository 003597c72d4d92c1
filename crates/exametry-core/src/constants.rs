//! Shared constants.

/// Bucket used when `S3_BUCKET` is not set.
pub const DEFAULT_BUCKET: &str = "exametry-images";

/// Region used when neither `S3_REGION` nor `AWS_REGION` is set.
pub const DEFAULT_REGION: &str = "eu-west-2";

/// Object key prefix for generated download packages.
pub const DEFAULT_PACKAGE_KEY_PREFIX: &str = "downloads";

/// Lifetime of a package download URL.
pub const DEFAULT_PACKAGE_URL_TTL_SECS: u64 = 3600;

/// Number of image fetches kept in flight while assembling one package.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;

/// Name of the metadata entry appended to every package that carries form data.
pub const METADATA_ENTRY_NAME: &str = "metadata.json";

pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Minimum length of the secret used to sign local download URLs.
pub const MIN_SIGNING_SECRET_LEN: usize = 32;

/// Longest lifetime S3 accepts for a presigned URL (7 days).
pub const MAX_S3_PRESIGNED_URL_TTL_SECS: u64 = 7 * 24 * 3600;
