//! API constants

/// Versioned prefix for all JSON endpoints
pub const API_PREFIX: &str = "/api/v0";

/// Path kept for browser clients that post to the original function URL.
pub const LEGACY_PACKAGE_PATH: &str = "/download-package";

/// Path of the signed local download route.
pub const FILES_PATH: &str = "/files";

/// Where the OpenAPI document is served.
pub const OPENAPI_PATH: &str = "/api/openapi.json";
