//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use exametry_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Exametry Download Packager API",
        version = "0.1.0",
        description = "Bundles selected inspection images and project metadata into a zip archive and returns a time-limited download URL. Endpoints are versioned under /api/v0/."
    ),
    paths(handlers::package::create_package),
    components(schemas(
        handlers::package::DownloadPackageRequest,
        handlers::package::DownloadPackageResponse,
        models::ImageReference,
        models::FormMetadata,
        error::ErrorResponse,
    )),
    tags(
        (name = "packages", description = "Download package creation")
    )
)]
pub struct ApiDoc;
