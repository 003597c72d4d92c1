use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use exametry_core::{AppError, FormMetadata, ImageReference, PackageRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Body posted by the browser when the user asks for a download.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadPackageRequest {
    #[serde(default)]
    pub selected_images: Option<Vec<ImageReference>>,
    #[serde(default)]
    pub form_data: Option<FormMetadata>,
    /// Accepted for compatibility; only logged.
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadPackageResponse {
    /// Time-limited GET URL for the archive
    pub download_url: String,
    /// Storage key of the archive
    pub zip_key: String,
    pub message: String,
    /// Number of images requested, including unavailable ones
    pub image_count: usize,
    /// Filenames that were replaced by placeholders
    pub failed_images: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/api/v0/packages",
    tag = "packages",
    request_body = DownloadPackageRequest,
    responses(
        (status = 200, description = "Package created", body = DownloadPackageResponse),
        (status = 400, description = "No images selected or malformed body", body = ErrorResponse),
        (status = 500, description = "Package could not be stored or signed", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request),
    fields(
        image_count = request.selected_images.as_ref().map(Vec::len).unwrap_or(0),
        mode = ?request.mode,
        operation = "create_package"
    )
)]
pub async fn create_package(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<DownloadPackageRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let images = request.selected_images.ok_or_else(|| {
        AppError::InvalidInput("selectedImages is required and must be an array".to_string())
    })?;

    let outcome = state
        .assembler
        .assemble(&PackageRequest::new(images, request.form_data))
        .await?;

    let failed_images = outcome.report.failed_filenames();
    let message = if failed_images.is_empty() {
        "Download package created successfully".to_string()
    } else {
        format!(
            "Download package created; {} of {} images were unavailable",
            failed_images.len(),
            outcome.result.image_count
        )
    };

    Ok((
        StatusCode::OK,
        Json(DownloadPackageResponse {
            download_url: outcome.result.download_url,
            zip_key: outcome.result.archive_key,
            message,
            image_count: outcome.result.image_count,
            failed_images,
        }),
    ))
}

/// CORS preflight; the gateway headers middleware fills in the CORS headers.
pub async fn preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(header::CONTENT_TYPE, "application/json")],
    )
}
