//! Signed download route for the local storage backend.
//!
//! Local download URLs point here (`/files?token=...`); the token proves which
//! archive may be fetched and until when.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::Response,
};
use exametry_core::constants::ZIP_CONTENT_TYPE;
use exametry_core::AppError;
use exametry_storage::keys::file_name_of;
use exametry_storage::{signing, StorageError};
use futures::StreamExt;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct FileQuery {
    #[serde(default)]
    pub token: String,
}

/// Stream an archive by signed token. No other authorization is required.
#[tracing::instrument(skip(state, query), fields(operation = "get_signed_file"))]
pub async fn get_signed_file(
    Query(query): Query<FileQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, HttpAppError> {
    let secret = state
        .file_signing_secret
        .as_deref()
        .ok_or_else(|| AppError::NotFound("Signed downloads are not served here".to_string()))?;

    let token = query.token.trim();
    if token.is_empty() {
        return Err(AppError::Forbidden("Missing download token".to_string()).into());
    }

    let storage_key = signing::verify(token, secret).map_err(|e| {
        tracing::debug!(error = %e, "Rejected download token");
        AppError::Forbidden(e.to_string())
    })?;

    let stream = state
        .storage
        .download_stream(&storage_key)
        .await
        .map_err(|e| match e {
            StorageError::NotFound(_) => {
                AppError::NotFound("Download package no longer exists".to_string())
            }
            other => {
                tracing::error!(error = %other, storage_key = %storage_key, "Failed to open download package");
                AppError::Storage(other.to_string())
            }
        })?;

    let body_stream = stream.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    let content_type = if storage_key.ends_with(".zip") {
        ZIP_CONTENT_TYPE
    } else {
        "application/octet-stream"
    };

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name_of(&storage_key)),
        )
        .header(header::CACHE_CONTROL, "private, no-store")
        .body(Body::from_stream(body_stream))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build response");
            HttpAppError::from(AppError::Internal(e.to_string()))
        })?;

    Ok(response)
}
