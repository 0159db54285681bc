//! `POST /api/upload`: multipart image upload to object storage.
//!
//! Parts named `files` are stored one by one. A part that cannot be stored
//! (not an image, empty, rejected by storage) becomes a warning in the
//! response; an oversized part aborts the request.

use axum::{
    extract::{multipart::Field, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{info, warn};

use crate::config::UploadConfig;
use crate::models::{AppState, UploadResponse};
use crate::storage::{generate_key, public_url, sanitize_filename};
use crate::types::{AppError, AppResult};

pub const MAX_FILES_PER_REQUEST: usize = 10;
const FILES_FIELD: &str = "files";
const ALLOWED_SUBTYPES: &[&str] = &["jpeg", "jpg", "png", "gif", "webp"];
const MULTIPART_OVERHEAD: usize = 64 * 1024;
const OCTET_STREAM: &str = "application/octet-stream";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/upload", post(upload_images))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(request_body_limit(&state.config.upload)))
        .with_state(state)
}

/// Whole-request cap: every file at its limit plus multipart framing.
fn request_body_limit(config: &UploadConfig) -> usize {
    config
        .max_file_bytes
        .saturating_mul(MAX_FILES_PER_REQUEST)
        .saturating_add(MULTIPART_OVERHEAD)
}

/// Object key and content type for one accepted part.
#[derive(Debug, PartialEq, Eq)]
pub struct PreparedUpload {
    pub key: String,
    pub content_type: String,
}

fn image_subtype_allowed(content_type: &str) -> bool {
    content_type
        .parse::<mime::Mime>()
        .map(|m| m.type_() == mime::IMAGE && ALLOWED_SUBTYPES.contains(&m.subtype().as_str()))
        .unwrap_or(false)
}

/// Decide the key and content type for a part, or say why it is skipped.
pub fn prepare_upload(
    file_name: &str,
    declared_type: Option<&str>,
    size: usize,
    config: &UploadConfig,
) -> Result<PreparedUpload, String> {
    if file_name.trim().is_empty() {
        return Err("Skipped a file without a name".to_string());
    }
    if size == 0 {
        return Err(format!("Skipped {}: file is empty", file_name));
    }

    // Declared type first, then the filename guess; octet-stream says nothing.
    let guessed = mime_guess::from_path(file_name).first_raw();
    let content_type = [declared_type.filter(|ct| *ct != OCTET_STREAM), guessed]
        .into_iter()
        .flatten()
        .find(|ct| image_subtype_allowed(ct))
        .ok_or_else(|| {
            format!("Skipped {}: only jpeg, png, gif and webp images are allowed", file_name)
        })?;

    let key = if config.key_from_filename {
        sanitize_filename(file_name.trim())
    } else {
        generate_key(
            &config.key_prefix,
            file_name.trim(),
            chrono::Utc::now().timestamp_millis(),
            &mut rand::thread_rng(),
        )
    };

    Ok(PreparedUpload {
        key,
        content_type: content_type.to_string(),
    })
}

async fn read_limited(mut field: Field<'_>, limit: usize, name: &str) -> AppResult<Vec<u8>> {
    let mut data = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("Failed to read {}: {}", name, e)))?
    {
        if data.len() + chunk.len() > limit {
            return Err(AppError::PayloadTooLarge(format!(
                "{} exceeds the {} byte limit per file",
                name, limit
            )));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

async fn upload_images(State(state): State<AppState>, mut multipart: Multipart) -> AppResult<Response> {
    let config = &state.config.upload;
    let mut received = 0usize;
    let mut urls = Vec::new();
    let mut keys = Vec::new();
    let mut warnings = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        received += 1;
        if received > MAX_FILES_PER_REQUEST {
            return Err(AppError::InvalidRequest(format!(
                "Too many files, at most {} per request",
                MAX_FILES_PER_REQUEST
            )));
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let declared_type = field.content_type().map(str::to_string);
        let data = read_limited(field, config.max_file_bytes, &file_name).await?;

        let prepared = match prepare_upload(&file_name, declared_type.as_deref(), data.len(), config) {
            Ok(prepared) => prepared,
            Err(reason) => {
                warn!(file = %file_name, "{}", reason);
                warnings.push(reason);
                continue;
            }
        };

        match state
            .storage
            .put(&prepared.key, &data, &prepared.content_type)
            .await
        {
            Ok(()) => {
                info!(key = %prepared.key, bytes = data.len(), "Uploaded image");
                urls.push(public_url(&state.config.storage.public_base_url, &prepared.key));
                keys.push(prepared.key);
            }
            Err(e) => {
                warn!(key = %prepared.key, error = %e, "Image upload failed");
                warnings.push(format!("Failed to upload {}", prepared.key));
            }
        }
    }

    if received == 0 {
        return Err(AppError::InvalidRequest(
            "No files found in the request".to_string(),
        ));
    }
    if keys.is_empty() {
        return Ok((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "success": false,
                "error": "None of the files could be uploaded",
                "warnings": warnings,
            })),
        )
            .into_response());
    }

    let message = format!("Uploaded {} of {} files", keys.len(), received);
    Ok(Json(UploadResponse {
        success: true,
        urls,
        r2_keys: keys,
        message,
        warnings,
    })
    .into_response())
}
