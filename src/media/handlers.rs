use actix_web::{web, HttpResponse};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::error::AppError;
use crate::media::{upload_batch, ImageUpload};
use crate::AppState;

pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;
pub const MAX_BATCH_FILES: usize = 10;

const fn base64_len(bytes: usize) -> usize {
    (bytes + 2) / 3 * 4
}

/// JSON limit for the upload routes: a full batch of maximum-size files,
/// plus room for data URI prefixes, filenames and field names.
pub const UPLOAD_BODY_LIMIT: usize = MAX_BATCH_FILES * base64_len(MAX_FILE_BYTES) + 64 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct UploadRequest {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    /// Base64 bytes, optionally as a `data:<type>;base64,` URI.
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchUploadRequest {
    #[serde(default)]
    pub files: Vec<UploadRequest>,
}

fn sniff_image_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF8") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else if bytes.starts_with(b"BM") {
        Some("image/bmp")
    } else if bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*") {
        Some("image/tiff")
    } else {
        None
    }
}

/// Decode and check one file from a request body.
pub fn decode_upload(req: UploadRequest) -> Result<ImageUpload, AppError> {
    let raw = req.data.trim();
    let (uri_type, encoded) = match raw.strip_prefix("data:") {
        Some(rest) => {
            let (meta, payload) = rest
                .split_once(',')
                .ok_or_else(|| AppError::validation("Malformed data URI"))?;
            let mime = meta.strip_suffix(";base64").unwrap_or(meta);
            (Some(mime.to_string()), payload)
        }
        None => (None, raw),
    };

    if encoded.is_empty() {
        return Err(AppError::validation("File data is required"));
    }
    let data = BASE64
        .decode(encoded)
        .map_err(|_| AppError::validation("File data must be base64 encoded"))?;
    if data.len() > MAX_FILE_BYTES {
        return Err(AppError::validation("File exceeds the 10 MB limit"));
    }

    // The stored type comes from the bytes; a declared type must still be an image
    let declared = req
        .content_type
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .or(uri_type);
    if declared.as_deref().map_or(false, |t| !t.starts_with("image/")) {
        return Err(AppError::validation("Only image uploads are supported"));
    }
    let content_type = sniff_image_type(&data)
        .ok_or_else(|| AppError::validation("Only image uploads are supported"))?;
    if let Some(declared) = declared.filter(|t| t != content_type) {
        warn!("Declared type {} overridden by file contents ({})", declared, content_type);
    }

    Ok(ImageUpload {
        filename: req.filename,
        content_type: content_type.to_string(),
        data,
    })
}

/// POST /api/upload
pub async fn upload_image(
    req: web::Json<UploadRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let image = decode_upload(req.into_inner())?;
    let uploaded = state.media.upload(image).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "url": uploaded.url,
        "public_id": uploaded.public_id,
    })))
}

/// POST /api/upload/batch
pub async fn upload_images(
    req: web::Json<BatchUploadRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let files = req.into_inner().files;
    if files.is_empty() {
        return Err(AppError::validation("At least one file is required"));
    }
    if files.len() > MAX_BATCH_FILES {
        return Err(AppError::validation(format!(
            "At most {} files can be uploaded at once",
            MAX_BATCH_FILES
        )));
    }

    let images = files
        .into_iter()
        .map(decode_upload)
        .collect::<Result<Vec<_>, _>>()?;

    info!("Uploading batch of {} images", images.len());
    let batch = upload_batch(state.media.as_ref(), images).await;

    if !batch.is_complete() {
        warn!("Batch upload incomplete: {} failed", batch.failed_count());
        return Ok(HttpResponse::InternalServerError().json(json!({
            "success": false,
            "error": "One or more uploads failed",
            "results": batch.results,
        })));
    }

    let results = batch.results.clone();
    let urls = batch.into_urls()?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "urls": urls,
        "results": results,
    })))
}

/// DELETE /api/upload/{public_id}
pub async fn delete_image(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let public_id = path.into_inner();
    if public_id.trim().is_empty() {
        return Err(AppError::validation("public_id is required"));
    }

    state.media.delete(&public_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
