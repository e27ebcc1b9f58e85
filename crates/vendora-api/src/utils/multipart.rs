//! Multipart extraction for product forms and bulk catalog uploads.
//!
//! Uploaded parts are streamed to disk under a [`StagedFile`] guard as soon as they are
//! read, so an early return anywhere below deletes whatever was already written.

use std::path::Path;

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use serde_json::{Map, Value};
use vendora_core::constants::{BULK_FILE_FIELD, IMAGES_FIELD};
use vendora_core::models::RawCatalogRow;
use vendora_core::AppError;
use vendora_processing::staging::unique_file_name;
use vendora_processing::{StagedFile, UploadedImage};

/// Text fields and images of one product create/update form.
#[derive(Debug)]
pub struct ProductForm {
    pub fields: RawCatalogRow,
    pub images: Vec<UploadedImage>,
}

/// A bulk catalog file written to the staging directory.
#[derive(Debug)]
pub struct BulkUpload {
    pub file: StagedFile,
    pub original_filename: String,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(format!("Failed to read multipart: {}", e.body_text()))
    }
}

/// Read a field into memory, failing as soon as it grows past `max_bytes`.
async fn read_limited(mut field: Field<'_>, max_bytes: usize, filename: &str) -> Result<Vec<u8>, AppError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if data.len() + chunk.len() > max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "'{}' exceeds the maximum allowed size of {} MB",
                filename,
                max_bytes / 1024 / 1024
            )));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

pub async fn read_product_form(
    mut multipart: Multipart,
    image_dir: &Path,
    max_images: usize,
    max_image_bytes: usize,
) -> Result<ProductForm, AppError> {
    let mut fields = Map::new();
    let mut images: Vec<UploadedImage> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string).unwrap_or_default();

        if name == IMAGES_FIELD {
            if images.len() == max_images {
                return Err(AppError::BadRequest(format!(
                    "At most {} images can be uploaded per request",
                    max_images
                )));
            }
            let original_filename = field
                .file_name()
                .map(str::to_string)
                .unwrap_or_else(|| "unknown".to_string());
            let declared_mime = field.content_type().map(str::to_string);
            let data = read_limited(field, max_image_bytes, &original_filename).await?;

            let path = image_dir.join(unique_file_name(&original_filename));
            let file = StagedFile::write(path, &data).await?;
            images.push(UploadedImage {
                file,
                original_filename,
                declared_mime,
                size_bytes: data.len() as u64,
            });
            continue;
        }

        if name.is_empty() {
            continue;
        }
        let text = field.text().await.map_err(multipart_error)?;
        fields.insert(name, Value::String(text));
    }

    tracing::debug!(
        fields = fields.len(),
        images = images.len(),
        "Product form received"
    );
    Ok(ProductForm {
        fields: RawCatalogRow::new(0, fields),
        images,
    })
}

/// Read the single bulk catalog file; other fields are ignored.
pub async fn read_bulk_file(
    mut multipart: Multipart,
    staging_dir: &Path,
    max_bytes: usize,
) -> Result<BulkUpload, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(BULK_FILE_FIELD) {
            continue;
        }
        let original_filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest("Bulk file has no filename".to_string()))?;
        let data = read_limited(field, max_bytes, &original_filename).await?;

        let path = staging_dir.join(unique_file_name(&original_filename));
        let file = StagedFile::write(path, &data).await?;
        return Ok(BulkUpload {
            file,
            original_filename,
        });
    }

    Err(AppError::BadRequest("No file uploaded".to_string()))
}
