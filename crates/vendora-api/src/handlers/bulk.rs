use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use vendora_core::models::RowError;

use crate::auth::VendorContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::multipart::read_bulk_file;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkUploadResponse {
    pub message: String,
    /// Number of products inserted
    pub count: usize,
    pub total_rows: usize,
    pub row_errors: Vec<RowError>,
}

/// Bulk-create products from a catalog file (JSON, CSV/TSV or spreadsheet).
///
/// Rows that cannot be normalized or inserted are reported in `rowErrors`; only a file
/// that cannot be read as a catalog at all fails the request.
#[utoipa::path(
    post,
    path = "/api/v1/vendor/products/bulk",
    tag = "products",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Catalog processed", body = BulkUploadResponse),
        (status = 400, description = "Missing, unsupported or unparseable file", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(vendor_id = %vendor.vendor_id, operation = "bulk_upload"))]
pub async fn bulk_upload_products(
    State(state): State<Arc<AppState>>,
    vendor: VendorContext,
    multipart: Multipart,
) -> Result<Json<BulkUploadResponse>, HttpAppError> {
    let upload = read_bulk_file(
        multipart,
        &state.staging_dir(),
        state.config.max_bulk_file_size_bytes,
    )
    .await?;

    let report = state
        .bulk
        .ingest_file(upload.file, &upload.original_filename, vendor.vendor_id)
        .await?;

    Ok(Json(BulkUploadResponse {
        message: format!("Successfully uploaded {} products", report.inserted_count),
        count: report.inserted_count,
        total_rows: report.total_rows,
        row_errors: report.row_errors,
    }))
}
