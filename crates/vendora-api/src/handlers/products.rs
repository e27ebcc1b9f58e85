//! Vendor product handlers: create, list, update, delete and image management.

use std::sync::Arc;

use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use vendora_core::constants::DEFAULT_PAGE_SIZE;
use vendora_core::models::{
    IngestionWarnings, NormalizedProductDraft, Pagination, Product, ProductFilter,
    ProductImageRecord, ProductStatus, RawCatalogRow,
};
use vendora_core::AppError;
use vendora_processing::{remove_product_images, ProductSubmission, RowNormalizer};

use crate::auth::VendorContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use crate::utils::multipart::read_product_form;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductMutationResponse {
    pub message: String,
    pub product: Product,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<IngestionWarnings>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationInfo {
    pub total: u64,
    pub page: u32,
    pub pages: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductImagesResponse {
    pub message: String,
    pub images: Vec<ProductImageRecord>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListProductsQuery {
    /// draft, published, outOfStock or discontinued
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReorderImagesRequest {
    /// Permutation of the current image indices
    pub new_order: Vec<usize>,
}

fn normalize_form(vendor_id: Uuid, fields: &RawCatalogRow) -> Result<NormalizedProductDraft, AppError> {
    RowNormalizer::new(vendor_id)
        .normalize(fields)
        .map_err(|e| AppError::InvalidInput(e.reason))
}

async fn find_owned(state: &AppState, vendor_id: Uuid, id: Uuid) -> Result<Product, AppError> {
    state
        .store
        .find(vendor_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

/// Create a product from a multipart form with up to `MAX_IMAGES_PER_REQUEST` images.
///
/// Images that fail validation or compression are left out and reported under
/// `warnings`; if every submitted image fails, nothing is created.
#[utoipa::path(
    post,
    path = "/api/v1/vendor/products",
    tag = "products",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Product created", body = ProductMutationResponse),
        (status = 400, description = "Invalid fields or every image failed", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Not a vendor", body = ErrorResponse),
        (status = 413, description = "Image too large", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(vendor_id = %vendor.vendor_id, operation = "create_product"))]
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    vendor: VendorContext,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ProductMutationResponse>), HttpAppError> {
    let image_dir = state.product_image_dir();
    let form = read_product_form(
        multipart,
        &image_dir,
        state.orchestrator.max_images(),
        state.config.max_image_size_bytes(),
    )
    .await?;

    let draft = normalize_form(vendor.vendor_id, &form.fields)?;
    let result = state
        .orchestrator
        .ingest(ProductSubmission {
            images: form.images,
            alt_text: draft.name.clone(),
            order_offset: 0,
        })
        .await?;
    let warnings = result.warnings();

    let product = Product::from_draft(draft, result.succeeded);
    let attached = product.images.clone();
    let product = match state.store.create(product).await {
        Ok(product) => product,
        Err(e) => {
            remove_product_images(&image_dir, &attached).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        product_id = %product.id,
        images = product.images.len(),
        "Product created"
    );
    Ok((
        StatusCode::CREATED,
        Json(ProductMutationResponse {
            message: "Product created successfully".to_string(),
            product,
            warnings,
        }),
    ))
}

/// List the vendor's products, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/vendor/products",
    tag = "products",
    params(ListProductsQuery),
    responses(
        (status = 200, description = "Page of products", body = ProductListResponse),
        (status = 400, description = "Unknown status filter", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query), fields(vendor_id = %vendor.vendor_id, operation = "list_products"))]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    vendor: VendorContext,
    query: Result<Query<ListProductsQuery>, QueryRejection>,
) -> Result<Json<ProductListResponse>, HttpAppError> {
    let Query(query) = query?;

    let status = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(ProductStatus::parse(raw).ok_or_else(|| {
            AppError::InvalidInput(format!("Unknown product status '{}'", raw))
        })?),
        None => None,
    };
    let pagination = Pagination::new(
        query.page.unwrap_or(1),
        query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
    );

    let page = state
        .store
        .list(vendor.vendor_id, &ProductFilter { status }, pagination)
        .await?;

    Ok(Json(ProductListResponse {
        pagination: PaginationInfo {
            total: page.total,
            page: page.page,
            pages: page.pages,
        },
        products: page.products,
    }))
}

/// Replace a product's fields and append any newly uploaded images after the existing ones.
#[utoipa::path(
    put,
    path = "/api/v1/vendor/products/{id}",
    tag = "products",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Product updated", body = ProductMutationResponse),
        (status = 400, description = "Invalid fields or every image failed", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, path, multipart), fields(vendor_id = %vendor.vendor_id, operation = "update_product"))]
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    vendor: VendorContext,
    path: Result<Path<Uuid>, PathRejection>,
    multipart: Multipart,
) -> Result<Json<ProductMutationResponse>, HttpAppError> {
    let Path(id) = path?;
    let image_dir = state.product_image_dir();
    let form = read_product_form(
        multipart,
        &image_dir,
        state.orchestrator.max_images(),
        state.config.max_image_size_bytes(),
    )
    .await?;

    let mut product = find_owned(&state, vendor.vendor_id, id).await?;
    let mut draft = normalize_form(vendor.vendor_id, &form.fields)?;
    if form.fields.get("status").is_none() {
        draft.status = product.status;
    }

    let result = state
        .orchestrator
        .ingest(ProductSubmission {
            images: form.images,
            alt_text: draft.name.clone(),
            order_offset: product.images.len() as u32,
        })
        .await?;
    let warnings = result.warnings();
    let added = result.succeeded;

    product.apply_update(draft, added.clone());
    let product = match state.store.update(product).await {
        Ok(product) => product,
        Err(e) => {
            remove_product_images(&image_dir, &added).await;
            return Err(e.into());
        }
    };

    tracing::info!(product_id = %product.id, added_images = added.len(), "Product updated");
    Ok(Json(ProductMutationResponse {
        message: "Product updated successfully".to_string(),
        product,
        warnings,
    }))
}

/// Delete a product and, best effort, its image files.
#[utoipa::path(
    delete,
    path = "/api/v1/vendor/products/{id}",
    tag = "products",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, path), fields(vendor_id = %vendor.vendor_id, operation = "delete_product"))]
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    vendor: VendorContext,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<MessageResponse>, HttpAppError> {
    let Path(id) = path?;
    let product = state
        .store
        .delete(vendor.vendor_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    remove_product_images(&state.product_image_dir(), &product.images).await;

    Ok(Json(MessageResponse {
        message: "Product deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/vendor/products/{id}/images/{index}",
    tag = "products",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("index" = usize, Path, description = "Zero-based image index")
    ),
    responses(
        (status = 200, description = "Image removed", body = ProductImagesResponse),
        (status = 400, description = "Invalid image index", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, path), fields(vendor_id = %vendor.vendor_id, operation = "delete_product_image"))]
pub async fn delete_product_image(
    State(state): State<Arc<AppState>>,
    vendor: VendorContext,
    path: Result<Path<(Uuid, usize)>, PathRejection>,
) -> Result<Json<ProductImagesResponse>, HttpAppError> {
    let Path((id, index)) = path?;
    let mut product = find_owned(&state, vendor.vendor_id, id).await?;

    let removed = product
        .remove_image(index)
        .ok_or_else(|| AppError::BadRequest("Invalid image index".to_string()))?;
    let product = state.store.update(product).await?;

    remove_product_images(&state.product_image_dir(), std::slice::from_ref(&removed)).await;

    Ok(Json(ProductImagesResponse {
        message: "Image deleted successfully".to_string(),
        images: product.images,
    }))
}

#[utoipa::path(
    put,
    path = "/api/v1/vendor/products/{id}/images/reorder",
    tag = "products",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = ReorderImagesRequest,
    responses(
        (status = 200, description = "Images reordered", body = ProductImagesResponse),
        (status = 400, description = "newOrder is not a permutation of the image indices", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, path, body), fields(vendor_id = %vendor.vendor_id, operation = "reorder_product_images"))]
pub async fn reorder_product_images(
    State(state): State<Arc<AppState>>,
    vendor: VendorContext,
    path: Result<Path<Uuid>, PathRejection>,
    ValidatedJson(body): ValidatedJson<ReorderImagesRequest>,
) -> Result<Json<ProductImagesResponse>, HttpAppError> {
    let Path(id) = path?;
    let mut product = find_owned(&state, vendor.vendor_id, id).await?;

    if !product.reorder_images(&body.new_order) {
        return Err(AppError::BadRequest("Invalid image order".to_string()).into());
    }
    let product = state.store.update(product).await?;

    Ok(Json(ProductImagesResponse {
        message: "Images reordered successfully".to_string(),
        images: product.images,
    }))
}
