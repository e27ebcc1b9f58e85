//! OpenAPI documentation, served at `/api/openapi.json`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use vendora_core::models;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vendora API",
        version = "0.1.0",
        description = "Vendor catalog API: product CRUD with image ingestion (validation and compression) and bulk catalog upload from JSON, CSV/TSV and spreadsheet files. Every route under /api/v1/vendor requires an HS256 bearer token with role 'vendor'."
    ),
    paths(
        handlers::products::create_product,
        handlers::products::list_products,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::products::delete_product_image,
        handlers::products::reorder_product_images,
        handlers::bulk::bulk_upload_products,
    ),
    components(
        schemas(
            models::Product,
            models::ProductStatus,
            models::ProductImageRecord,
            models::ImageMetadata,
            models::Dimensions,
            models::Specification,
            models::IngestionWarnings,
            models::ImageFailure,
            models::RowError,
            handlers::products::ProductMutationResponse,
            handlers::products::ProductListResponse,
            handlers::products::PaginationInfo,
            handlers::products::ProductImagesResponse,
            handlers::products::MessageResponse,
            handlers::products::ReorderImagesRequest,
            handlers::bulk::BulkUploadResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "products", description = "Vendor product management, image ingestion and bulk catalog upload")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_vendor_routes() {
        let spec = get_openapi_spec();
        let paths: Vec<&String> = spec.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/api/v1/vendor/products"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/v1/vendor/products/bulk"));
        assert!(paths
            .iter()
            .any(|p| p.as_str() == "/api/v1/vendor/products/{id}/images/reorder"));
    }
}
