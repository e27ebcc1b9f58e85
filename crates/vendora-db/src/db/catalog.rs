use async_trait::async_trait;
use uuid::Uuid;
use vendora_core::models::{Pagination, Product, ProductFilter, ProductPage};
use vendora_core::AppError;

/// Trait for catalog persistence.
///
/// Every lookup and mutation is scoped by vendor id: a product owned by another vendor
/// behaves exactly like a product that does not exist.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn create(&self, product: Product) -> Result<Product, AppError>;

    /// Insert a batch of products as one unit: either every product is stored or none is.
    async fn create_many(&self, products: Vec<Product>) -> Result<Vec<Product>, AppError>;

    async fn find(&self, vendor_id: Uuid, id: Uuid) -> Result<Option<Product>, AppError>;

    /// Persist a modified product. Fails with `NotFound` when the product does not exist
    /// for `product.vendor_id`.
    async fn update(&self, product: Product) -> Result<Product, AppError>;

    /// Remove a product, returning it so the caller can clean up its image files.
    async fn delete(&self, vendor_id: Uuid, id: Uuid) -> Result<Option<Product>, AppError>;

    /// Page through a vendor's products, newest first.
    async fn list(
        &self,
        vendor_id: Uuid,
        filter: &ProductFilter,
        pagination: Pagination,
    ) -> Result<ProductPage, AppError>;
}
