use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;
use vendora_core::models::{Pagination, Product, ProductFilter, ProductPage};
use vendora_core::AppError;

use super::catalog::CatalogStore;

/// Catalog store kept in process memory
#[derive(Clone, Default)]
pub struct InMemoryCatalogStore {
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored products across all vendors.
    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.products.read().await.is_empty()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn create(&self, product: Product) -> Result<Product, AppError> {
        let mut products = self.products.write().await;
        if products.contains_key(&product.id) {
            return Err(AppError::Database(format!(
                "duplicate product id {}",
                product.id
            )));
        }
        products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn create_many(&self, batch: Vec<Product>) -> Result<Vec<Product>, AppError> {
        let mut products = self.products.write().await;
        if let Some(dup) = batch.iter().find(|p| products.contains_key(&p.id)) {
            return Err(AppError::Database(format!("duplicate product id {}", dup.id)));
        }
        for product in &batch {
            products.insert(product.id, product.clone());
        }
        Ok(batch)
    }

    async fn find(&self, vendor_id: Uuid, id: Uuid) -> Result<Option<Product>, AppError> {
        Ok(self
            .products
            .read()
            .await
            .get(&id)
            .filter(|p| p.vendor_id == vendor_id)
            .cloned())
    }

    async fn update(&self, product: Product) -> Result<Product, AppError> {
        let mut products = self.products.write().await;
        match products.get_mut(&product.id) {
            Some(existing) if existing.vendor_id == product.vendor_id => {
                *existing = product.clone();
                Ok(product)
            }
            _ => Err(AppError::NotFound(format!(
                "Product {} not found",
                product.id
            ))),
        }
    }

    async fn delete(&self, vendor_id: Uuid, id: Uuid) -> Result<Option<Product>, AppError> {
        let mut products = self.products.write().await;
        let owned = products
            .get(&id)
            .is_some_and(|p| p.vendor_id == vendor_id);
        Ok(if owned { products.remove(&id) } else { None })
    }

    async fn list(
        &self,
        vendor_id: Uuid,
        filter: &ProductFilter,
        pagination: Pagination,
    ) -> Result<ProductPage, AppError> {
        let products = self.products.read().await;
        let mut matching: Vec<&Product> = products
            .values()
            .filter(|p| p.vendor_id == vendor_id)
            .filter(|p| filter.status.map_or(true, |s| p.status == s))
            .collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit as usize)
            .cloned()
            .collect();

        Ok(ProductPage::new(page, total, pagination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use std::collections::BTreeSet;
    use vendora_core::models::{Dimensions, ProductStatus};

    fn product(vendor_id: Uuid, name: &str, status: ProductStatus, age_minutes: i64) -> Product {
        let created = Utc::now() - Duration::minutes(age_minutes);
        Product {
            id: Uuid::new_v4(),
            vendor_id,
            name: name.to_string(),
            description: format!("{} description", name),
            price: 10.0,
            category: "Misc".to_string(),
            stock: 1,
            dimensions: Dimensions::default(),
            specifications: vec![],
            tags: BTreeSet::new(),
            status,
            images: vec![],
            created_at: created,
            updated_at: created,
        }
    }

    #[tokio::test]
    async fn test_lookups_are_scoped_by_vendor() {
        let store = InMemoryCatalogStore::new();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let created = store
            .create(product(owner, "Mug", ProductStatus::Draft, 0))
            .await
            .unwrap();

        assert!(store.find(owner, created.id).await.unwrap().is_some());
        assert!(store.find(stranger, created.id).await.unwrap().is_none());
        assert!(store.delete(stranger, created.id).await.unwrap().is_none());

        let mut hijacked = created.clone();
        hijacked.vendor_id = stranger;
        let err = store.update(hijacked).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        assert!(store.delete(owner, created.id).await.unwrap().is_some());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_many_is_all_or_nothing() {
        let store = InMemoryCatalogStore::new();
        let vendor = Uuid::new_v4();
        let existing = store
            .create(product(vendor, "Mug", ProductStatus::Draft, 0))
            .await
            .unwrap();

        let batch = vec![product(vendor, "Plate", ProductStatus::Draft, 0), existing];
        assert!(store.create_many(batch).await.is_err());
        assert_eq!(store.len().await, 1);

        let batch = vec![
            product(vendor, "Plate", ProductStatus::Draft, 0),
            product(vendor, "Bowl", ProductStatus::Draft, 0),
        ];
        assert_eq!(store.create_many(batch).await.unwrap().len(), 2);
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn test_list_filters_and_pages_newest_first() {
        let store = InMemoryCatalogStore::new();
        let vendor = Uuid::new_v4();
        for (i, status) in [
            ProductStatus::Published,
            ProductStatus::Draft,
            ProductStatus::Published,
            ProductStatus::Published,
        ]
        .into_iter()
        .enumerate()
        {
            store
                .create(product(vendor, &format!("P{}", i), status, i as i64))
                .await
                .unwrap();
        }
        store
            .create(product(Uuid::new_v4(), "Other", ProductStatus::Published, 0))
            .await
            .unwrap();

        let filter = ProductFilter {
            status: Some(ProductStatus::Published),
        };
        let page = store
            .list(vendor, &filter, Pagination::new(1, 2))
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.pages, 2);
        let names: Vec<&str> = page.products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["P0", "P2"]);

        let second = store
            .list(vendor, &filter, Pagination::new(2, 2))
            .await
            .unwrap();
        assert_eq!(second.products.len(), 1);
        assert_eq!(second.products[0].name, "P3");
    }
}
