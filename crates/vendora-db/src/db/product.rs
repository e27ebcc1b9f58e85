use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;
use vendora_core::models::{
    Dimensions, Pagination, Product, ProductFilter, ProductImageRecord, ProductPage,
    ProductStatus, Specification,
};
use vendora_core::AppError;

use super::catalog::CatalogStore;

const PRODUCT_COLUMNS: &str = "id, vendor_id, name, description, price, category, stock, \
     dimensions, specifications, tags, status, images, created_at, updated_at";

/// Database row for the `products` table
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    vendor_id: Uuid,
    name: String,
    description: String,
    price: f64,
    category: String,
    stock: i64,
    dimensions: Json<Dimensions>,
    specifications: Json<Vec<Specification>>,
    tags: Vec<String>,
    status: String,
    images: Json<Vec<ProductImageRecord>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            vendor_id: row.vendor_id,
            name: row.name,
            description: row.description,
            price: row.price,
            category: row.category,
            stock: row.stock,
            dimensions: row.dimensions.0,
            specifications: row.specifications.0,
            tags: row.tags.into_iter().collect(),
            status: ProductStatus::parse(&row.status).unwrap_or_default(),
            images: row.images.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn tags_vec(product: &Product) -> Vec<String> {
    product.tags.iter().cloned().collect()
}

/// PostgreSQL catalog store
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    #[tracing::instrument(skip(self, product), fields(db.table = "products", db.operation = "insert", product_id = %product.id))]
    async fn create(&self, product: Product) -> Result<Product, AppError> {
        let sql = format!(
            "INSERT INTO products ({PRODUCT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<Postgres, ProductRow>(&sql)
            .bind(product.id)
            .bind(product.vendor_id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(&product.category)
            .bind(product.stock)
            .bind(Json(product.dimensions))
            .bind(Json(&product.specifications))
            .bind(tags_vec(&product))
            .bind(product.status.as_str())
            .bind(Json(&product.images))
            .bind(product.created_at)
            .bind(product.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    #[tracing::instrument(skip(self, products), fields(db.table = "products", db.operation = "insert_batch", count = products.len()))]
    async fn create_many(&self, products: Vec<Product>) -> Result<Vec<Product>, AppError> {
        if products.is_empty() {
            return Ok(products);
        }

        // A single multi-row INSERT is atomic on its own.
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("INSERT INTO products ({PRODUCT_COLUMNS}) "));
        builder.push_values(products.iter(), |mut b, product| {
            b.push_bind(product.id)
                .push_bind(product.vendor_id)
                .push_bind(product.name.clone())
                .push_bind(product.description.clone())
                .push_bind(product.price)
                .push_bind(product.category.clone())
                .push_bind(product.stock)
                .push_bind(Json(product.dimensions))
                .push_bind(Json(product.specifications.clone()))
                .push_bind(tags_vec(product))
                .push_bind(product.status.as_str())
                .push_bind(Json(product.images.clone()))
                .push_bind(product.created_at)
                .push_bind(product.updated_at);
        });

        let result = builder.build().execute(&self.pool).await?;
        tracing::debug!(rows_affected = result.rows_affected(), "Batch insert finished");

        Ok(products)
    }

    #[tracing::instrument(skip(self), fields(db.table = "products", db.operation = "select_one"))]
    async fn find(&self, vendor_id: Uuid, id: Uuid) -> Result<Option<Product>, AppError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND vendor_id = $2");
        let row = sqlx::query_as::<Postgres, ProductRow>(&sql)
            .bind(id)
            .bind(vendor_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    #[tracing::instrument(skip(self, product), fields(db.table = "products", db.operation = "update", product_id = %product.id))]
    async fn update(&self, product: Product) -> Result<Product, AppError> {
        let sql = format!(
            "UPDATE products SET name = $3, description = $4, price = $5, category = $6, \
             stock = $7, dimensions = $8, specifications = $9, tags = $10, status = $11, \
             images = $12, updated_at = $13 \
             WHERE id = $1 AND vendor_id = $2 \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<Postgres, ProductRow>(&sql)
            .bind(product.id)
            .bind(product.vendor_id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(&product.category)
            .bind(product.stock)
            .bind(Json(product.dimensions))
            .bind(Json(&product.specifications))
            .bind(tags_vec(&product))
            .bind(product.status.as_str())
            .bind(Json(&product.images))
            .bind(product.updated_at)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Product::from)
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", product.id)))
    }

    #[tracing::instrument(skip(self), fields(db.table = "products", db.operation = "delete"))]
    async fn delete(&self, vendor_id: Uuid, id: Uuid) -> Result<Option<Product>, AppError> {
        let sql = format!(
            "DELETE FROM products WHERE id = $1 AND vendor_id = $2 RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<Postgres, ProductRow>(&sql)
            .bind(id)
            .bind(vendor_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    #[tracing::instrument(skip(self, filter), fields(db.table = "products", db.operation = "select_list"))]
    async fn list(
        &self,
        vendor_id: Uuid,
        filter: &ProductFilter,
        pagination: Pagination,
    ) -> Result<ProductPage, AppError> {
        let status = filter.status.map(|s| s.as_str());

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE vendor_id = $1 AND ($2::text IS NULL OR status = $2)",
        )
        .bind(vendor_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE vendor_id = $1 AND ($2::text IS NULL OR status = $2) \
             ORDER BY created_at DESC, id \
             LIMIT $3 OFFSET $4"
        );
        let rows = sqlx::query_as::<Postgres, ProductRow>(&sql)
            .bind(vendor_id)
            .bind(status)
            .bind(i64::from(pagination.limit))
            .bind(pagination.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        let products = rows.into_iter().map(Product::from).collect();
        Ok(ProductPage::new(products, total.max(0) as u64, pagination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vendora_core::constants::PRODUCT_INSERT_BIND_COUNT;

    #[test]
    fn test_insert_binds_one_value_per_column() {
        assert_eq!(PRODUCT_COLUMNS.split(',').count(), PRODUCT_INSERT_BIND_COUNT);
    }

    #[test]
    fn test_row_conversion_restores_domain_types() {
        let now = Utc::now();
        let row = ProductRow {
            id: Uuid::new_v4(),
            vendor_id: Uuid::new_v4(),
            name: "Kettle".to_string(),
            description: "Steel kettle".to_string(),
            price: 30.0,
            category: "Kitchen".to_string(),
            stock: 2,
            dimensions: Json(Dimensions {
                length: 20.0,
                width: 15.0,
                height: 25.0,
                weight: 1.2,
            }),
            specifications: Json(vec![Specification {
                name: "Capacity".to_string(),
                value: "1.7L".to_string(),
            }]),
            tags: vec!["steel".to_string(), "kitchen".to_string(), "steel".to_string()],
            status: "outOfStock".to_string(),
            images: Json(vec![]),
            created_at: now,
            updated_at: now,
        };

        let product: Product = row.into();
        assert_eq!(product.status, ProductStatus::OutOfStock);
        assert_eq!(product.tags.len(), 2);
        assert_eq!(product.dimensions.weight, 1.2);
        assert_eq!(product.specifications[0].value, "1.7L");
    }

    #[test]
    fn test_unknown_status_falls_back_to_draft() {
        let now = Utc::now();
        let row = ProductRow {
            id: Uuid::new_v4(),
            vendor_id: Uuid::new_v4(),
            name: "Kettle".to_string(),
            description: "Steel kettle".to_string(),
            price: 30.0,
            category: "Kitchen".to_string(),
            stock: 0,
            dimensions: Json(Dimensions::default()),
            specifications: Json(vec![]),
            tags: vec![],
            status: "archived".to_string(),
            images: Json(vec![]),
            created_at: now,
            updated_at: now,
        };
        let product: Product = row.into();
        assert_eq!(product.status, ProductStatus::Draft);
    }
}
