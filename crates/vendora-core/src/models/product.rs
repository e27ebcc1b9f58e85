use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::catalog::{Dimensions, NormalizedProductDraft, Specification};
use super::image::ProductImageRecord;

/// Publication state of a product
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ProductStatus {
    #[default]
    Draft,
    Published,
    OutOfStock,
    Discontinued,
}

impl ProductStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Some(ProductStatus::Draft),
            "published" => Some(ProductStatus::Published),
            "outofstock" | "out_of_stock" | "out-of-stock" => Some(ProductStatus::OutOfStock),
            "discontinued" => Some(ProductStatus::Discontinued),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProductStatus::Draft => "draft",
            ProductStatus::Published => "published",
            ProductStatus::OutOfStock => "outOfStock",
            ProductStatus::Discontinued => "discontinued",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted catalog product, always owned by exactly one vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub stock: i64,
    pub dimensions: Dimensions,
    pub specifications: Vec<Specification>,
    pub tags: BTreeSet<String>,
    pub status: ProductStatus,
    pub images: Vec<ProductImageRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Build a new product from a normalized draft and the images that survived ingestion.
    pub fn from_draft(draft: NormalizedProductDraft, images: Vec<ProductImageRecord>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            vendor_id: draft.vendor_id,
            name: draft.name,
            description: draft.description,
            price: draft.price,
            category: draft.category,
            stock: draft.stock,
            dimensions: draft.dimensions,
            specifications: draft.specifications,
            tags: draft.tags,
            status: draft.status,
            images,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the scalar fields with those of `draft` and append `new_images` after the
    /// existing ones. Ownership never changes.
    pub fn apply_update(&mut self, draft: NormalizedProductDraft, new_images: Vec<ProductImageRecord>) {
        self.name = draft.name;
        self.description = draft.description;
        self.price = draft.price;
        self.category = draft.category;
        self.stock = draft.stock;
        self.dimensions = draft.dimensions;
        self.specifications = draft.specifications;
        self.tags = draft.tags;
        self.status = draft.status;
        self.images.extend(new_images);
        self.updated_at = Utc::now();
    }

    /// Remove the image at `index`, renumbering the remaining images' `order`.
    pub fn remove_image(&mut self, index: usize) -> Option<ProductImageRecord> {
        if index >= self.images.len() {
            return None;
        }
        let removed = self.images.remove(index);
        self.renumber_images();
        self.updated_at = Utc::now();
        Some(removed)
    }

    /// Reorder images by a permutation of their current indices.
    ///
    /// Returns `false` (and leaves the product untouched) if `new_order` is not a
    /// permutation of `0..images.len()`.
    pub fn reorder_images(&mut self, new_order: &[usize]) -> bool {
        if new_order.len() != self.images.len() {
            return false;
        }
        let mut seen = vec![false; self.images.len()];
        for &index in new_order {
            match seen.get_mut(index) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }

        let reordered = new_order.iter().map(|&i| self.images[i].clone()).collect();
        self.images = reordered;
        self.renumber_images();
        self.updated_at = Utc::now();
        true
    }

    fn renumber_images(&mut self) {
        for (position, image) in self.images.iter_mut().enumerate() {
            image.order = position as u32;
        }
    }
}

/// Filter for listing a vendor's products
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub status: Option<ProductStatus>,
}

/// 1-based page request
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, crate::constants::MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, crate::constants::DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: u64,
    pub page: u32,
    pub pages: u32,
}

impl ProductPage {
    pub fn new(products: Vec<Product>, total: u64, pagination: Pagination) -> Self {
        let pages = total.div_ceil(u64::from(pagination.limit)) as u32;
        Self {
            products,
            total,
            page: pagination.page,
            pages,
        }
    }
}
