pub mod catalog;
pub mod image;
pub mod ingestion;
pub mod product;

pub use catalog::{
    BulkIngestionReport, Dimensions, NormalizedProductDraft, RawCatalogRow, RowError,
    Specification,
};
pub use image::{ImageMetadata, ProductImageRecord};
pub use ingestion::{ImageFailure, IngestionResult, IngestionWarnings};
pub use product::{Pagination, Product, ProductFilter, ProductPage, ProductStatus};
