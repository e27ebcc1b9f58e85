//! Catalog repositories
//
// Store trait shared by every backend
pub mod catalog;
//
// PostgreSQL backend
pub mod product;
//
// In-process backend
pub mod memory;

pub use catalog::CatalogStore;
pub use memory::InMemoryCatalogStore;
pub use product::PgCatalogStore;
