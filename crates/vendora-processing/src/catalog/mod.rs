//! Bulk catalog ingestion: file → rows → drafts → chunked inserts.

pub mod bulk;
pub mod format;
pub mod normalizer;

pub use bulk::BulkInsertCoordinator;
pub use format::{CatalogFormat, FormatDispatcher, ParsedCatalog};
pub use normalizer::{IndexedDraft, NormalizedCatalog, RowNormalizer};
