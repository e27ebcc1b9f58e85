//! Vendora processing library
//!
//! Everything that turns uploaded bytes into catalog data:
//! - image validation, metadata extraction and compression ([`image`])
//! - bulk catalog parsing, row normalization and chunked inserts ([`catalog`])
//! - per-request image ingestion with failure isolation ([`ingestion`])
//! - scoped ownership of temporary upload files ([`staging`])

pub mod catalog;
pub mod error;
pub mod image;
pub mod ingestion;
pub mod staging;

pub use catalog::{
    BulkInsertCoordinator, CatalogFormat, FormatDispatcher, NormalizedCatalog, ParsedCatalog,
    RowNormalizer,
};
pub use error::{CompressionError, DispatchError, ImageRejection, RowNormalizationError};
pub use crate::image::{CompressedImage, ImageCompressor, ImageValidator, OutputFormat};
pub use ingestion::{remove_product_images, IngestionOrchestrator, ProductSubmission, UploadedImage};
pub use staging::StagedFile;
