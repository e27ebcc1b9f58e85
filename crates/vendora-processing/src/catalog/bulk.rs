//! Bulk insert coordination
//!
//! Drafts are inserted in fixed-size chunks. A chunk the store rejects does not roll back
//! earlier chunks and does not stop later ones; its rows are reported as row errors, so
//! `inserted_count + row_errors.len() == total_rows` on every path.

use std::sync::Arc;

use uuid::Uuid;
use vendora_core::models::{BulkIngestionReport, Product, RowError};
use vendora_db::CatalogStore;

use super::format::{FormatDispatcher, ParsedCatalog};
use super::normalizer::{NormalizedCatalog, RowNormalizer};
use crate::error::DispatchError;
use crate::staging::StagedFile;

#[derive(Clone)]
pub struct BulkInsertCoordinator {
    store: Arc<dyn CatalogStore>,
    chunk_size: usize,
}

impl BulkInsertCoordinator {
    pub fn new(store: Arc<dyn CatalogStore>, chunk_size: usize) -> Self {
        Self {
            store,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Parse, normalize and insert one staged bulk file for `vendor_id`.
    ///
    /// Fails only when the file as a whole cannot be read as a catalog.
    #[tracing::instrument(skip_all, fields(vendor_id = %vendor_id, filename = %original_filename))]
    pub async fn ingest_file(
        &self,
        file: StagedFile,
        original_filename: &str,
        vendor_id: Uuid,
    ) -> Result<BulkIngestionReport, DispatchError> {
        let ParsedCatalog { format, rows } =
            FormatDispatcher::dispatch(file, original_filename).await?;
        tracing::info!(format = format.name(), rows = rows.len(), "Catalog file parsed");

        let catalog = RowNormalizer::new(vendor_id).normalize_all(&rows);
        Ok(self.insert(catalog).await)
    }

    /// Insert every normalized draft, chunk by chunk.
    pub async fn insert(&self, catalog: NormalizedCatalog) -> BulkIngestionReport {
        let NormalizedCatalog {
            drafts,
            mut row_errors,
            total_rows,
        } = catalog;

        let mut inserted_count = 0;
        let mut pending = drafts.into_iter().peekable();
        while pending.peek().is_some() {
            let chunk: Vec<_> = pending.by_ref().take(self.chunk_size).collect();
            let row_indexes: Vec<usize> = chunk.iter().map(|d| d.row_index).collect();
            let products: Vec<Product> = chunk
                .into_iter()
                .map(|indexed| Product::from_draft(indexed.draft, Vec::new()))
                .collect();

            match self.store.create_many(products).await {
                Ok(stored) => inserted_count += stored.len(),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        rows = row_indexes.len(),
                        first_row = ?row_indexes.first(),
                        "Bulk insert chunk rejected"
                    );
                    let reason = format!("insert failed: {}", e);
                    row_errors.extend(row_indexes.into_iter().map(|row_index| RowError {
                        row_index,
                        reason: reason.clone(),
                    }));
                }
            }
        }

        row_errors.sort_by_key(|e| e.row_index);
        let report = BulkIngestionReport {
            inserted_count,
            total_rows,
            row_errors,
        };
        debug_assert!(report.is_consistent());

        tracing::info!(
            inserted = report.inserted_count,
            total = report.total_rows,
            errors = report.row_errors.len(),
            "Bulk insert finished"
        );
        report
    }
}
