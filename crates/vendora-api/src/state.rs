//! Application state shared by every handler.

use std::path::PathBuf;
use std::sync::Arc;

use vendora_core::Config;
use vendora_db::CatalogStore;
use vendora_processing::{BulkInsertCoordinator, IngestionOrchestrator};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn CatalogStore>,
    pub orchestrator: IngestionOrchestrator,
    pub bulk: BulkInsertCoordinator,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn CatalogStore>) -> Self {
        let orchestrator = IngestionOrchestrator::new(
            config.image_limits.clone(),
            config.compression.clone(),
            config.max_images_per_request,
        );
        let bulk = BulkInsertCoordinator::new(store.clone(), config.bulk_insert_chunk_size);
        Self {
            config,
            store,
            orchestrator,
            bulk,
        }
    }

    pub fn product_image_dir(&self) -> PathBuf {
        self.config.product_image_dir()
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.config.staging_dir()
    }
}
