//! Image ingestion for product create/update

mod orchestrator;
pub mod state;

pub use orchestrator::{
    remove_product_images, IngestionOrchestrator, ProductSubmission, UploadedImage,
};
pub use state::{IllegalTransition, ImageLifecycle, ImageState};
