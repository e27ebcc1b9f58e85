use std::path::Path;
use std::sync::Arc;

use tokio::sync::Semaphore;
use vendora_core::constants::PRODUCT_IMAGE_URL_PREFIX;
use vendora_core::models::{ImageFailure, IngestionResult, ProductImageRecord};
use vendora_core::{AppError, CompressionSettings, ImageLimitsConfig};

use super::state::{ImageLifecycle, ImageState};
use crate::image::{CompressedImage, ImageCompressor, ImageValidator};
use crate::staging::StagedFile;

/// One image received with a product create/update.
#[derive(Debug)]
pub struct UploadedImage {
    pub file: StagedFile,
    pub original_filename: String,
    pub declared_mime: Option<String>,
    pub size_bytes: u64,
}

/// Images submitted with one product operation, in submission order.
#[derive(Debug, Default)]
pub struct ProductSubmission {
    pub images: Vec<UploadedImage>,
    pub alt_text: String,
    /// Number of images the product already has; new images are ordered after them.
    pub order_offset: u32,
}

enum Outcome {
    Attached(CompressedImage),
    Dropped(String),
}

/// Runs validation then compression for every image in a submission.
///
/// Images are processed in parallel on the blocking pool, bounded per request by a
/// semaphore that belongs to that request alone. A failure only ever affects its own
/// image.
#[derive(Clone)]
pub struct IngestionOrchestrator {
    validator: Arc<ImageValidator>,
    compressor: Arc<ImageCompressor>,
    max_images: usize,
}

impl IngestionOrchestrator {
    pub fn new(
        limits: ImageLimitsConfig,
        compression: CompressionSettings,
        max_images: usize,
    ) -> Self {
        let max_images = max_images.max(1);
        Self {
            validator: Arc::new(ImageValidator::new(limits)),
            compressor: Arc::new(ImageCompressor::new(compression)),
            max_images,
        }
    }

    pub fn max_images(&self) -> usize {
        self.max_images
    }

    /// Permits for one submission of `images` images.
    fn request_permits(&self, images: usize) -> Arc<Semaphore> {
        Arc::new(Semaphore::new(images.clamp(1, self.max_images)))
    }

    #[tracing::instrument(skip_all, fields(images = submission.images.len(), order_offset = submission.order_offset))]
    pub async fn ingest(&self, submission: ProductSubmission) -> Result<IngestionResult, AppError> {
        let ProductSubmission {
            images,
            alt_text,
            order_offset,
        } = submission;

        if images.len() > self.max_images {
            return Err(AppError::BadRequest(format!(
                "At most {} images can be uploaded per request, got {}",
                self.max_images,
                images.len()
            )));
        }
        if images.is_empty() {
            return Ok(IngestionResult::default());
        }

        let request_permits = self.request_permits(images.len());
        let mut handles = Vec::with_capacity(images.len());
        for image in images {
            let filename = image.original_filename.clone();
            let validator = self.validator.clone();
            let compressor = self.compressor.clone();
            let permits = request_permits.clone();
            let handle = tokio::spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| format!("image processing unavailable: {}", e))?;
                tokio::task::spawn_blocking(move || process_one(&validator, &compressor, image))
                    .await
                    .map_err(|e| format!("image processing task failed: {}", e))
            });
            handles.push((filename, handle));
        }

        // Awaited in submission order so `order` never depends on completion order.
        let mut result = IngestionResult::default();
        for (filename, handle) in handles {
            let outcome = match handle.await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(reason)) => Outcome::Dropped(reason),
                Err(e) => Outcome::Dropped(format!("image processing task failed: {}", e)),
            };
            match outcome {
                Outcome::Attached(compressed) => {
                    let order = order_offset + result.succeeded.len() as u32;
                    match compressed.file_name() {
                        Some(name) => result.succeeded.push(ProductImageRecord {
                            url: format!("{}/{}", PRODUCT_IMAGE_URL_PREFIX, name),
                            alt_text: alt_text.clone(),
                            metadata: compressed.metadata,
                            order,
                        }),
                        None => result.failed.push(ImageFailure {
                            filename,
                            reason: "compressed file has no usable name".to_string(),
                        }),
                    }
                }
                Outcome::Dropped(reason) => result.failed.push(ImageFailure { filename, reason }),
            }
        }

        if result.succeeded.is_empty() {
            tracing::warn!(failed = result.failed.len(), "Every submitted image failed");
            return Err(AppError::AllImagesFailed(result.failed));
        }

        tracing::info!(
            succeeded = result.succeeded.len(),
            failed = result.failed.len(),
            "Image ingestion finished"
        );
        Ok(result)
    }
}

fn process_one(
    validator: &ImageValidator,
    compressor: &ImageCompressor,
    image: UploadedImage,
) -> Outcome {
    let UploadedImage {
        file,
        original_filename,
        declared_mime,
        size_bytes,
    } = image;
    let mut lifecycle = ImageLifecycle::new(original_filename);

    if let Err(e) = lifecycle.advance(ImageState::Validating) {
        return Outcome::Dropped(e.to_string());
    }
    let metadata = match validator.validate_file(file.path(), declared_mime.as_deref()) {
        Ok(metadata) => metadata,
        Err(rejection) => {
            let reason = rejection.to_string();
            tracing::info!(
                filename = lifecycle.filename(),
                size_bytes,
                reason = %reason,
                "Image rejected"
            );
            // `file` drops on return and the upload is deleted.
            if let Err(e) = lifecycle.advance(ImageState::Rejected(reason.clone())) {
                return Outcome::Dropped(e.to_string());
            }
            return Outcome::Dropped(reason);
        }
    };

    let advanced = lifecycle
        .advance(ImageState::Validated)
        .and_then(|_| lifecycle.advance(ImageState::Compressing));
    if let Err(e) = advanced {
        return Outcome::Dropped(e.to_string());
    }

    match compressor.compress_file(file.path(), &metadata.format) {
        Ok(compressed) => {
            // The compressor already replaced the original.
            file.keep();
            let attached = lifecycle
                .advance(ImageState::Compressed)
                .and_then(|_| lifecycle.advance(ImageState::Attached));
            match attached {
                Ok(()) => Outcome::Attached(compressed),
                Err(e) => Outcome::Dropped(e.to_string()),
            }
        }
        Err(e) => {
            let reason = format!("compression failed: {}", e);
            let original = file.keep();
            tracing::warn!(
                filename = lifecycle.filename(),
                path = %original.display(),
                error = %e,
                "Image compression failed; original kept"
            );
            match lifecycle.advance(ImageState::Failed(reason.clone())) {
                Ok(()) => Outcome::Dropped(reason),
                Err(e) => Outcome::Dropped(e.to_string()),
            }
        }
    }
}

/// Best-effort removal of stored image files, e.g. after a product is deleted or a
/// product write fails after its images were processed.
pub async fn remove_product_images(image_dir: &Path, images: &[ProductImageRecord]) {
    for record in images {
        let Some(name) = record.file_name() else {
            continue;
        };
        if name == ".." || name == "." || name.contains('\\') {
            tracing::warn!(url = %record.url, "Refusing to remove image outside the image directory");
            continue;
        }
        let path = image_dir.join(name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "Removed product image"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(error = %e, path = %path.display(), "Failed to remove product image"),
        }
    }
}
