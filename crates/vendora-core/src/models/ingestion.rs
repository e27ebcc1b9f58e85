use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::image::ProductImageRecord;

/// One image that did not make it through validation or compression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImageFailure {
    pub filename: String,
    pub reason: String,
}

/// Merged outcome of processing every image submitted with one product create/update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IngestionResult {
    pub succeeded: Vec<ProductImageRecord>,
    pub failed: Vec<ImageFailure>,
}

impl IngestionResult {
    pub fn submitted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Warnings block for the create/update response, present only when something failed.
    pub fn warnings(&self) -> Option<IngestionWarnings> {
        if self.failed.is_empty() {
            return None;
        }
        Some(IngestionWarnings {
            message: format!(
                "{} of {} image(s) could not be processed",
                self.failed.len(),
                self.submitted()
            ),
            errors: self.failed.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IngestionWarnings {
    pub message: String,
    pub errors: Vec<ImageFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_warnings_when_everything_succeeded() {
        assert!(IngestionResult::default().warnings().is_none());
    }

    #[test]
    fn test_warnings_name_failed_images() {
        let result = IngestionResult {
            succeeded: vec![],
            failed: vec![ImageFailure {
                filename: "scan.bmp".to_string(),
                reason: "unsupported image format 'bmp'".to_string(),
            }],
        };
        let warnings = result.warnings().unwrap();
        assert_eq!(warnings.message, "1 of 1 image(s) could not be processed");
        assert_eq!(warnings.errors[0].filename, "scan.bmp");
    }
}
