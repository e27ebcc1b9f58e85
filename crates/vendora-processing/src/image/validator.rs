//! Image validation against configured limits
//!
//! Checks run in a fixed order (size, format, dimensions) and the first failing check
//! decides the rejection reason. Everything is read from the file content; the
//! client-declared content type is only compared for logging.

use std::fs;
use std::path::Path;

use vendora_core::models::ImageMetadata;
use vendora_core::ImageLimitsConfig;

use super::metadata::{detect_format, format_name, read_metadata};
use crate::error::ImageRejection;

#[derive(Debug, Clone)]
pub struct ImageValidator {
    limits: ImageLimitsConfig,
}

impl ImageValidator {
    pub fn new(limits: ImageLimitsConfig) -> Self {
        Self { limits }
    }

    /// Validate an image on disk. Blocking; call from `spawn_blocking`.
    pub fn validate_file(
        &self,
        path: &Path,
        declared_mime: Option<&str>,
    ) -> Result<ImageMetadata, ImageRejection> {
        let size = fs::metadata(path)
            .map_err(|e| ImageRejection::Unreadable(e.to_string()))?
            .len();
        self.check_size(size)?;

        let data = fs::read(path).map_err(|e| ImageRejection::Unreadable(e.to_string()))?;
        self.validate_bytes(&data, declared_mime)
    }

    pub fn validate_bytes(
        &self,
        data: &[u8],
        declared_mime: Option<&str>,
    ) -> Result<ImageMetadata, ImageRejection> {
        self.check_size(data.len() as u64)?;

        if data.is_empty() {
            return Err(ImageRejection::Unreadable("file is empty".to_string()));
        }

        let format = detect_format(data)
            .map(format_name)
            .ok_or_else(|| ImageRejection::Unreadable("not a recognized image".to_string()))?;
        if !self.limits.allowed_formats.iter().any(|f| f == &format) {
            return Err(ImageRejection::UnsupportedFormat { format });
        }

        if let Some(declared) = declared_mime {
            if !mime_matches(declared, &format) {
                tracing::warn!(
                    declared_mime = declared,
                    detected_format = %format,
                    "Declared content type does not match image content"
                );
            }
        }

        let metadata = read_metadata(data).map_err(|e| ImageRejection::Unreadable(e.to_string()))?;
        self.check_dimensions(metadata.width, metadata.height)?;

        Ok(metadata)
    }

    fn check_size(&self, size: u64) -> Result<(), ImageRejection> {
        if size > self.limits.max_size_bytes {
            return Err(ImageRejection::Oversized {
                size,
                max: self.limits.max_size_bytes,
            });
        }
        Ok(())
    }

    fn check_dimensions(&self, width: u32, height: u32) -> Result<(), ImageRejection> {
        let l = &self.limits;
        let width_ok = (l.min_width..=l.max_width).contains(&width);
        let height_ok = (l.min_height..=l.max_height).contains(&height);
        if width_ok && height_ok {
            Ok(())
        } else {
            Err(ImageRejection::DimensionsOutOfRange {
                width,
                height,
                min_width: l.min_width,
                min_height: l.min_height,
                max_width: l.max_width,
                max_height: l.max_height,
            })
        }
    }
}

fn mime_matches(declared: &str, format: &str) -> bool {
    let declared = declared.trim().to_ascii_lowercase();
    match declared.strip_prefix("image/") {
        Some("jpg") | Some("pjpeg") => format == "jpeg",
        Some(subtype) => subtype == format,
        None => false,
    }
}
