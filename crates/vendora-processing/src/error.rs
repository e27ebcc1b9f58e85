//! Stage errors for the processing pipeline.
//!
//! Each stage reports its own error type. Per-row and per-image errors stay local and are
//! folded into `rowErrors` / warnings; only [`DispatchError`] ever aborts a whole request,
//! which is why it is the only one with a direct conversion into [`AppError`].

use std::io;

use vendora_core::models::RowError;
use vendora_core::AppError;

/// Failure to turn a bulk catalog file into rows.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Unsupported catalog file format: '{extension}'")]
    UnsupportedFormat { extension: String },

    #[error("Failed to parse {format} file: {diagnostic}")]
    Parse {
        format: &'static str,
        diagnostic: String,
    },

    #[error("I/O error reading catalog file: {0}")]
    Io(#[from] io::Error),
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::UnsupportedFormat { extension } => {
                AppError::UnsupportedFormat { extension }
            }
            DispatchError::Parse { format, diagnostic } => AppError::FormatParse {
                format: format.to_string(),
                diagnostic,
            },
            DispatchError::Io(e) => AppError::Internal(format!("Catalog file I/O error: {}", e)),
        }
    }
}

/// A row that could not be coerced into a product draft.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("row {row_index}: {reason}")]
pub struct RowNormalizationError {
    pub row_index: usize,
    pub reason: String,
}

impl From<RowNormalizationError> for RowError {
    fn from(err: RowNormalizationError) -> Self {
        RowError {
            row_index: err.row_index,
            reason: err.reason,
        }
    }
}

/// Why an uploaded image was refused by the validator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageRejection {
    #[error("image is {size} bytes, over the {max} byte limit")]
    Oversized { size: u64, max: u64 },

    #[error("unsupported image format '{format}'")]
    UnsupportedFormat { format: String },

    #[error(
        "image is {width}x{height}, allowed range is {min_width}x{min_height} to {max_width}x{max_height}"
    )]
    DimensionsOutOfRange {
        width: u32,
        height: u32,
        min_width: u32,
        min_height: u32,
        max_width: u32,
        max_height: u32,
    },

    #[error("unreadable image: {0}")]
    Unreadable(String),
}

/// Failure while re-encoding an accepted image. The original file is left in place.
#[derive(Debug, thiserror::Error)]
pub enum CompressionError {
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to encode {format}: {message}")]
    Encode { format: &'static str, message: String },

    #[error("unsupported output format '{0}'")]
    UnsupportedFormat(String),

    #[error("I/O error during compression: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use vendora_core::ErrorMetadata;

    #[test]
    fn test_dispatch_errors_map_to_client_errors() {
        let err: AppError = DispatchError::UnsupportedFormat {
            extension: "pdf".to_string(),
        }
        .into();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");

        let err: AppError = DispatchError::Parse {
            format: "json",
            diagnostic: "expected value at line 1 column 1".to_string(),
        }
        .into();
        assert_eq!(err.http_status_code(), 400);
        assert!(err.client_message().contains("expected value"));

        let err: AppError = DispatchError::Io(io::Error::other("disk")).into();
        assert_eq!(err.http_status_code(), 500);
    }

    #[test]
    fn test_row_error_conversion() {
        let row: RowError = RowNormalizationError {
            row_index: 3,
            reason: "price is required".to_string(),
        }
        .into();
        assert_eq!(row.row_index, 3);
        assert_eq!(row.reason, "price is required");
    }
}
