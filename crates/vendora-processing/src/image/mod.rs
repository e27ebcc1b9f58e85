//! Image processing module
//!
//! - content-based metadata extraction (metadata)
//! - limit checks with typed rejection reasons (validator)
//! - resize and re-encode of accepted images (compressor)

pub mod compressor;
pub mod metadata;
pub mod validator;

pub use compressor::{CompressedImage, ImageCompressor, OutputFormat};
pub use validator::ImageValidator;
