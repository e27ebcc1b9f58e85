use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tempfile::NamedTempFile;
use vendora_core::constants::COMPRESSED_SUFFIX;
use vendora_core::models::ImageMetadata;
use vendora_core::CompressionSettings;

use crate::error::CompressionError;

/// Output format for compressed images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, CompressionError> {
        match s.trim().to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::WebP),
            other => Err(CompressionError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
        }
    }

    fn accepts_extension(self, ext: &str) -> bool {
        match self {
            OutputFormat::Jpeg => ext == "jpg" || ext == "jpeg",
            other => ext == other.extension(),
        }
    }
}

/// Result of compressing one image
#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub path: PathBuf,
    pub metadata: ImageMetadata,
}

impl CompressedImage {
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

/// Resizes and re-encodes validated images.
///
/// The compressed file replaces the original: on success the source file is removed, on
/// failure it is left exactly as it was.
#[derive(Debug, Clone)]
pub struct ImageCompressor {
    settings: CompressionSettings,
}

impl ImageCompressor {
    pub fn new(settings: CompressionSettings) -> Self {
        Self { settings }
    }

    /// Output format for a source image in `source_format`.
    pub fn target_format(&self, source_format: &str) -> Result<OutputFormat, CompressionError> {
        OutputFormat::parse(self.settings.format.as_deref().unwrap_or(source_format))
    }

    /// `<dir>/<base>-compressed.<ext>`; the source extension is kept when it already names
    /// the output format.
    pub fn compressed_path(source: &Path, format: OutputFormat) -> PathBuf {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image");
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .filter(|e| format.accepts_extension(e))
            .unwrap_or_else(|| format.extension().to_string());
        source.with_file_name(format!("{}{}.{}", stem, COMPRESSED_SUFFIX, ext))
    }

    /// Compress the image at `source` (already validated as `source_format`).
    ///
    /// Blocking; call from `spawn_blocking`.
    pub fn compress_file(
        &self,
        source: &Path,
        source_format: &str,
    ) -> Result<CompressedImage, CompressionError> {
        let format = self.target_format(source_format)?;
        let data = fs::read(source)?;
        let img = image::load_from_memory(&data)
            .map_err(|e| CompressionError::Decode(e.to_string()))?;
        let img = fit_within(img, self.settings.max_width, self.settings.max_height);
        let encoded = encode(&img, format, self.settings.quality)?;

        let destination = Self::compressed_path(source, format);
        let dir = source.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&encoded)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&destination).map_err(|e| e.error)?;

        if let Err(e) = fs::remove_file(source) {
            tracing::warn!(
                error = %e,
                path = %source.display(),
                "Failed to remove original after compression"
            );
        }

        let (width, height) = img.dimensions();
        tracing::debug!(
            source = %source.display(),
            destination = %destination.display(),
            original_bytes = data.len(),
            compressed_bytes = encoded.len(),
            width,
            height,
            format = format.name(),
            "Image compressed"
        );

        Ok(CompressedImage {
            path: destination,
            metadata: ImageMetadata {
                width,
                height,
                format: format.name().to_string(),
                size_bytes: encoded.len() as u64,
                has_alpha: img.color().has_alpha() && format != OutputFormat::Jpeg,
                is_animated: false,
            },
        })
    }
}

/// Shrink `img` to fit inside `max_width` x `max_height`, preserving aspect ratio.
/// Images already inside the bounds are returned unchanged.
pub fn fit_within(img: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width <= max_width && height <= max_height {
        return img;
    }
    img.resize(max_width, max_height, FilterType::Lanczos3)
}

/// Encode `img` as `format` at `quality` (1-100; ignored for lossless PNG).
pub fn encode(
    img: &DynamicImage,
    format: OutputFormat,
    quality: u8,
) -> Result<Vec<u8>, CompressionError> {
    match format {
        OutputFormat::Jpeg => encode_jpeg(img, quality),
        OutputFormat::Png => encode_png(img),
        OutputFormat::WebP => Ok(encode_webp(img, quality)),
    }
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, CompressionError> {
    let rgb_img = img.to_rgb8();
    let (width, height) = rgb_img.dimensions();

    let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
    comp.set_size(width as usize, height as usize);
    comp.set_quality(f32::from(quality));
    comp.set_progressive_mode();
    comp.set_optimize_coding(true);

    let jpeg_err = |e: std::io::Error| CompressionError::Encode {
        format: "jpeg",
        message: e.to_string(),
    };
    let mut comp = comp.start_compress(Vec::new()).map_err(jpeg_err)?;
    comp.write_scanlines(&rgb_img).map_err(jpeg_err)?;
    comp.finish().map_err(jpeg_err)
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, CompressionError> {
    let mut buffer = Cursor::new(Vec::new());
    let encoder =
        PngEncoder::new_with_quality(&mut buffer, CompressionType::Best, PngFilterType::Adaptive);
    img.write_with_encoder(encoder)
        .map_err(|e| CompressionError::Encode {
            format: "png",
            message: e.to_string(),
        })?;
    Ok(buffer.into_inner())
}

fn encode_webp(img: &DynamicImage, quality: u8) -> Vec<u8> {
    let (width, height) = img.dimensions();
    if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        webp::Encoder::from_rgba(&rgba, width, height)
            .encode(f32::from(quality))
            .to_vec()
    } else {
        let rgb = img.to_rgb8();
        webp::Encoder::from_rgb(&rgb, width, height)
            .encode(f32::from(quality))
            .to_vec()
    }
}
