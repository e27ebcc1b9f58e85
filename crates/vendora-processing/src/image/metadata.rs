//! Content-based image inspection

use std::io::Cursor;

use image::{GenericImageView, ImageFormat, ImageReader};
use vendora_core::models::ImageMetadata;

/// Detect the format of `data` from its magic bytes.
pub fn detect_format(data: &[u8]) -> Option<ImageFormat> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()
        .and_then(|reader| reader.format())
}

/// Lowercase name used in configuration and in [`ImageMetadata::format`].
pub fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        other => other
            .extensions_str()
            .first()
            .map(|ext| ext.to_string())
            .unwrap_or_else(|| format!("{:?}", other).to_lowercase()),
    }
}

/// Decode the image and build metadata from what was actually decoded.
pub fn read_metadata(data: &[u8]) -> Result<ImageMetadata, image::ImageError> {
    let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
    let format = reader
        .format()
        .map(format_name)
        .unwrap_or_else(|| "unknown".to_string());
    let img = reader.decode()?;
    let (width, height) = img.dimensions();
    let has_alpha = img.color().has_alpha();

    Ok(ImageMetadata {
        width,
        height,
        format,
        size_bytes: data.len() as u64,
        has_alpha,
        is_animated: is_animated(data),
    })
}

/// Byte-level animation check for the container formats that can carry several frames.
pub fn is_animated(data: &[u8]) -> bool {
    match detect_format(data) {
        // APNG announces itself with an acTL chunk ahead of the image data.
        Some(ImageFormat::Png) => contains(data, b"acTL"),
        // Extended WebP header with the animation flag set.
        Some(ImageFormat::WebP) => {
            data.len() > 20 && &data[12..16] == b"VP8X" && data[20] & 0x02 != 0
        }
        Some(ImageFormat::Gif) => contains(data, b"NETSCAPE2.0"),
        _ => false,
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};

    fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_reads_png_metadata() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(320, 200, Rgba([1, 2, 3, 128])));
        let data = encode(&img, ImageFormat::Png);
        let meta = read_metadata(&data).unwrap();
        assert_eq!((meta.width, meta.height), (320, 200));
        assert_eq!(meta.format, "png");
        assert!(meta.has_alpha);
        assert!(!meta.is_animated);
        assert_eq!(meta.size_bytes, data.len() as u64);
    }

    #[test]
    fn test_reads_jpeg_metadata() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(150, 120, Rgb([200, 10, 10])));
        let data = encode(&img, ImageFormat::Jpeg);
        let meta = read_metadata(&data).unwrap();
        assert_eq!(meta.format, "jpeg");
        assert!(!meta.has_alpha);
    }

    #[test]
    fn test_garbage_is_not_an_image() {
        assert!(detect_format(b"name,price\nLamp,3\n").is_none());
        assert!(read_metadata(b"name,price\nLamp,3\n").is_err());
    }

    #[test]
    fn test_webp_animation_flag() {
        let mut data = b"RIFF\0\0\0\0WEBPVP8X".to_vec();
        data.extend_from_slice(&[10, 0, 0, 0, 0x02, 0, 0, 0]);
        assert!(is_animated(&data));
        data[20] = 0x10;
        assert!(!is_animated(&data));
    }
}
