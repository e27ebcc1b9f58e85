//! Test fixtures: synthesized images and product forms.

use std::io::Cursor;

use axum_test::multipart::{MultipartForm, Part};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8])
    }));
    let mut out = Cursor::new(Vec::new());
    match format {
        ImageFormat::Gif => img
            .to_rgba8()
            .write_to(&mut out, format)
            .expect("Failed to encode test image"),
        _ => img
            .write_to(&mut out, format)
            .expect("Failed to encode test image"),
    }
    out.into_inner()
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Jpeg)
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}

pub fn gif(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Gif)
}

pub fn image_part(data: Vec<u8>, file_name: &str, mime: &str) -> Part {
    Part::bytes(bytes::Bytes::from(data))
        .file_name(file_name)
        .mime_type(mime)
}

/// Valid product form fields without images.
pub fn product_form(name: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("name", name)
        .add_text("description", "Adjustable LED desk lamp")
        .add_text("price", "49.90")
        .add_text("category", "Lighting")
        .add_text("stock", "12")
        .add_text(
            "dimensions",
            r#"{"length": 30, "width": 15, "height": 45, "weight": 1.2}"#,
        )
        .add_text(
            "specifications",
            r#"[{"name": "Color", "value": "Black"}, {"name": "Power", "value": "8W"}]"#,
        )
        .add_text("tags", "lamp, desk, led")
}

pub fn bulk_part(body: &str, file_name: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(bytes::Bytes::from(body.to_string())).file_name(file_name),
    )
}
