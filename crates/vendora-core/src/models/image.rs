use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Image metadata derived from file content, never from the declared content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    /// Lowercase format name as detected from the bytes ("jpeg", "png", "webp", ...)
    pub format: String,
    pub size_bytes: u64,
    pub has_alpha: bool,
    pub is_animated: bool,
}

/// Image attached to a product.
///
/// `order` is assigned from submission order and only changes through an explicit reorder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductImageRecord {
    pub url: String,
    pub alt_text: String,
    pub metadata: ImageMetadata,
    pub order: u32,
}

impl ProductImageRecord {
    /// File name component of the record's URL.
    pub fn file_name(&self) -> Option<&str> {
        self.url.rsplit('/').next().filter(|name| !name.is_empty())
    }
}
