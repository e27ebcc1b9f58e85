//! Application-wide constants

/// API path prefix for vendor routes.
pub const VENDOR_API_PREFIX: &str = "/api/v1/vendor";

/// Public URL prefix under which stored product images are served.
pub const PRODUCT_IMAGE_URL_PREFIX: &str = "/uploads/products";

/// Sub-directory of the upload root holding product images.
pub const PRODUCT_IMAGE_DIR: &str = "products";

/// Sub-directory of the upload root holding bulk catalog files while they are parsed.
pub const STAGING_DIR: &str = "temp";

/// Suffix appended to an image's base name once it has been re-encoded.
pub const COMPRESSED_SUFFIX: &str = "-compressed";

/// Multipart field carrying product images.
pub const IMAGES_FIELD: &str = "images";

/// Multipart field carrying a bulk catalog file.
pub const BULK_FILE_FIELD: &str = "file";

/// Role a bearer token must carry to reach vendor routes.
pub const VENDOR_ROLE: &str = "vendor";

/// Values bound per product row by a multi-row insert.
pub const PRODUCT_INSERT_BIND_COUNT: usize = 14;

/// Largest bulk insert chunk that stays under the Postgres limit of 65535 bind parameters.
pub const MAX_BULK_INSERT_CHUNK_SIZE: usize = u16::MAX as usize / PRODUCT_INSERT_BIND_COUNT;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;
