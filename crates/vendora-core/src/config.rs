//! Configuration module
//!
//! Configuration is read from the environment (a `.env` file is loaded first when
//! present). Every value has a default so a development instance starts with nothing
//! set; `validate()` rejects combinations that cannot work.

use std::env;
use std::path::PathBuf;

use anyhow::anyhow;

use crate::constants::MAX_BULK_INSERT_CHUNK_SIZE;

// Common constants
const SERVER_PORT: u16 = 5000;
const DB_MAX_CONNECTIONS: u32 = 10;
const DEV_JWT_SECRET: &str = "development-only-secret-change-me-please";
const MAX_IMAGES_PER_REQUEST: usize = 5;
const MAX_IMAGE_SIZE_MB: usize = 5;
const MAX_BULK_FILE_SIZE_MB: usize = 10;
const IMAGE_MIN_DIMENSION: u32 = 100;
const IMAGE_MAX_DIMENSION: u32 = 5000;
const COMPRESSION_QUALITY: u8 = 80;
const COMPRESSION_MAX_WIDTH: u32 = 1920;
const COMPRESSION_MAX_HEIGHT: u32 = 1080;
const BULK_INSERT_CHUNK_SIZE: usize = 500;

/// Limits an uploaded image must satisfy to be accepted.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageLimitsConfig {
    pub max_size_bytes: u64,
    pub min_width: u32,
    pub max_width: u32,
    pub min_height: u32,
    pub max_height: u32,
    /// Lowercase format names ("jpeg", "png", "webp")
    pub allowed_formats: Vec<String>,
}

impl Default for ImageLimitsConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: (MAX_IMAGE_SIZE_MB * 1024 * 1024) as u64,
            min_width: IMAGE_MIN_DIMENSION,
            max_width: IMAGE_MAX_DIMENSION,
            min_height: IMAGE_MIN_DIMENSION,
            max_height: IMAGE_MAX_DIMENSION,
            allowed_formats: vec!["jpeg".to_string(), "png".to_string(), "webp".to_string()],
        }
    }
}

/// Target settings for re-encoding accepted images.
#[derive(Clone, Debug, PartialEq)]
pub struct CompressionSettings {
    pub quality: u8,
    pub max_width: u32,
    pub max_height: u32,
    /// Output format name; `None` keeps the source format.
    pub format: Option<String>,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            quality: COMPRESSION_QUALITY,
            max_width: COMPRESSION_MAX_WIDTH,
            max_height: COMPRESSION_MAX_HEIGHT,
            format: None,
        }
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    /// PostgreSQL connection string; the in-memory catalog store is used when unset.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub upload_root: PathBuf,
    pub max_images_per_request: usize,
    pub max_bulk_file_size_bytes: usize,
    pub image_limits: ImageLimitsConfig,
    pub compression: CompressionSettings,
    pub bulk_insert_chunk_size: usize,
    pub log_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            database_url: None,
            db_max_connections: DB_MAX_CONNECTIONS,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            upload_root: PathBuf::from("uploads"),
            max_images_per_request: MAX_IMAGES_PER_REQUEST,
            max_bulk_file_size_bytes: MAX_BULK_FILE_SIZE_MB * 1024 * 1024,
            image_limits: ImageLimitsConfig::default(),
            compression: CompressionSettings::default(),
            bulk_insert_chunk_size: BULK_INSERT_CHUNK_SIZE,
            log_format: "pretty".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or(defaults.environment);

        let allowed_formats = match var("IMAGE_ALLOWED_FORMATS") {
            Some(list) => list
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .map(|s| if s == "jpg" { "jpeg".to_string() } else { s })
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.image_limits.allowed_formats,
        };

        let max_image_mb = parse_or(&var, "MAX_IMAGE_SIZE_MB", MAX_IMAGE_SIZE_MB)?;
        let max_bulk_mb = parse_or(&var, "MAX_BULK_FILE_SIZE_MB", MAX_BULK_FILE_SIZE_MB)?;

        let config = Config {
            server_port: parse_or(&var, "PORT", defaults.server_port)?,
            environment,
            database_url: var("DATABASE_URL"),
            db_max_connections: parse_or(&var, "DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            jwt_secret: var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            upload_root: var("UPLOAD_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_root),
            max_images_per_request: parse_or(
                &var,
                "MAX_IMAGES_PER_REQUEST",
                defaults.max_images_per_request,
            )?,
            max_bulk_file_size_bytes: max_bulk_mb * 1024 * 1024,
            image_limits: ImageLimitsConfig {
                max_size_bytes: (max_image_mb * 1024 * 1024) as u64,
                min_width: parse_or(&var, "IMAGE_MIN_WIDTH", IMAGE_MIN_DIMENSION)?,
                max_width: parse_or(&var, "IMAGE_MAX_WIDTH", IMAGE_MAX_DIMENSION)?,
                min_height: parse_or(&var, "IMAGE_MIN_HEIGHT", IMAGE_MIN_DIMENSION)?,
                max_height: parse_or(&var, "IMAGE_MAX_HEIGHT", IMAGE_MAX_DIMENSION)?,
                allowed_formats,
            },
            compression: CompressionSettings {
                quality: parse_or(&var, "COMPRESSION_QUALITY", COMPRESSION_QUALITY)?,
                max_width: parse_or(&var, "COMPRESSION_MAX_WIDTH", COMPRESSION_MAX_WIDTH)?,
                max_height: parse_or(&var, "COMPRESSION_MAX_HEIGHT", COMPRESSION_MAX_HEIGHT)?,
                format: var("COMPRESSION_FORMAT").map(|f| f.to_lowercase()),
            },
            bulk_insert_chunk_size: parse_or(
                &var,
                "BULK_INSERT_CHUNK_SIZE",
                defaults.bulk_insert_chunk_size,
            )?,
            log_format: var("LOG_FORMAT")
                .map(|f| f.to_lowercase())
                .unwrap_or(defaults.log_format),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && (self.jwt_secret.len() < 32 || self.jwt_secret == DEV_JWT_SECRET) {
            return Err(anyhow!(
                "JWT_SECRET must be set to at least 32 characters in production"
            ));
        }

        if let Some(url) = &self.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        let limits = &self.image_limits;
        if limits.min_width > limits.max_width || limits.min_height > limits.max_height {
            return Err(anyhow!(
                "Image minimum dimensions must not exceed maximum dimensions"
            ));
        }
        if limits.allowed_formats.is_empty() {
            return Err(anyhow!("IMAGE_ALLOWED_FORMATS must list at least one format"));
        }

        if !(1..=100).contains(&self.compression.quality) {
            return Err(anyhow!("COMPRESSION_QUALITY must be between 1 and 100"));
        }
        if self.compression.max_width == 0 || self.compression.max_height == 0 {
            return Err(anyhow!("Compression bounds must be greater than zero"));
        }

        if self.max_images_per_request == 0 {
            return Err(anyhow!("MAX_IMAGES_PER_REQUEST must be greater than zero"));
        }
        if self.bulk_insert_chunk_size == 0 {
            return Err(anyhow!("BULK_INSERT_CHUNK_SIZE must be greater than zero"));
        }
        if self.bulk_insert_chunk_size > MAX_BULK_INSERT_CHUNK_SIZE {
            return Err(anyhow!(
                "BULK_INSERT_CHUNK_SIZE must be at most {} ({} given)",
                MAX_BULK_INSERT_CHUNK_SIZE,
                self.bulk_insert_chunk_size
            ));
        }

        Ok(())
    }

    /// Directory holding product images.
    pub fn product_image_dir(&self) -> PathBuf {
        self.upload_root.join(crate::constants::PRODUCT_IMAGE_DIR)
    }

    /// Directory holding bulk catalog files while they are parsed.
    pub fn staging_dir(&self) -> PathBuf {
        self.upload_root.join(crate::constants::STAGING_DIR)
    }

    /// Per-part multipart limit for image uploads.
    pub fn max_image_size_bytes(&self) -> usize {
        self.image_limits.max_size_bytes as usize
    }
}

fn parse_or<T, V>(var: &V, key: &str, default: T) -> Result<T, anyhow::Error>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    V: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow!("Invalid value for {}: '{}' ({})", key, raw, e)),
        None => Ok(default),
    }
}
