//! Vendor identity: HS256 bearer tokens, the auth middleware and the request extractor.

pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::JwtKeys;
pub use models::{Claims, VendorContext};
