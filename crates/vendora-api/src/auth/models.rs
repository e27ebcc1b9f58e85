use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vendora_core::AppError;

use crate::error::HttpAppError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // vendor id
    pub role: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

/// Authenticated vendor, stored in request extensions by the auth middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorContext {
    pub vendor_id: Uuid,
}

// Extension cannot be combined with Multipart, so the context is read from the parts directly.
impl<S> FromRequestParts<S> for VendorContext
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<VendorContext>()
            .copied()
            .ok_or_else(|| HttpAppError(AppError::Unauthorized("Missing vendor context".to_string())))
    }
}
