use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use vendora_core::constants::VENDOR_ROLE;
use vendora_core::AppError;

use super::jwt::JwtKeys;
use super::models::VendorContext;
use crate::error::HttpAppError;

#[derive(Clone)]
pub struct AuthState {
    pub keys: JwtKeys,
}

/// Require a valid bearer token carrying the vendor role.
///
/// Missing or invalid tokens answer 401; valid tokens for any other role answer 403.
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Missing authorization header".to_string(),
            ))
            .into_response();
        }
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return HttpAppError(AppError::Unauthorized(
            "Invalid authorization header format".to_string(),
        ))
        .into_response();
    };

    let claims = match auth_state.keys.verify(token.trim()) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "Bearer token rejected");
            return HttpAppError(e).into_response();
        }
    };

    if claims.role != VENDOR_ROLE {
        tracing::info!(user_id = %claims.sub, role = %claims.role, "Non-vendor token on vendor route");
        return HttpAppError(AppError::Forbidden(
            "Access denied. Vendor privileges required.".to_string(),
        ))
        .into_response();
    }

    request.extensions_mut().insert(VendorContext {
        vendor_id: claims.sub,
    });
    next.run(request).await
}
