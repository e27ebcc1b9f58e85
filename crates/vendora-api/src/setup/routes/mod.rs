//! Route configuration and setup.

mod health;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{delete, get, post, put},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use vendora_core::constants::{PRODUCT_IMAGE_URL_PREFIX, VENDOR_API_PREFIX};
use vendora_core::Config;

use crate::auth::middleware::{auth_middleware, AuthState};
use crate::auth::JwtKeys;
use crate::handlers;
use crate::state::AppState;

/// Headroom on top of the file payload for multipart boundaries and text fields.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let auth_state = Arc::new(AuthState {
        keys: JwtKeys::new(&config.jwt_secret),
    });

    let protected_routes = vendor_routes()
        .layer(axum::middleware::from_fn_with_state(auth_state, auth_middleware));

    let body_limit = (config.max_images_per_request * config.max_image_size_bytes())
        .max(config.max_bulk_file_size_bytes)
        + FORM_OVERHEAD_BYTES;
    tracing::info!(body_limit_bytes = body_limit, "Request body limit configured");

    let app = public_routes()
        .merge(protected_routes)
        .nest_service(
            PRODUCT_IMAGE_URL_PREFIX,
            ServeDir::new(config.product_image_dir()),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(setup_cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn setup_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}

/// Public routes (no authentication required)
fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
}

/// Vendor routes; every handler reads the vendor from the auth middleware.
fn vendor_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/products", VENDOR_API_PREFIX),
            post(handlers::products::create_product).get(handlers::products::list_products),
        )
        .route(
            &format!("{}/products/bulk", VENDOR_API_PREFIX),
            post(handlers::bulk::bulk_upload_products),
        )
        .route(
            &format!("{}/products/{{id}}", VENDOR_API_PREFIX),
            put(handlers::products::update_product).delete(handlers::products::delete_product),
        )
        .route(
            &format!("{}/products/{{id}}/images/reorder", VENDOR_API_PREFIX),
            put(handlers::products::reorder_product_images),
        )
        .route(
            &format!("{}/products/{{id}}/images/{{index}}", VENDOR_API_PREFIX),
            delete(handlers::products::delete_product_image),
        )
}
