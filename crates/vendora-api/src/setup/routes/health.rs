//! Health check handler.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use uuid::Uuid;
use vendora_core::models::{Pagination, ProductFilter};

use crate::state::AppState;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
pub(super) struct HealthCheckResponse {
    pub status: &'static str,
    pub store: String,
    pub uploads: String,
}

pub(super) async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store = match tokio::time::timeout(
        CHECK_TIMEOUT,
        state
            .store
            .list(Uuid::nil(), &ProductFilter::default(), Pagination::new(1, 1)),
    )
    .await
    {
        Ok(Ok(_)) => "healthy".to_string(),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Catalog store health check failed");
            format!("unhealthy: {}", e)
        }
        Err(_) => "timeout".to_string(),
    };

    let uploads = match tokio::fs::metadata(state.product_image_dir()).await {
        Ok(meta) if meta.is_dir() => "healthy".to_string(),
        Ok(_) => "unhealthy: not a directory".to_string(),
        Err(e) => format!("unhealthy: {}", e),
    };

    let healthy = store == "healthy" && uploads == "healthy";
    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthCheckResponse {
            status: if healthy { "healthy" } else { "degraded" },
            store,
            uploads,
        }),
    )
}
