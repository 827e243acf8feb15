use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::warn;

use crate::dto::HealthResponse;
use crate::state::{AppState, StorageHandle};

pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let detail = match &state.storage {
        StorageHandle::Postgres(pool) => sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(pool)
            .await
            .err()
            .map(|error| {
                warn!(error = %error, "storage health check failed");
                "storage check failed".to_owned()
            }),
        StorageHandle::Memory => None,
    };

    let (http_status, status) = match detail {
        None => (StatusCode::OK, "ok"),
        Some(_) => (StatusCode::SERVICE_UNAVAILABLE, "degraded"),
    };

    (
        http_status,
        Json(HealthResponse {
            status,
            storage: state.storage.label(),
            detail,
        }),
    )
}
