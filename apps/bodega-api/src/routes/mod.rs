//! HTTP handlers.

pub mod sales;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::AppState;

/// Health check endpoint.
///
/// 200 when the database answers, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let healthy = state.db.health_check().await;
    let migrations = match state.db.migration_status().await {
        Ok((total, applied)) => json!({ "total": total, "applied": applied }),
        Err(e) => {
            tracing::warn!("Migration status unavailable: {}", e);
            serde_json::Value::Null
        }
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if healthy { "ok" } else { "unavailable" },
            "database": healthy,
            "migrations": migrations,
        })),
    )
}
