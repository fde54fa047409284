//! Public, unguarded endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use serde_json::Value;

use super::AppState;

/// `GET /`: the capability catalog.
pub async fn describe(State(state): State<AppState>) -> Json<Value> {
    Json(state.catalog().document().clone())
}

/// `GET /metrics`: Prometheus text exposition.
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::metrics::gather_metrics(),
    )
}
