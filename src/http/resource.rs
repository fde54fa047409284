//! `/resource` handlers (device mode).

use axum::Json;
use axum::extract::{Path, State};
use serde_json::Value;
use std::sync::Arc;

use super::{AppState, Mode, report};
use crate::device::DeviceDriver;
use crate::error::{AccessError, AccessResult};
use crate::guard::{RequestContext, Tier, admit};
use crate::telemetry::ActionTimer;

fn driver(state: &AppState) -> AccessResult<Arc<dyn DeviceDriver>> {
    match state.mode() {
        Mode::Device(driver) => Ok(Arc::clone(driver)),
        Mode::Service(_) => Err(AccessError::InvalidAction("resource".to_string())),
    }
}

/// `GET /resource`
pub async fn status(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> AccessResult<Json<Value>> {
    admit(Tier::Owner, &ctx, state.bindings()).await?;
    Ok(Json(driver(&state)?.status().await?))
}

/// `POST /resource/:action`
pub async fn action(
    State(state): State<AppState>,
    Path(action): Path<String>,
    ctx: RequestContext,
) -> AccessResult<Json<Value>> {
    admit(Tier::Owner, &ctx, state.bindings()).await?;
    let driver = driver(&state)?;

    let timer = ActionTimer::new(action.as_str());
    let outcome = driver.execute(&action).await.map_err(AccessError::from);
    report(&state, &ctx, timer, &action, &outcome).await;

    if let Err(e) = &outcome {
        tracing::warn!(action = %action, driver = driver.kind(), error = %e, "Device action failed");
    }
    outcome.map(Json)
}
