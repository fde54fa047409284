//! `/service` handlers (service mode).

use axum::Json;
use axum::extract::{Path, State};
use serde_json::Value;
use std::sync::Arc;

use super::{AppState, Mode, report};
use crate::error::{AccessError, AccessResult};
use crate::guard::{RequestContext, Tier, admit};
use crate::service::ServiceController;
use crate::telemetry::ActionTimer;

fn controller(state: &AppState) -> AccessResult<Arc<ServiceController>> {
    match state.mode() {
        Mode::Service(service) => Ok(Arc::clone(service)),
        Mode::Device(_) => Err(AccessError::InvalidAction("service".to_string())),
    }
}

/// `GET /service`
pub async fn status(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> AccessResult<Json<Value>> {
    admit(Tier::Owner, &ctx, state.bindings()).await?;
    Ok(Json(controller(&state)?.status()))
}

/// `POST /service/:action`
pub async fn action(
    State(state): State<AppState>,
    Path(action): Path<String>,
    ctx: RequestContext,
) -> AccessResult<Json<Value>> {
    let caller = admit(Tier::Owner, &ctx, state.bindings())
        .await?
        .cloned()
        .ok_or(AccessError::Unauthenticated)?;
    let service = controller(&state)?;

    let timer = ActionTimer::new(action.as_str());
    let outcome = service.execute(&action, &caller).await;
    report(&state, &ctx, timer, &action, &outcome).await;

    outcome.map(Json)
}
