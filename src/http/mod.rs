//! HTTP surface.
//!
//! | Method | Path                 | Tier       |
//! |--------|----------------------|------------|
//! | GET    | `/`                  | public     |
//! | GET    | `/user`              | public     |
//! | POST   | `/user/:action`      | per action |
//! | GET    | `/resource`          | owner      |
//! | POST   | `/resource/:action`  | owner      |
//! | GET    | `/service`           | owner      |
//! | POST   | `/service/:action`   | owner      |
//! | GET    | `/metrics`           | public     |
//!
//! `/resource*` is mounted only in device mode, `/service*` only in service
//! mode, `/metrics` only when `server.metrics` is set.

mod binding;
mod description;
mod extract;
mod resource;
mod service;
mod state;

pub use state::{AppState, Mode};

use axum::Router;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use bindery_proto::USER_ID_HEADER;
use serde_json::{Value, json};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::Instrument;

use crate::error::{AccessError, AccessResult};
use crate::guard::RequestContext;
use crate::telemetry::{ActionRecord, ActionTimer, spans};

/// Build the router for `state`.
pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(description::describe))
        .route("/user", get(binding::status))
        .route("/user/:action", post(binding::action));

    router = match state.mode() {
        Mode::Device(_) => router
            .route("/resource", get(resource::status))
            .route("/resource/:action", post(resource::action)),
        Mode::Service(_) => router
            .route("/service", get(service::status))
            .route("/service/:action", post(service::action)),
    };

    if state.metrics_enabled() {
        router = router.route("/metrics", get(description::metrics));
    }

    router
        .layer(middleware::from_fn(trace_request))
        .with_state(state)
}

/// Wrap every request in a `request` span.
async fn trace_request(request: Request, next: Next) -> Response {
    let caller = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let span = spans::request(
        request.method().as_str(),
        request.uri().path(),
        caller.as_deref(),
    );
    next.run(request).instrument(span).await
}

/// Record metrics and ship a telemetry record for a finished action.
async fn report(
    state: &AppState,
    ctx: &RequestContext,
    timer: ActionTimer,
    action: &str,
    outcome: &AccessResult<Value>,
) {
    let result = match outcome {
        Err(e @ AccessError::InvalidAction(_)) => {
            // Keep arbitrary path segments out of metric labels.
            timer.rename("unknown").finish(e.error_code());
            json!({ "error": e.error_code(), "errorMessage": e.to_string() })
        }
        Ok(value) => {
            timer.finish("ok");
            value.clone()
        }
        Err(e) => {
            timer.finish(e.error_code());
            json!({ "error": e.error_code(), "errorMessage": e.to_string() })
        }
    };
    let bound_owner = state
        .bindings()
        .status()
        .await
        .ok()
        .and_then(|s| s.owner_id);

    let record = ActionRecord::new(state.name(), action)
        .bound_owner(bound_owner)
        .remote_addr(ctx.remote_addr)
        .arguments(json!({ "action": action }))
        .result(result);
    let record = match &ctx.caller {
        Some(caller) => record.actor(caller),
        None => record,
    };
    state.telemetry().record(record);
}

/// Serve `router` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "HTTP server listening");
    }
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}
