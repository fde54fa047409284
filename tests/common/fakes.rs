//! Fake collaborators served over real HTTP.

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::{get, post};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

async fn serve(router: Router) -> anyhow::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(addr)
}

/// Lighting bridge with a single light `2`.
#[derive(Clone, Default)]
pub struct FakeBridge {
    /// Every state document PUT to the light.
    pub puts: Arc<Mutex<Vec<Value>>>,
    on: Arc<Mutex<bool>>,
}

impl FakeBridge {
    /// Serve the bridge; returns its base URL.
    pub async fn start(&self) -> anyhow::Result<String> {
        let router = Router::new()
            .route("/lights", get(bridge_lights))
            .route("/lights/2/state", axum::routing::put(bridge_put))
            .with_state(self.clone());
        Ok(format!("http://{}", serve(router).await?))
    }

    pub fn is_on(&self) -> bool {
        *self.on.lock().unwrap()
    }
}

async fn bridge_lights(State(bridge): State<FakeBridge>) -> Json<Value> {
    let on = *bridge.on.lock().unwrap();
    Json(json!({
        "1": { "state": { "on": false } },
        "2": { "state": { "on": on, "bri": 254 } }
    }))
}

async fn bridge_put(State(bridge): State<FakeBridge>, Json(body): Json<Value>) -> Json<Value> {
    if let Some(on) = body.get("on").and_then(Value::as_bool) {
        *bridge.on.lock().unwrap() = on;
    }
    bridge.puts.lock().unwrap().push(body.clone());
    Json(json!([{ "success": body }]))
}

/// Collector that forwards every posted JSON body to a channel.
///
/// Serves both the telemetry path and the catalog directory path.
pub async fn start_collector() -> anyhow::Result<(String, mpsc::UnboundedReceiver<Value>)> {
    let (tx, rx) = mpsc::unbounded_channel::<Value>();
    let router = Router::new()
        .route("/api/data/", post(collect))
        .route("/api/services/", post(collect))
        .with_state(tx);
    Ok((format!("http://{}", serve(router).await?), rx))
}

async fn collect(
    State(tx): State<mpsc::UnboundedSender<Value>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let _ = tx.send(body);
    Json(json!({ "ok": true }))
}

/// Remote controller that commits every bind but answers it after `delay`.
///
/// Reports each `bind`/`unbind` call on the channel as it arrives.
pub async fn start_slow_remote(
    delay: Duration,
) -> anyhow::Result<(String, mpsc::UnboundedReceiver<&'static str>)> {
    let (tx, rx) = mpsc::unbounded_channel::<&'static str>();
    let router = Router::new()
        .route(
            "/user/bind",
            post(move |State(tx): State<mpsc::UnboundedSender<&'static str>>| async move {
                let _ = tx.send("bind");
                tokio::time::sleep(delay).await;
                Json(json!({ "ownerId": "alice" }))
            }),
        )
        .route(
            "/user/unbind",
            post(|State(tx): State<mpsc::UnboundedSender<&'static str>>| async move {
                let _ = tx.send("unbind");
                Json(json!({ "ownerId": "alice" }))
            }),
        )
        .with_state(tx);
    Ok((format!("http://{}", serve(router).await?), rx))
}
