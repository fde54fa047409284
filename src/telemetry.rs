//! Action telemetry and tracing spans.
//!
//! Every guarded resource or service action produces one [`ActionRecord`],
//! shipped to the configured collector from a spawned task. Delivery is
//! best effort: a failed post is logged and the caller never waits on it.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::TelemetryConfig;
use crate::metrics;

/// One completed action, as sent to the collector.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    /// Controller name.
    #[serde(rename = "type")]
    pub kind: String,
    /// Random request id.
    pub id: String,
    /// RFC 3339 completion time.
    pub timestamp: String,
    pub actor: Option<String>,
    pub bound_owner: Option<String>,
    pub remote_addr: Option<String>,
    pub action: String,
    pub arguments: Value,
    pub result: Value,
}

impl ActionRecord {
    pub fn new(kind: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().to_rfc3339(),
            actor: None,
            bound_owner: None,
            remote_addr: None,
            action: action.into(),
            arguments: Value::Null,
            result: Value::Null,
        }
    }

    pub fn actor(mut self, actor: impl ToString) -> Self {
        self.actor = Some(actor.to_string());
        self
    }

    pub fn bound_owner(mut self, owner: Option<impl ToString>) -> Self {
        self.bound_owner = owner.map(|o| o.to_string());
        self
    }

    pub fn remote_addr(mut self, addr: Option<SocketAddr>) -> Self {
        self.remote_addr = addr.map(|a| a.to_string());
        self
    }

    pub fn arguments(mut self, arguments: Value) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn result(mut self, result: Value) -> Self {
        self.result = result;
        self
    }
}

/// Fire-and-forget client for the telemetry collector.
#[derive(Clone)]
pub struct TelemetrySink {
    client: reqwest::Client,
    url: Option<String>,
}

impl TelemetrySink {
    pub fn new(config: &TelemetryConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("bindery/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url: config.sink_url.clone(),
        })
    }

    /// A sink that only logs.
    pub fn disabled() -> Self {
        Self {
            client: reqwest::Client::new(),
            url: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    /// Ship `record` in the background.
    ///
    /// Returns the delivery task when a collector is configured.
    pub fn record(&self, record: ActionRecord) -> Option<JoinHandle<()>> {
        let Some(url) = self.url.clone() else {
            debug!(id = %record.id, action = %record.action, actor = ?record.actor, "Action record");
            return None;
        };
        let client = self.client.clone();

        Some(tokio::spawn(async move {
            match client.post(&url).json(&record).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(id = %record.id, "Action record delivered");
                }
                Ok(response) => {
                    warn!(id = %record.id, status = %response.status(), "Telemetry sink rejected record");
                }
                Err(e) => {
                    warn!(id = %record.id, error = %e, "Telemetry sink unreachable");
                }
            }
        }))
    }
}

/// Times an action and records its latency when finished.
pub struct ActionTimer {
    action: String,
    start: Instant,
}

impl ActionTimer {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            start: Instant::now(),
        }
    }

    /// Report under a different action label.
    pub fn rename(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    pub fn finish(self, outcome: &str) {
        metrics::record_action(&self.action, outcome, self.start.elapsed());
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, info_span};

    /// Span for one handled HTTP request.
    pub fn request(method: &str, path: &str, caller: Option<&str>) -> Span {
        match caller {
            Some(caller) => info_span!("request", method = %method, path = %path, caller = %caller),
            None => info_span!("request", method = %method, path = %path),
        }
    }

    /// Span for a delegated unit of work.
    pub fn delegation(resource: &str, caller: &str) -> Span {
        info_span!("delegation", resource = %resource, caller = %caller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_serializes_with_wire_names() {
        let record = ActionRecord::new("dummy", "example")
            .actor("alice")
            .bound_owner(Some("alice"))
            .remote_addr(Some("127.0.0.1:4000".parse().unwrap()))
            .result(json!({ "result": "success" }));

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "dummy");
        assert_eq!(value["boundOwner"], "alice");
        assert_eq!(value["remoteAddr"], "127.0.0.1:4000");
        assert_eq!(value["result"]["result"], "success");
        assert_eq!(value["id"].as_str().unwrap().len(), 36);
        assert!(chrono::DateTime::parse_from_rfc3339(value["timestamp"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn record_ids_are_unique() {
        let a = ActionRecord::new("dummy", "example");
        let b = ActionRecord::new("dummy", "example");
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn disabled_sink_spawns_nothing() {
        let sink = TelemetrySink::disabled();
        assert!(!sink.is_enabled());
        assert!(sink.record(ActionRecord::new("dummy", "example")).is_none());
    }

    #[tokio::test]
    async fn unreachable_sink_does_not_panic() {
        let sink = TelemetrySink::new(&TelemetryConfig {
            sink_url: Some("http://127.0.0.1:9/api/data/".into()),
            timeout_ms: 200,
        })
        .unwrap();
        let handle = sink.record(ActionRecord::new("dummy", "example")).unwrap();
        handle.await.unwrap();
    }
}
