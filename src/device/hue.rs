//! Lighting bridge driver (Hue REST dialect).
//!
//! `status_url` returns the bridge's light table keyed by light id;
//! `action_url` accepts a state document for the configured light.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Value, json};
use std::time::Duration;

use super::{DeviceDriver, DeviceError};
use crate::catalog::{ActionSpec, PropertySpec};
use crate::config::DeviceConfig;

pub struct HueDriver {
    client: reqwest::Client,
    status_url: String,
    action_url: String,
    light: String,
    timeout: Duration,
    /// Last state reported by or sent to the bridge.
    cached: RwLock<Option<bool>>,
}

impl HueDriver {
    pub fn new(config: &DeviceConfig) -> Result<Self, DeviceError> {
        let status_url = config
            .status_url
            .clone()
            .ok_or(DeviceError::Misconfigured("device.status_url"))?;
        let action_url = config
            .action_url
            .clone()
            .ok_or(DeviceError::Misconfigured("device.action_url"))?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("bindery/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DeviceError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            status_url,
            action_url,
            light: config.light.clone(),
            timeout: config.timeout(),
            cached: RwLock::new(None),
        })
    }

    /// Last known power state, without asking the bridge.
    pub fn cached(&self) -> Option<bool> {
        *self.cached.read()
    }

    async fn put_state(&self, body: Value, on: bool) -> Result<Value, DeviceError> {
        let request = self.client.put(&self.action_url).json(&body);
        let response = self.send(request).await?;
        if !response.status().is_success() {
            return Err(DeviceError::UnexpectedStatus(response.status().as_u16()));
        }
        *self.cached.write() = Some(on);
        Ok(json!({ "status": label(on) }))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, DeviceError> {
        match tokio::time::timeout(self.timeout, request.send()).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(DeviceError::Transport(e.to_string())),
            Err(_) => Err(DeviceError::Transport(format!(
                "timed out after {:?}",
                self.timeout
            ))),
        }
    }
}

fn label(on: bool) -> &'static str {
    if on { "On" } else { "Off" }
}

/// Read `<light>.state.on` out of the bridge's light table.
fn light_is_on(table: &Value, light: &str) -> Result<bool, DeviceError> {
    table
        .get(light)
        .and_then(|l| l.get("state"))
        .and_then(|s| s.get("on"))
        .and_then(Value::as_bool)
        .ok_or_else(|| DeviceError::MalformedResponse(format!("no boolean {light}.state.on")))
}

#[async_trait]
impl DeviceDriver for HueDriver {
    fn kind(&self) -> &'static str {
        "hue"
    }

    fn actions(&self) -> Vec<ActionSpec> {
        vec![
            ActionSpec::owner("on", "Turn on the hue", "Turn the light on"),
            ActionSpec::owner("off", "Turn off the hue", "Turn the light off"),
        ]
    }

    fn status_property(&self) -> PropertySpec {
        PropertySpec::owner("resource", "Light status", "Whether the light is On or Off")
    }

    async fn status(&self) -> Result<Value, DeviceError> {
        let response = self.send(self.client.get(&self.status_url)).await?;
        if !response.status().is_success() {
            return Err(DeviceError::UnexpectedStatus(response.status().as_u16()));
        }
        let table: Value = response
            .json()
            .await
            .map_err(|e| DeviceError::MalformedResponse(e.to_string()))?;

        let on = light_is_on(&table, &self.light)?;
        *self.cached.write() = Some(on);
        Ok(json!({ "status": label(on) }))
    }

    async fn execute(&self, action: &str) -> Result<Value, DeviceError> {
        match action {
            "on" => {
                self.put_state(json!({ "on": true, "sat": 254, "bri": 254, "hue": 10000 }), true)
                    .await
            }
            "off" => self.put_state(json!({ "on": false }), false).await,
            other => Err(DeviceError::UnknownAction(other.to_string())),
        }
    }
}
