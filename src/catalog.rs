//! Capability catalog.
//!
//! The controller describes itself as a W3C WoT thing description, built
//! once at startup from configuration plus the static property and action
//! specs of the binding API and the active device or service. The document
//! is immutable afterwards and served at `GET /`.

use bindery_proto::USER_ID_HEADER;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::{CatalogConfig, ListenConfig, ServerConfig};

const TD_CONTEXT: &str = "https://www.w3.org/2019/wot/td/v1";

/// Security scheme a form requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Security {
    /// Anyone may call.
    NoSec,
    /// Caller identity in the `USER-ID` header.
    Basic,
}

impl Security {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoSec => "nosec_sc",
            Self::Basic => "basic_sc",
        }
    }
}

/// A readable property (`GET`).
#[derive(Debug, Clone)]
pub struct PropertySpec {
    pub name: String,
    pub title: String,
    pub description: String,
    pub path: String,
    pub security: Security,
    /// JSON-schema properties of the returned object.
    pub properties: Value,
}

impl PropertySpec {
    /// Owner-only property at `/resource` reporting a `status` string.
    pub fn owner(name: &str, title: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            path: "/resource".to_string(),
            security: Security::Basic,
            properties: json!({ "status": { "type": "string" } }),
        }
    }

    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_properties(mut self, properties: Value) -> Self {
        self.properties = properties;
        self
    }

    fn describe(&self, base_url: &str) -> Value {
        json!({
            "title": self.title,
            "type": "object",
            "description": self.description,
            "properties": self.properties,
            "required": required(&self.properties),
            "forms": [form(base_url, &self.path, "GET", self.security)],
        })
    }
}

/// An invocable action (`POST`).
#[derive(Debug, Clone)]
pub struct ActionSpec {
    pub name: String,
    pub title: String,
    pub description: String,
    pub path: String,
    pub security: Security,
    /// JSON-schema properties of the returned object.
    pub output: Value,
}

impl ActionSpec {
    /// Owner-only action at `/resource/<name>`.
    pub fn owner(name: &str, title: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            path: format!("/resource/{name}"),
            security: Security::Basic,
            output: json!({ "status": { "type": "string" } }),
        }
    }

    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_output(mut self, output: Value) -> Self {
        self.output = output;
        self
    }

    fn describe(&self, base_url: &str) -> Value {
        json!({
            "title": self.title,
            "type": "object",
            "description": self.description,
            "output": { "type": "object", "properties": self.output },
            "required": required(&self.output),
            "forms": [form(base_url, &self.path, "POST", self.security)],
        })
    }
}

fn form(base_url: &str, path: &str, method: &str, security: Security) -> Value {
    json!({
        "href": format!("{base_url}{path}"),
        "htv:methodName": method,
        "security": security.as_str(),
    })
}

fn required(properties: &Value) -> Vec<String> {
    properties
        .as_object()
        .map(|o| o.keys().cloned().collect())
        .unwrap_or_default()
}

/// Properties and actions every controller exposes.
fn binding_api() -> (Vec<PropertySpec>, Vec<ActionSpec>) {
    let owner = json!({ "ownerId": { "type": "string" } });
    let user = PropertySpec {
        name: "user".to_string(),
        title: "Show bound user info".to_string(),
        description: "Whether the resource is bound and to whom".to_string(),
        path: "/user".to_string(),
        security: Security::NoSec,
        properties: json!({
            "bound": { "type": "boolean" },
            "ownerId": { "type": "string" }
        }),
    };
    let bind = ActionSpec::owner("bind", "Bind resource", "Bind the resource to the requesting user")
        .at("/user/bind")
        .with_output(owner.clone());
    let unbind = ActionSpec::owner("unbind", "Unbind resource", "Release the resource held by the requesting user")
        .at("/user/unbind")
        .with_output(owner);
    (vec![user], vec![bind, unbind])
}

/// The controller's thing description.
#[derive(Debug, Clone)]
pub struct Catalog {
    document: Arc<Value>,
}

impl Catalog {
    /// Build the description for this controller.
    ///
    /// `properties` and `actions` come from the device driver or service;
    /// the binding API entries are always included.
    pub fn build(
        server: &ServerConfig,
        listen: &ListenConfig,
        properties: Vec<PropertySpec>,
        actions: Vec<ActionSpec>,
    ) -> Self {
        let base_url = server.public_url(listen);
        let (mut all_properties, mut all_actions) = binding_api();
        all_properties.extend(properties);
        all_actions.extend(actions);

        let properties: Map<String, Value> = all_properties
            .iter()
            .map(|p| (p.name.clone(), p.describe(&base_url)))
            .collect();
        let actions: Map<String, Value> = all_actions
            .iter()
            .map(|a| (a.name.clone(), a.describe(&base_url)))
            .collect();

        let document = json!({
            "@context": [TD_CONTEXT, { "@language": "en" }],
            "id": format!("webeng:{}:{}", server.name.to_lowercase(), server.id),
            "title": format!("WebEng-{}", server.name),
            "url": base_url,
            "description": server.description,
            "securityDefinitions": {
                "nosec_sc": { "scheme": "nosec" },
                "basic_sc": { "scheme": "basic", "in": "header", "name": USER_ID_HEADER }
            },
            "security": Security::Basic.as_str(),
            "properties": properties,
            "actions": actions,
        });

        Self {
            document: Arc::new(document),
        }
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Post the description to the configured directory, once, in the background.
    ///
    /// Returns `None` when no directory is configured. Failures are logged only.
    pub fn register(&self, config: &CatalogConfig) -> Option<JoinHandle<()>> {
        let url = config.registry_url.clone()?;
        let timeout = config.timeout();
        let document = Arc::clone(&self.document);

        Some(tokio::spawn(async move {
            match post_description(&url, &document, timeout).await {
                Ok(()) => info!(registry = %url, "Catalog registered"),
                Err(e) => warn!(registry = %url, error = %e, "Catalog registration failed"),
            }
        }))
    }
}

async fn post_description(url: &str, document: &Value, timeout: Duration) -> Result<(), String> {
    let body = json!({ "raw_description": document.to_string() });
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| e.to_string())?;
    let response = client
        .post(url)
        .json(&body)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if response.status().is_success() {
        Ok(())
    } else {
        Err(format!("unexpected status {}", response.status()))
    }
}
