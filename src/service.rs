//! Composite service mode.
//!
//! A service owns no device. Each of its actions borrows one remote
//! resource through [`Delegator::with_resource`] on behalf of the caller,
//! optionally invokes an action there, and reports what it touched.

use bindery_proto::CallerId;
use serde_json::{Value, json};
use std::collections::HashMap;
use tracing::Instrument;

use crate::catalog::{ActionSpec, PropertySpec};
use crate::config::{DelegationConfig, ServiceConfig};
use crate::delegation::{Delegator, ResourceDescriptor};
use crate::error::AccessError;
use crate::telemetry::spans;

/// A configured service action.
#[derive(Debug, Clone)]
struct ServiceAction {
    resource: ResourceDescriptor,
    remote_action: Option<String>,
    title: String,
    description: String,
}

pub struct ServiceController {
    delegator: Delegator,
    resources: Vec<ResourceDescriptor>,
    actions: HashMap<String, ServiceAction>,
}

impl ServiceController {
    /// Build from validated configuration.
    ///
    /// Actions naming an undeclared resource are skipped; validation
    /// rejects such configs before this point. Fails only if the HTTP
    /// client cannot be built.
    pub fn new(config: &ServiceConfig, delegation: &DelegationConfig) -> Result<Self, reqwest::Error> {
        let resources: Vec<ResourceDescriptor> =
            config.resources.iter().map(ResourceDescriptor::from).collect();

        let actions = config
            .actions
            .iter()
            .filter_map(|block| {
                let resource = config.resource(&block.resource)?;
                let action = ServiceAction {
                    resource: ResourceDescriptor::from(resource),
                    remote_action: block.remote_action.clone(),
                    title: block.title.clone().unwrap_or_else(|| block.name.clone()),
                    description: block
                        .description
                        .clone()
                        .unwrap_or_else(|| format!("Delegates to {}", block.resource)),
                };
                Some((block.name.clone(), action))
            })
            .collect();

        Ok(Self {
            delegator: Delegator::new(delegation)?,
            resources,
            actions,
        })
    }

    /// `GET /service`: the remote resources this service may borrow.
    pub fn status(&self) -> Value {
        let resources: Vec<Value> = self
            .resources
            .iter()
            .map(|r| json!({ "name": r.name, "url": r.base_url }))
            .collect();
        json!({ "resources": resources })
    }

    /// Run `action` for `caller`, holding the remote lease throughout.
    pub async fn execute(&self, action: &str, caller: &CallerId) -> Result<Value, AccessError> {
        let spec = self
            .actions
            .get(action)
            .ok_or_else(|| AccessError::InvalidAction(action.to_string()))?;

        let span = spans::delegation(&spec.resource.name, caller.as_str());
        self.delegator
            .with_resource(&spec.resource, caller, |handle| async move {
                let result = match &spec.remote_action {
                    Some(remote) => handle.invoke(remote).await?,
                    None => Value::Null,
                };
                Ok::<_, AccessError>(json!({
                    "name": handle.name,
                    "url": handle.base_url,
                    "result": result,
                }))
            })
            .instrument(span)
            .await
    }

    pub fn actions(&self) -> Vec<ActionSpec> {
        let mut names: Vec<&String> = self.actions.keys().collect();
        names.sort();
        names
            .into_iter()
            .map(|name| {
                let spec = &self.actions[name];
                ActionSpec::owner(name, &spec.title, &spec.description)
                    .at(format!("/service/{name}"))
                    .with_output(json!({
                        "name": { "type": "string" },
                        "url": { "type": "string" },
                        "result": { "type": "object" }
                    }))
            })
            .collect()
    }

    pub fn status_property(&self) -> PropertySpec {
        PropertySpec::owner("service", "Service resources", "Remote resources this service delegates to")
            .at("/service")
            .with_properties(json!({ "resources": { "type": "array" } }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ResourceBlock, ServiceActionBlock};

    fn controller() -> ServiceController {
        let config = ServiceConfig {
            resources: vec![ResourceBlock {
                name: "dummy".into(),
                url: "http://127.0.0.1:9".into(),
            }],
            actions: vec![ServiceActionBlock {
                name: "fake".into(),
                resource: "dummy".into(),
                remote_action: Some("example".into()),
                title: None,
                description: None,
            }],
        };
        ServiceController::new(
            &config,
            &DelegationConfig {
                timeout_ms: 300,
                work_timeout_ms: 300,
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn unknown_action_is_invalid_before_any_remote_call() {
        let caller = CallerId::parse("alice").unwrap();
        let err = controller().execute("dance", &caller).await.unwrap_err();
        assert!(matches!(err, AccessError::InvalidAction(a) if a == "dance"));
    }

    #[tokio::test]
    async fn unreachable_resource_is_delegation_failure() {
        let caller = CallerId::parse("alice").unwrap();
        let err = controller().execute("fake", &caller).await.unwrap_err();
        assert!(matches!(err, AccessError::Delegation(_)));
    }

    #[test]
    fn status_lists_resources_and_catalog_lists_actions() {
        let service = controller();
        assert_eq!(service.status()["resources"][0]["name"], "dummy");

        let actions = service.actions();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].path, "/service/fake");
    }
}
