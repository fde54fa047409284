//! In-process stand-in device.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use super::{DeviceDriver, DeviceError};
use crate::catalog::{ActionSpec, PropertySpec};

const EXAMPLE: &str = "example";

/// Accepts a single `example` action and remembers the last one run.
#[derive(Default)]
pub struct DummyDriver {
    last: Mutex<Option<String>>,
}

impl DummyDriver {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeviceDriver for DummyDriver {
    fn kind(&self) -> &'static str {
        "dummy"
    }

    fn actions(&self) -> Vec<ActionSpec> {
        vec![ActionSpec::owner(EXAMPLE, "Example", "Example action on the dummy resource")]
    }

    fn status_property(&self) -> PropertySpec {
        PropertySpec::owner("resource", "Resource status", "Last action run on the dummy resource")
    }

    async fn status(&self) -> Result<Value, DeviceError> {
        let last = self.last.lock().clone();
        Ok(json!({ "status": last.as_deref().unwrap_or("idle") }))
    }

    async fn execute(&self, action: &str) -> Result<Value, DeviceError> {
        if action != EXAMPLE {
            return Err(DeviceError::UnknownAction(action.to_string()));
        }
        *self.last.lock() = Some(action.to_string());
        Ok(json!({ "result": "success" }))
    }
}
