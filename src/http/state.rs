//! Shared handler state.

use std::sync::Arc;

use crate::binding::BindingManager;
use crate::catalog::Catalog;
use crate::device::DeviceDriver;
use crate::service::ServiceController;
use crate::telemetry::TelemetrySink;

/// What this controller fronts.
#[derive(Clone)]
pub enum Mode {
    Device(Arc<dyn DeviceDriver>),
    Service(Arc<ServiceController>),
}

#[derive(Clone)]
pub struct AppState {
    name: Arc<str>,
    bindings: Arc<BindingManager>,
    mode: Mode,
    catalog: Catalog,
    telemetry: TelemetrySink,
    metrics: bool,
}

impl AppState {
    pub fn new(
        name: impl Into<Arc<str>>,
        bindings: Arc<BindingManager>,
        mode: Mode,
        catalog: Catalog,
        telemetry: TelemetrySink,
    ) -> Self {
        Self {
            name: name.into(),
            bindings,
            mode,
            catalog,
            telemetry,
            metrics: false,
        }
    }

    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics = enabled;
        self
    }

    /// Controller name, used as the telemetry record type.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bindings(&self) -> &BindingManager {
        &self.bindings
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn telemetry(&self) -> &TelemetrySink {
        &self.telemetry
    }

    pub fn metrics_enabled(&self) -> bool {
        self.metrics
    }
}
