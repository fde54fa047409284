//! Controller assembly and lifecycle.
//!
//! ```text
//! Config ──► open store ──► BindingManager ─┐
//!        ──► device driver | service ───────┼──► AppState ──► Router
//!        ──► Catalog, TelemetrySink ────────┘
//! run(): register catalog, publish stored state, serve until shutdown, close store
//! ```

use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::binding::BindingManager;
use crate::catalog::Catalog;
use crate::config::{CatalogConfig, Config};
use crate::device::{self, DeviceError};
use crate::error::AccessError;
use crate::http::{self, AppState, Mode};
use crate::metrics;
use crate::service::ServiceController;
use crate::store::{self, StoreError};
use crate::telemetry::TelemetrySink;

/// Errors raised while assembling or running a controller.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to open binding store: {0}")]
    Store(#[from] StoreError),
    #[error("failed to initialize device driver: {0}")]
    Device(#[from] DeviceError),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("neither [device] nor [service] is configured")]
    NoController,
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// One resource or service controller, ready to serve.
pub struct Controller {
    state: AppState,
    catalog_config: CatalogConfig,
}

impl Controller {
    /// Open the store and build the driver or service described by `config`.
    ///
    /// `config` should already have passed [`validate`](crate::config::validate).
    pub fn open(config: &Config) -> Result<Self, StartupError> {
        let store = store::open(&config.store)?;
        let bindings = Arc::new(BindingManager::new(store));

        let (mode, properties, actions) = match (&config.device, &config.service) {
            (Some(device), _) => {
                let driver = device::open(device)?;
                let property = driver.status_property();
                let actions = driver.actions();
                (Mode::Device(driver), vec![property], actions)
            }
            (None, Some(service)) => {
                let service = Arc::new(ServiceController::new(service, &config.delegation)?);
                let property = service.status_property();
                let actions = service.actions();
                (Mode::Service(service), vec![property], actions)
            }
            (None, None) => return Err(StartupError::NoController),
        };

        let catalog = Catalog::build(&config.server, &config.listen, properties, actions);
        let telemetry = TelemetrySink::new(&config.telemetry)?;

        if config.server.metrics {
            metrics::init();
        }

        let state = AppState::new(config.server.name.as_str(), bindings, mode, catalog, telemetry)
            .with_metrics(config.server.metrics);

        Ok(Self {
            state,
            catalog_config: config.catalog.clone(),
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn router(&self) -> axum::Router {
        http::router(self.state.clone())
    }

    /// Serve on `listener` until `shutdown` resolves, then close the store.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), StartupError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.state.catalog().register(&self.catalog_config);

        match self.state.bindings().publish_state().await {
            Ok(state) => info!(bound = state.is_bound(), "Binding state loaded"),
            Err(e) => warn!(error = %e, "Failed to read persisted binding state"),
        }

        let served = http::serve(listener, self.router(), shutdown).await;
        info!("HTTP server stopped");

        if let Err(e) = self.state.bindings().close().await {
            match e {
                AccessError::Store(StoreError::Closed) => {}
                other => warn!(error = %other, "Failed to close binding store"),
            }
        }
        served.map_err(StartupError::from)
    }
}
