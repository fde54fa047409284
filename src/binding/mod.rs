//! Binding manager: the exclusive-ownership core.
//!
//! One manager governs one resource instance. It owns the injected
//! [`BindingStore`] and is the only component that writes to it.
//!
//! ## Serialization
//!
//! `bind` is check-then-set and `unbind` is check-then-clear. Stores only
//! promise per-operation atomicity, so both sequences run inside the
//! manager's transition lock; two binders can never both observe `Free`.
//! Reads (`status`, `authorize`) do not take the lock.

mod state;

pub use state::{BindingState, Transition};

use bindery_proto::{BindingStatus, CallerId};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::AccessError;
use crate::metrics;
use crate::store::BindingStore;

pub struct BindingManager {
    store: Arc<dyn BindingStore>,
    transition: Mutex<()>,
}

impl BindingManager {
    pub fn new(store: Arc<dyn BindingStore>) -> Self {
        Self {
            store,
            transition: Mutex::new(()),
        }
    }

    /// Current state, read straight from the store.
    pub async fn state(&self) -> Result<BindingState, AccessError> {
        Ok(BindingState::from(self.store.get().await?))
    }

    /// Status query. Side-effect-free; fails only if the store itself fails.
    pub async fn status(&self) -> Result<BindingStatus, AccessError> {
        Ok(self.state().await?.status())
    }

    /// Ownership predicate used by the `Authorized` guard.
    pub async fn authorize(&self, caller: &CallerId) -> Result<(), AccessError> {
        self.state().await?.authorize(caller).map(|_| ())
    }

    /// Bind the resource to `caller`. Returns the owner after the call.
    pub async fn bind(&self, caller: &CallerId) -> Result<CallerId, AccessError> {
        let _guard = self.transition.lock().await;
        let state = self.state().await?;
        let transition = self.record("bind", state.bind(caller))?;

        if let Transition::Acquired(owner) = &transition {
            self.store.set(owner).await?;
            metrics::set_bound(true);
            info!(owner = %owner, "Resource bound");
        }
        Ok(transition.owner().clone())
    }

    /// Release the binding held by `caller`. Returns the vacated owner.
    pub async fn unbind(&self, caller: &CallerId) -> Result<CallerId, AccessError> {
        let _guard = self.transition.lock().await;
        let state = self.state().await?;
        let transition = self.record("unbind", state.unbind(caller))?;

        self.store.clear().await?;
        metrics::set_bound(false);
        info!(owner = %transition.owner(), "Resource unbound");
        Ok(transition.owner().clone())
    }

    /// Read the persisted state and publish it to the `bound` gauge.
    ///
    /// Transitions keep the gauge current afterwards; this covers a store
    /// that already held an owner when the controller started.
    pub async fn publish_state(&self) -> Result<BindingState, AccessError> {
        let state = self.state().await?;
        metrics::set_bound(state.is_bound());
        Ok(state)
    }

    /// Close the underlying store. Called once at shutdown.
    pub async fn close(&self) -> Result<(), AccessError> {
        let _guard = self.transition.lock().await;
        self.store.close().await?;
        info!(backend = self.store.backend(), "Binding store closed");
        Ok(())
    }

    fn record(
        &self,
        op: &'static str,
        outcome: Result<Transition, AccessError>,
    ) -> Result<Transition, AccessError> {
        match &outcome {
            Ok(t) => metrics::record_transition(op, t.label()),
            Err(e) => {
                debug!(op, error = %e, "Binding transition rejected");
                metrics::record_transition(op, e.error_code());
            }
        }
        outcome
    }
}
