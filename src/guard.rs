//! Request admission guards.
//!
//! Every route declares a [`Tier`]; the tier expands to an ordered
//! [`GuardChain`] that runs before the handler touches the resource.
//!
//! | Tier         | Chain                  | Used by                          |
//! |--------------|------------------------|----------------------------------|
//! | `Public`     | (empty)                | description, status, metrics     |
//! | `Identified` | `Authenticated`        | bind                             |
//! | `Owner`      | `Authorized`           | unbind, resource/service actions |
//!
//! `Authorized` composes `Authenticated`: identity is checked first and the
//! store is only consulted once an identity is present. The chain stops at
//! the first failure.

use async_trait::async_trait;
use bindery_proto::CallerId;
use std::net::SocketAddr;

use crate::binding::BindingManager;
use crate::error::AccessError;
use crate::metrics;

/// What a guard may inspect about an inbound request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Asserted caller identity; `None` when the header is absent or blank.
    pub caller: Option<CallerId>,
    /// Peer address, when the transport knows it.
    pub remote_addr: Option<SocketAddr>,
}

impl RequestContext {
    pub fn new(caller: Option<CallerId>) -> Self {
        Self {
            caller,
            remote_addr: None,
        }
    }

    /// The caller identity, or `Unauthenticated`.
    pub fn require_caller(&self) -> Result<&CallerId, AccessError> {
        self.caller.as_ref().ok_or(AccessError::Unauthenticated)
    }
}

#[async_trait]
pub trait Guard: Send + Sync {
    /// Guard name for logs and metrics.
    fn name(&self) -> &'static str;

    async fn check(
        &self,
        ctx: &RequestContext,
        bindings: &BindingManager,
    ) -> Result<(), AccessError>;
}

/// Requires a caller identity. Never touches the store.
pub struct Authenticated;

#[async_trait]
impl Guard for Authenticated {
    fn name(&self) -> &'static str {
        "authenticated"
    }

    async fn check(
        &self,
        ctx: &RequestContext,
        _bindings: &BindingManager,
    ) -> Result<(), AccessError> {
        ctx.require_caller().map(|_| ())
    }
}

/// Requires a caller identity that owns the resource.
pub struct Authorized;

#[async_trait]
impl Guard for Authorized {
    fn name(&self) -> &'static str {
        "authorized"
    }

    async fn check(
        &self,
        ctx: &RequestContext,
        bindings: &BindingManager,
    ) -> Result<(), AccessError> {
        Authenticated.check(ctx, bindings).await?;
        let caller = ctx.require_caller()?;
        bindings.authorize(caller).await
    }
}

/// Capability level a route requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Public,
    Identified,
    Owner,
}

/// Ordered list of guards, evaluated first to last.
pub struct GuardChain {
    guards: Vec<Box<dyn Guard>>,
}

impl GuardChain {
    pub fn new(guards: Vec<Box<dyn Guard>>) -> Self {
        Self { guards }
    }

    pub fn for_tier(tier: Tier) -> Self {
        match tier {
            Tier::Public => Self::new(Vec::new()),
            Tier::Identified => Self::new(vec![Box::new(Authenticated)]),
            Tier::Owner => Self::new(vec![Box::new(Authorized)]),
        }
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// Run every guard in order, stopping at the first rejection.
    pub async fn admit(
        &self,
        ctx: &RequestContext,
        bindings: &BindingManager,
    ) -> Result<(), AccessError> {
        for guard in &self.guards {
            if let Err(e) = guard.check(ctx, bindings).await {
                tracing::debug!(
                    guard = guard.name(),
                    caller = ?ctx.caller,
                    error = %e,
                    "Request rejected"
                );
                metrics::record_rejection(guard.name(), e.error_code());
                return Err(e);
            }
        }
        Ok(())
    }
}

/// Admit `ctx` at `tier`, returning the caller identity when one is required.
pub async fn admit<'a>(
    tier: Tier,
    ctx: &'a RequestContext,
    bindings: &BindingManager,
) -> Result<Option<&'a CallerId>, AccessError> {
    GuardChain::for_tier(tier).admit(ctx, bindings).await?;
    Ok(match tier {
        Tier::Public => ctx.caller.as_ref(),
        Tier::Identified | Tier::Owner => Some(ctx.require_caller()?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{BindingStore, MemoryStore, StoreError};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn id(s: &str) -> CallerId {
        CallerId::parse(s).unwrap()
    }

    /// Store that counts reads, to prove guards short-circuit.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        reads: AtomicUsize,
    }

    #[async_trait]
    impl BindingStore for CountingStore {
        async fn exists(&self) -> Result<bool, StoreError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.exists().await
        }
        async fn get(&self) -> Result<Option<CallerId>, StoreError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get().await
        }
        async fn set(&self, owner: &CallerId) -> Result<(), StoreError> {
            self.inner.set(owner).await
        }
        async fn clear(&self) -> Result<(), StoreError> {
            self.inner.clear().await
        }
        fn backend(&self) -> &'static str {
            "counting"
        }
    }

    #[tokio::test]
    async fn missing_identity_rejected_before_store_access() {
        let store = Arc::new(CountingStore::default());
        let bindings = BindingManager::new(store.clone());
        let ctx = RequestContext::new(None);

        let err = GuardChain::for_tier(Tier::Owner)
            .admit(&ctx, &bindings)
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::Unauthenticated));
        assert_eq!(store.reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn identified_tier_ignores_ownership() {
        let bindings = BindingManager::new(Arc::new(MemoryStore::with_owner(id("alice"))));
        let ctx = RequestContext::new(Some(id("bob")));
        let caller = admit(Tier::Identified, &ctx, &bindings).await.unwrap();
        assert_eq!(caller, Some(&id("bob")));
    }

    #[tokio::test]
    async fn owner_tier_checks_binding() {
        let bindings = BindingManager::new(Arc::new(MemoryStore::new()));
        let alice = RequestContext::new(Some(id("alice")));
        let bob = RequestContext::new(Some(id("bob")));

        assert!(matches!(
            admit(Tier::Owner, &alice, &bindings).await,
            Err(AccessError::Unauthorized)
        ));

        bindings.bind(&id("alice")).await.unwrap();
        assert!(admit(Tier::Owner, &alice, &bindings).await.is_ok());
        assert!(matches!(
            admit(Tier::Owner, &bob, &bindings).await,
            Err(AccessError::Conflict)
        ));
    }

    #[tokio::test]
    async fn public_tier_admits_anyone() {
        let bindings = BindingManager::new(Arc::new(MemoryStore::new()));
        let ctx = RequestContext::default();
        assert!(GuardChain::for_tier(Tier::Public).is_empty());
        assert_eq!(admit(Tier::Public, &ctx, &bindings).await.unwrap(), None);
    }
}
