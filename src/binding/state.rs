//! Binding state machine.
//!
//! ```text
//!            bind(c)                       bind(c) [owner == c]
//!   ┌──────┐ ─────────────────────► ┌──────────────┐ ◄──┐
//!   │ Free │                        │ Bound(owner) │ ───┘
//!   └──────┘ ◄───────────────────── └──────────────┘
//!            unbind(c) [owner == c]
//! ```
//!
//! Every other combination is rejected without changing state:
//! `bind` by a non-owner and `unbind` by a non-owner are `Conflict`,
//! `unbind` on a free resource is `Unauthorized`.
//!
//! The functions here are pure. [`BindingManager`](super::BindingManager)
//! reads the state from the store, asks this module for a transition, and
//! applies it.

use bindery_proto::{BindingStatus, CallerId};

use crate::error::AccessError;

/// Ownership state of one resource instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingState {
    Free,
    Bound(CallerId),
}

/// An accepted transition and the store write it requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Free -> Bound. Requires `set(owner)`.
    Acquired(CallerId),
    /// Bound(c) -> Bound(c). No write.
    Renewed(CallerId),
    /// Bound(c) -> Free. Requires `clear()`; carries the vacated owner.
    Released(CallerId),
}

impl Transition {
    /// The identity returned to the caller.
    pub fn owner(&self) -> &CallerId {
        match self {
            Self::Acquired(owner) | Self::Renewed(owner) | Self::Released(owner) => owner,
        }
    }

    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Acquired(_) => "acquired",
            Self::Renewed(_) => "renewed",
            Self::Released(_) => "released",
        }
    }
}

impl From<Option<CallerId>> for BindingState {
    fn from(owner: Option<CallerId>) -> Self {
        match owner {
            Some(owner) => Self::Bound(owner),
            None => Self::Free,
        }
    }
}

impl BindingState {
    pub fn is_bound(&self) -> bool {
        matches!(self, Self::Bound(_))
    }

    pub fn owner(&self) -> Option<&CallerId> {
        match self {
            Self::Free => None,
            Self::Bound(owner) => Some(owner),
        }
    }

    /// Wire form of this state.
    pub fn status(&self) -> BindingStatus {
        match self {
            Self::Free => BindingStatus::free(),
            Self::Bound(owner) => BindingStatus::bound_to(owner),
        }
    }

    /// Ownership predicate: `caller` must be the recorded owner.
    ///
    /// Free fails with `Unauthorized`, bound-to-someone-else with `Conflict`.
    pub fn authorize(&self, caller: &CallerId) -> Result<&CallerId, AccessError> {
        match self {
            Self::Free => Err(AccessError::Unauthorized),
            Self::Bound(owner) if owner == caller => Ok(owner),
            Self::Bound(_) => Err(AccessError::Conflict),
        }
    }

    pub fn bind(&self, caller: &CallerId) -> Result<Transition, AccessError> {
        match self {
            Self::Free => Ok(Transition::Acquired(caller.clone())),
            Self::Bound(owner) if owner == caller => Ok(Transition::Renewed(owner.clone())),
            Self::Bound(_) => Err(AccessError::Conflict),
        }
    }

    pub fn unbind(&self, caller: &CallerId) -> Result<Transition, AccessError> {
        self.authorize(caller)
            .map(|owner| Transition::Released(owner.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> CallerId {
        CallerId::parse(s).unwrap()
    }

    #[test]
    fn bind_from_free_acquires() {
        let t = BindingState::Free.bind(&id("alice")).unwrap();
        assert_eq!(t, Transition::Acquired(id("alice")));
    }

    #[test]
    fn rebind_by_owner_is_renewal() {
        let state = BindingState::Bound(id("alice"));
        assert_eq!(state.bind(&id("alice")).unwrap(), Transition::Renewed(id("alice")));
    }

    #[test]
    fn bind_by_other_conflicts() {
        let state = BindingState::Bound(id("alice"));
        assert!(matches!(state.bind(&id("bob")), Err(AccessError::Conflict)));
    }

    #[test]
    fn unbind_free_is_unauthorized() {
        assert!(matches!(
            BindingState::Free.unbind(&id("alice")),
            Err(AccessError::Unauthorized)
        ));
    }

    #[test]
    fn unbind_by_other_conflicts() {
        let state = BindingState::Bound(id("alice"));
        assert!(matches!(state.unbind(&id("bob")), Err(AccessError::Conflict)));
    }

    #[test]
    fn unbind_by_owner_releases() {
        let state = BindingState::Bound(id("alice"));
        let t = state.unbind(&id("alice")).unwrap();
        assert_eq!(t.owner(), &id("alice"));
        assert_eq!(t.label(), "released");
    }

    #[test]
    fn status_reflects_state() {
        assert_eq!(BindingState::Free.status(), BindingStatus::free());
        let status = BindingState::Bound(id("alice")).status();
        assert!(status.bound);
        assert_eq!(status.owner_id.as_deref(), Some("alice"));
    }
}
