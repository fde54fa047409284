//! # bindery-proto
//!
//! Wire types shared by both ends of the bindery binding protocol.
//!
//! A bindery controller exposes one resource instance over HTTP. Clients
//! identify themselves with the [`USER_ID_HEADER`] and may *bind* the
//! resource, becoming its exclusive owner until they *unbind* it. The same
//! types are used by the controller to render responses and by the
//! delegation client to parse a remote controller's replies.
//!
//! ```rust
//! use bindery_proto::{BindingStatus, CallerId};
//!
//! let alice = CallerId::parse("alice").expect("non-empty identity");
//! let status = BindingStatus::bound_to(&alice);
//! assert!(status.bound);
//! assert_eq!(status.owner_id.as_deref(), Some("alice"));
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod body;
pub mod caller;
pub mod kind;
pub mod path;

pub use body::{BindingStatus, ErrorBody, OwnerBody};
pub use caller::{CallerId, CallerIdError};
pub use kind::ErrorKind;

/// Request header carrying the caller identity.
///
/// The value is an opaque, unverified assertion made by the transport.
pub const USER_ID_HEADER: &str = "USER-ID";
