//! Request context extraction.

use ::http::request::Parts;
use axum::extract::{ConnectInfo, FromRequestParts};
use bindery_proto::{CallerId, USER_ID_HEADER};
use std::convert::Infallible;
use std::net::SocketAddr;

use crate::guard::RequestContext;

/// A missing, non-UTF-8 or blank `USER-ID` header all yield `caller: None`;
/// the guards decide whether that matters.
#[axum::async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let caller = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| CallerId::parse(v).ok());
        let remote_addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(Self {
            caller,
            remote_addr,
        })
    }
}
