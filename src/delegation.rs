//! Cross-service delegation.
//!
//! A service that must drive a resource it does not own borrows a lease on
//! the remote controller for the duration of one unit of work:
//!
//! ```text
//! POST <remote>/user/bind   ──► 409 ──► Conflict (work never runs)
//!        │ 200
//!        ▼
//!   work(ResourceHandle)          (bounded by work_timeout)
//!        │ Ok / Err / panic / timeout / cancelled
//!        ▼
//! POST <remote>/user/unbind       (always; spawned if cancelled; failure is logged only)
//! ```
//!
//! Delegation speaks only the remote controller's HTTP protocol and never
//! touches a binding store. Nothing here is retried.

use bindery_proto::{CallerId, ErrorBody, OwnerBody, USER_ID_HEADER, path};
use futures_util::FutureExt;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{DelegationConfig, ResourceBlock};
use crate::error::AccessError;
use crate::metrics;

/// Which leg of a delegation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Bind,
    Work,
    Invoke,
    Unbind,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bind => "bind",
            Self::Work => "work",
            Self::Invoke => "invoke",
            Self::Unbind => "unbind",
        })
    }
}

/// Failure talking to a remote controller.
///
/// Transport problems and malformed replies are kept apart so callers can
/// tell an unreachable peer from a misbehaving one.
#[derive(Debug, Error)]
pub enum DelegationFault {
    #[error("{stage}: transport error: {detail}")]
    Transport { stage: Stage, detail: String },

    #[error("{stage}: timed out after {after:?}")]
    Timeout { stage: Stage, after: Duration },

    #[error("{stage}: unexpected status {status}{}", detail_suffix(.message))]
    UnexpectedStatus {
        stage: Stage,
        status: u16,
        message: Option<String>,
    },

    #[error("{stage}: malformed response: {detail}")]
    MalformedResponse { stage: Stage, detail: String },
}

impl DelegationFault {
    /// Whether the remote may have acted on the request despite the fault.
    ///
    /// Only a status code the remote actually sent proves it did not.
    pub fn may_have_committed(&self) -> bool {
        !matches!(self, Self::UnexpectedStatus { .. })
    }
}

/// A remote resource controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub name: String,
    pub base_url: String,
}

impl From<&ResourceBlock> for ResourceDescriptor {
    fn from(block: &ResourceBlock) -> Self {
        Self {
            name: block.name.clone(),
            base_url: block.url.clone(),
        }
    }
}

/// What the unit of work receives while the lease is held.
#[derive(Clone)]
pub struct ResourceHandle {
    pub name: String,
    pub base_url: String,
    caller: CallerId,
    client: reqwest::Client,
    timeout: Duration,
}

impl ResourceHandle {
    /// Identity the lease is held under.
    pub fn caller(&self) -> &CallerId {
        &self.caller
    }

    /// Invoke `<base>/resource/<action>` on the leased resource.
    pub async fn invoke(&self, action: &str) -> Result<serde_json::Value, DelegationFault> {
        let url = path::join(&self.base_url, &path::resource_action(action));
        let response = send(
            Stage::Invoke,
            self.timeout,
            self.client
                .post(&url)
                .header(USER_ID_HEADER, self.caller.as_str()),
        )
        .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(unexpected(Stage::Invoke, response).await);
        }
        response
            .json()
            .await
            .map_err(|e| DelegationFault::MalformedResponse {
                stage: Stage::Invoke,
                detail: e.to_string(),
            })
    }
}

/// Client side of the binding protocol.
#[derive(Clone)]
pub struct Delegator {
    client: reqwest::Client,
    timeout: Duration,
    work_timeout: Duration,
}

impl Delegator {
    pub fn new(config: &DelegationConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("bindery/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            timeout: config.timeout(),
            work_timeout: config.work_timeout(),
        })
    }

    /// Run `work` while holding a lease on `target` under `caller`'s identity.
    ///
    /// The lease is released on every exit path of `work`, including errors,
    /// panics and the work timeout. If this future is dropped while the lease
    /// is held, the release is handed to a background task. A bind that may
    /// have reached the remote (timeout, transport error, malformed reply) is
    /// released too. A failed release is logged and does not change the result.
    pub async fn with_resource<T, F, Fut>(
        &self,
        target: &ResourceDescriptor,
        caller: &CallerId,
        work: F,
    ) -> Result<T, AccessError>
    where
        F: FnOnce(ResourceHandle) -> Fut,
        Fut: Future<Output = Result<T, AccessError>>,
    {
        let lease = Lease {
            delegator: self.clone(),
            target: target.clone(),
            caller: caller.clone(),
            armed: true,
        };
        if let Err(e) = self.acquire(target, caller).await {
            match &e {
                AccessError::Delegation(fault) if fault.may_have_committed() => lease.release().await,
                _ => lease.disarm(),
            }
            metrics::record_delegation(&target.name, e.error_code());
            return Err(e);
        }
        debug!(resource = %target.name, caller = %caller, "Remote lease acquired");

        let handle = ResourceHandle {
            name: target.name.clone(),
            base_url: target.base_url.clone(),
            caller: caller.clone(),
            client: self.client.clone(),
            timeout: self.timeout,
        };

        let run = AssertUnwindSafe(async move { work(handle).await }).catch_unwind();
        let outcome = tokio::time::timeout(self.work_timeout, run).await;

        lease.release().await;

        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(panic)) => {
                metrics::record_delegation(&target.name, "panic");
                std::panic::resume_unwind(panic);
            }
            Err(_) => Err(DelegationFault::Timeout {
                stage: Stage::Work,
                after: self.work_timeout,
            }
            .into()),
        };

        let label = match &result {
            Ok(_) => "ok",
            Err(e) => e.error_code(),
        };
        metrics::record_delegation(&target.name, label);
        result
    }

    /// Remote bind. `409` is a `Conflict`; anything else but `200` is a fault.
    async fn acquire(
        &self,
        target: &ResourceDescriptor,
        caller: &CallerId,
    ) -> Result<(), AccessError> {
        let url = path::join(&target.base_url, path::BIND);
        let response = send(
            Stage::Bind,
            self.timeout,
            self.client.post(&url).header(USER_ID_HEADER, caller.as_str()),
        )
        .await?;

        match response.status().as_u16() {
            200 => response
                .json::<OwnerBody>()
                .await
                .map(|_| ())
                .map_err(|e| {
                    AccessError::from(DelegationFault::MalformedResponse {
                        stage: Stage::Bind,
                        detail: e.to_string(),
                    })
                }),
            409 => {
                info!(resource = %target.name, caller = %caller, "Remote resource bound to another user");
                Err(AccessError::Conflict)
            }
            _ => Err(unexpected(Stage::Bind, response).await.into()),
        }
    }

    /// Remote unbind, best effort.
    async fn release(&self, target: &ResourceDescriptor, caller: &CallerId) {
        let url = path::join(&target.base_url, path::UNBIND);
        let outcome = send(
            Stage::Unbind,
            self.timeout,
            self.client.post(&url).header(USER_ID_HEADER, caller.as_str()),
        )
        .await;

        match outcome {
            Ok(response) if response.status().is_success() => {
                debug!(resource = %target.name, caller = %caller, "Remote lease released");
            }
            Ok(response) => {
                let fault = unexpected(Stage::Unbind, response).await;
                warn!(resource = %target.name, caller = %caller, error = %fault, "Failed to release remote lease");
            }
            Err(fault) => {
                warn!(resource = %target.name, caller = %caller, error = %fault, "Failed to release remote lease");
            }
        }
    }
}

/// A remote lease that must be given back.
///
/// Armed before the bind request goes out. Dropping an armed lease (the
/// delegating future was cancelled) spawns the unbind on the current runtime.
struct Lease {
    delegator: Delegator,
    target: ResourceDescriptor,
    caller: CallerId,
    armed: bool,
}

impl Lease {
    async fn release(mut self) {
        self.delegator.release(&self.target, &self.caller).await;
        self.armed = false;
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(resource = %self.target.name, caller = %self.caller, "Remote lease dropped outside a runtime, not released");
            return;
        };
        info!(resource = %self.target.name, caller = %self.caller, "Delegation cancelled, releasing remote lease in background");
        let delegator = self.delegator.clone();
        let target = self.target.clone();
        let caller = self.caller.clone();
        runtime.spawn(async move {
            delegator.release(&target, &caller).await;
        });
    }
}

fn detail_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(" ({m})"))
        .unwrap_or_default()
}

async fn send(
    stage: Stage,
    timeout: Duration,
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, DelegationFault> {
    match tokio::time::timeout(timeout, request.send()).await {
        Ok(Ok(response)) => Ok(response),
        Ok(Err(e)) if e.is_timeout() => Err(DelegationFault::Timeout { stage, after: timeout }),
        Ok(Err(e)) => Err(DelegationFault::Transport {
            stage,
            detail: e.to_string(),
        }),
        Err(_) => Err(DelegationFault::Timeout { stage, after: timeout }),
    }
}

async fn unexpected(stage: Stage, response: reqwest::Response) -> DelegationFault {
    let status = response.status().as_u16();
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .map(|body| body.error_message);
    DelegationFault::UnexpectedStatus {
        stage,
        status,
        message,
    }
}
