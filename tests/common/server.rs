//! Test server management.
//!
//! Runs bindery controllers in-process on ephemeral loopback ports.

use bindery::Controller;
use bindery::config::{self, Config};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::client::TestClient;

/// A running controller.
pub struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<Result<(), bindery::StartupError>>>,
}

impl TestServer {
    /// Spawn a controller from a TOML fragment.
    ///
    /// `body` holds everything except `[server]`/`[listen]`, which are
    /// generated from `name` and the bound port.
    pub async fn spawn(name: &str, body: &str) -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let toml = format!(
            r#"
[server]
name = "{name}"
id = "0"
description = "{name} test controller"

[listen]
address = "{addr}"

{body}
"#
        );
        let config: Config = toml::from_str(&toml)?;
        if let Err(errors) = config::validate(&config) {
            anyhow::bail!("invalid test config: {errors:?}");
        }

        let controller = Controller::open(&config)?;
        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(controller.run(listener, async move {
            let _ = rx.await;
        }));

        Ok(Self {
            addr,
            shutdown: Some(tx),
            handle: Some(handle),
        })
    }

    /// A dummy resource on the memory store.
    pub async fn dummy() -> anyhow::Result<Self> {
        Self::spawn("dummy", "[device]\nkind = \"dummy\"\n").await
    }

    /// A dummy resource reporting actions to `sink_url`.
    pub async fn dummy_with_sink(sink_url: &str) -> anyhow::Result<Self> {
        Self::spawn(
            "dummy",
            &format!("[device]\nkind = \"dummy\"\n\n[telemetry]\nsink_url = \"{sink_url}\"\n"),
        )
        .await
    }

    /// A hue resource driving the bridge at `bridge_url`.
    pub async fn hue(bridge_url: &str) -> anyhow::Result<Self> {
        Self::spawn(
            "hue",
            &format!(
                r#"
[device]
kind = "hue"
status_url = "{bridge_url}/lights"
action_url = "{bridge_url}/lights/2/state"
timeout_ms = 2000
"#
            ),
        )
        .await
    }

    /// A service with one action `fake` delegating `remote_action` to `resource_url`.
    pub async fn service(resource_url: &str, remote_action: Option<&str>) -> anyhow::Result<Self> {
        let remote = remote_action
            .map(|a| format!("remote_action = \"{a}\"\n"))
            .unwrap_or_default();
        Self::spawn(
            "service",
            &format!(
                r#"
[delegation]
timeout_ms = 2000
work_timeout_ms = 5000

[[service.resources]]
name = "dummy"
url = "{resource_url}"

[[service.actions]]
name = "fake"
resource = "dummy"
{remote}
"#
            ),
        )
        .await
    }

    /// Base URL, without trailing slash.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client without identity.
    pub fn anonymous(&self) -> TestClient {
        TestClient::new(&self.url(), None)
    }

    /// Client asserting `user` in `USER-ID`.
    pub fn client(&self, user: &str) -> TestClient {
        TestClient::new(&self.url(), Some(user))
    }

    /// Shut down gracefully and wait for the store to close.
    pub async fn stop(mut self) -> anyhow::Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await??;
        }
        Ok(())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}
