//! Integration test common infrastructure.
//!
//! Provides utilities for spawning in-process controllers, HTTP clients
//! speaking the binding protocol, and fake collaborators (lighting bridge,
//! telemetry collector, catalog directory).

pub mod client;
pub mod fakes;
pub mod server;

#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use server::TestServer;
