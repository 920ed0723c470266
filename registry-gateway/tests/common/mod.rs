//! Common test utilities and helpers
//!
//! Every test gets its own pair of mock servers: one standing in for the
//! upstream registry, one for the hub.

#![allow(dead_code)]

use axum_test::TestServer;
use httpmock::{Mock, MockServer};
use registry_gateway::{build_router, AppState, GatewayConfig};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::time::Instant;

/// How long to wait for detached notifications to land
const NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Gateway under test plus its collaborators
pub struct TestGateway {
    pub server: TestServer,
    pub registry: MockServer,
    pub hub: MockServer,
}

/// Start a gateway wired to fresh registry and hub mocks
pub async fn start_gateway() -> TestGateway {
    let registry = MockServer::start_async().await;
    let hub = MockServer::start_async().await;
    let server = gateway_for(&registry.base_url(), &hub.base_url());

    TestGateway {
        server,
        registry,
        hub,
    }
}

/// Build an in-process gateway for arbitrary registry and hub URLs
pub fn gateway_for(registry_url: &str, hub_url: &str) -> TestServer {
    let config = GatewayConfig::from_raw(
        Some(registry_url),
        Some(hub_url),
        "127.0.0.1".to_string(),
        0,
    )
    .expect("Failed to build gateway config");
    let state = AppState::new(&config).expect("Failed to build gateway state");

    TestServer::new(build_router(state)).expect("Failed to create test server")
}

/// Build a gateway served over a real loopback socket, so handlers see the
/// peer address the way they do in production.
pub fn socket_gateway_for(registry_url: &str, hub_url: &str) -> TestServer {
    let config = GatewayConfig::from_raw(
        Some(registry_url),
        Some(hub_url),
        "127.0.0.1".to_string(),
        0,
    )
    .expect("Failed to build gateway config");
    let state = AppState::new(&config).expect("Failed to build gateway state");
    let app = build_router(state).into_make_service_with_connect_info::<SocketAddr>();

    TestServer::new(app).expect("Failed to create test server")
}

/// URL of a loopback port nothing listens on
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("No local address").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

/// Poll `mock` until it has seen `expected` calls or the timeout passes.
///
/// Returns the final call count so callers can assert on exact numbers.
pub async fn wait_for_calls(mock: &Mock<'_>, expected: usize) -> usize {
    let deadline = Instant::now() + NOTIFICATION_TIMEOUT;
    loop {
        let calls = mock.calls_async().await;
        if calls >= expected || Instant::now() >= deadline {
            return calls;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Give detached tasks a chance to run before asserting that nothing happened
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(300)).await;
}
