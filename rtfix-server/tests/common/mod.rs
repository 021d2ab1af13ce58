//! Shared test utilities for rtfix-server integration tests

pub mod client;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use rtfix_core::FixtureConfig;
use rtfix_server::{AppState, FixtureServer, ServerConfig};
use tokio::net::TcpListener;

/// Creates a test server with the default endpoint table
#[allow(dead_code)]
pub async fn create_test_server() -> (Arc<AppState>, SocketAddr) {
    create_test_server_with_fixture(FixtureConfig::default()).await
}

/// Creates a test server with a custom endpoint table
#[allow(dead_code)]
pub async fn create_test_server_with_fixture(
    fixture: FixtureConfig,
) -> (Arc<AppState>, SocketAddr) {
    let state = Arc::new(AppState::new(&fixture).expect("valid fixture"));
    let config = ServerConfig::new("127.0.0.1", 0).with_fixture(fixture);
    let server = FixtureServer::with_state(config, Arc::clone(&state));
    let addr = spawn_server(server).await;

    (state, addr)
}

/// Spawns server in background task, returns bound address
async fn spawn_server(server: FixtureServer) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = server.run_with_listener(listener).await;
    });

    // Brief delay to ensure server is accepting connections
    tokio::time::sleep(Duration::from_millis(10)).await;

    addr
}

/// Waits until the echo groups hold exactly `count` members
#[allow(dead_code)]
pub async fn wait_for_members(state: &AppState, count: usize) {
    let waited = tokio::time::timeout(Duration::from_secs(5), async {
        while state.groups.member_count() != count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(
        waited.is_ok(),
        "expected {} echo members, have {}",
        count,
        state.groups.member_count()
    );
}
