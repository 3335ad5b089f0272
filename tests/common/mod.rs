//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceExt;

use simple_redirector::config::load_mapping;
use simple_redirector::http::{AppState, HttpServer, PageRenderer};
use simple_redirector::observability::metrics::detached_handle;
use simple_redirector::{RedirectorConfig, Shutdown};

/// Path of the mapping file used by the tests.
pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/test-redirect-map.yml")
}

/// Server over the fixture mapping with the built-in page.
pub fn test_server() -> HttpServer {
    let config = RedirectorConfig {
        mapping_path: fixture_path(),
        ..RedirectorConfig::default()
    };
    let table = load_mapping(&config.mapping_path).unwrap();
    let pages = PageRenderer::builtin().unwrap();
    HttpServer::new(config, AppState::new(table, pages, detached_handle()))
}

/// Send a GET for `path` with the given Host header through `router`.
#[allow(dead_code)]
pub async fn get(router: Router, host: &str, path: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(path)
        .header("host", host)
        .body(Body::empty())
        .unwrap();
    router.oneshot(request).await.unwrap()
}

/// Body of `response` as text.
#[allow(dead_code)]
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Start the fixture server on an ephemeral port.
#[allow(dead_code)]
pub async fn start_server() -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = test_server();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(100)).await;
    (addr, shutdown)
}
