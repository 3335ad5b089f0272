//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the redirect handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Turn dispatch decisions into responses
//! - Serve plain HTTP or TLS until shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{connect_info::IntoMakeServiceWithConnectInfo, ConnectInfo, State},
    http::{header, Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use axum_server::tls_rustls::RustlsConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::schema::{MappingTable, RedirectorConfig};
use crate::http::dispatch::{dispatch, Dispatch};
use crate::http::page::PageRenderer;
use crate::http::request::{request_id, MakeRequestUuidV4};
use crate::observability::metrics;
use crate::routing::request_host;

/// Time given to in-flight TLS connections after shutdown is requested.
const TLS_DRAIN_SECS: u64 = 10;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<MappingTable>,
    pub pages: Arc<PageRenderer>,
    pub metrics: PrometheusHandle,
}

impl AppState {
    pub fn new(table: MappingTable, pages: PageRenderer, metrics: PrometheusHandle) -> Self {
        Self {
            table: Arc::new(table),
            pages: Arc::new(pages),
            metrics,
        }
    }
}

/// HTTP server for the redirector.
pub struct HttpServer {
    router: Router,
    config: RedirectorConfig,
}

impl HttpServer {
    /// Create a new HTTP server serving `state` with the given configuration.
    pub fn new(config: RedirectorConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RedirectorConfig, state: AppState) -> Router {
        let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                request_id = %request_id(request),
                method = %request.method(),
                uri = %request.uri(),
            )
        });

        Router::new()
            .route("/", get(redirect_handler))
            .route("/{*path}", get(redirect_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
                    .layer(trace)
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// The fully layered router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RedirectorConfig {
        &self.config
    }

    /// Serve plain HTTP on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, tls = false, "HTTP server starting");

        axum::serve(listener, with_peer_addr(self.router))
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `addr` until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, tls = true, "HTTP server starting");

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            drain.graceful_shutdown(Some(Duration::from_secs(TLS_DRAIN_SECS)));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(with_peer_addr(self.router))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Make-service that hands each connection's peer address to the handlers,
/// shared by the plain and TLS listeners.
fn with_peer_addr(router: Router) -> IntoMakeServiceWithConnectInfo<Router, SocketAddr> {
    router.into_make_service_with_connect_info::<SocketAddr>()
}

/// Peer address of the connection, empty when served without one.
fn remote_addr<B>(request: &Request<B>) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_default()
}

/// Main handler: gate, resolve and answer.
async fn redirect_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let host = request_host(&request);
    let path = request.uri().path();
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let remote = remote_addr(&request);

    let decision = dispatch(&state.table, host, request.uri());
    match &decision {
        Dispatch::Health => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ok",
                "version": env!("CARGO_PKG_VERSION"),
            })),
        )
            .into_response(),
        Dispatch::Metrics => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            state.metrics.render(),
        )
            .into_response(),
        Dispatch::NotFound => {
            tracing::info!(
                host = %host,
                path = %path,
                remote = %remote,
                user_agent = %user_agent,
                "No mapping for request"
            );
            metrics::record_not_found();
            StatusCode::NOT_FOUND.into_response()
        }
        Dispatch::Redirect { location, matched } => {
            tracing::info!(
                host = %host,
                path = %path,
                location = %location,
                remote = %remote,
                user_agent = %user_agent,
                "Redirecting"
            );
            metrics::record_redirect(matched.host, matched.pattern, decision.mode());
            (StatusCode::FOUND, [(header::LOCATION, location.clone())]).into_response()
        }
        Dispatch::Interstitial { matched } => match state.pages.render(&matched.entry.redirect) {
            Ok(page) => {
                tracing::info!(
                    host = %host,
                    path = %path,
                    target = %matched.entry.redirect,
                    remote = %remote,
                    user_agent = %user_agent,
                    "Serving interstitial page"
                );
                metrics::record_redirect(matched.host, matched.pattern, decision.mode());
                Html(page).into_response()
            }
            Err(e) => {
                tracing::error!(host = %host, path = %path, error = %e, "Failed to render interstitial page");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        },
    }
}
