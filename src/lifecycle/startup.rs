//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate the mapping file and the page template
//! - Initialize logging, metrics and TLS in dependency order
//! - Bind the listener and serve until a shutdown signal
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and maps to an exit code
//! - The listener is bound last (traffic only when ready)

use std::net::{AddrParseError, SocketAddr};

use metrics_exporter_prometheus::{BuildError, PrometheusHandle};
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::loader::{load_mapping, ConfigError};
use crate::config::schema::RedirectorConfig;
use crate::http::page::{PageError, PageRenderer};
use crate::http::server::{AppState, HttpServer};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::spawn_signal_listener;
use crate::net::tls::{load_tls_config, TlsError};
use crate::observability::logging::{init_logging, LoggingError};
use crate::observability::metrics::init_metrics;

pub const EXIT_EXECUTION_FAILURE: i32 = 1;
pub const EXIT_BAD_ADDRESS: i32 = 3;
pub const EXIT_TEMPLATE_NOT_FOUND: i32 = 5;
pub const EXIT_TEMPLATE_ERROR: i32 = 6;
pub const EXIT_BAD_MAPPING_FILE: i32 = 7;
pub const EXIT_INVALID_LOG_LEVEL: i32 = 8;
pub const EXIT_METRICS_ISSUE: i32 = 9;
pub const EXIT_TLS_ERROR: i32 = 10;

/// Anything that stops the redirector from serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error("bad mapping file: {0}")]
    Mapping(#[from] ConfigError),

    #[error(transparent)]
    Template(#[from] PageError),

    #[error("failed to install metrics recorder: {0}")]
    Metrics(#[from] BuildError),

    #[error(transparent)]
    Tls(#[from] TlsError),

    #[error("invalid bind address '{address}': {source}")]
    Address {
        address: String,
        #[source]
        source: AddrParseError,
    },

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

impl StartupError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            StartupError::Logging(_) => EXIT_INVALID_LOG_LEVEL,
            StartupError::Mapping(_) => EXIT_BAD_MAPPING_FILE,
            StartupError::Template(PageError::NotFound { .. }) => EXIT_TEMPLATE_NOT_FOUND,
            StartupError::Template(PageError::Template(_)) => EXIT_TEMPLATE_ERROR,
            StartupError::Metrics(_) => EXIT_METRICS_ISSUE,
            StartupError::Tls(_) => EXIT_TLS_ERROR,
            StartupError::Address { .. } | StartupError::Bind { .. } => EXIT_BAD_ADDRESS,
            StartupError::Serve(_) => EXIT_EXECUTION_FAILURE,
        }
    }
}

/// Load the mapping table and the page template, then install metrics and
/// build the server.
///
/// `install_metrics` only runs once both files are accepted.
pub fn build_server<F>(config: RedirectorConfig, install_metrics: F) -> Result<HttpServer, StartupError>
where
    F: FnOnce() -> Result<PrometheusHandle, BuildError>,
{
    let table = load_mapping(&config.mapping_path)?;
    tracing::info!(
        path = %config.mapping_path.display(),
        hosts = table.len(),
        entries = table.entry_count(),
        "Loaded redirect mappings"
    );

    let pages = PageRenderer::load(config.template_path.as_deref())?;
    let metrics = install_metrics()?;

    Ok(HttpServer::new(config, AppState::new(table, pages, metrics)))
}

/// Run the redirector until a termination signal.
pub async fn start(config: RedirectorConfig) -> Result<(), StartupError> {
    init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "simple-redirector starting");

    let tls_settings = config.listener.tls.clone();
    let bind_address = config.listener.bind_address.clone();
    let server = build_server(config, init_metrics)?;
    let tls = match &tls_settings {
        Some(tls) => Some(load_tls_config(tls).await?),
        None => None,
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    spawn_signal_listener(&shutdown);

    match tls {
        Some(tls) => {
            let addr: SocketAddr = bind_address.parse().map_err(|source| StartupError::Address {
                address: bind_address.clone(),
                source,
            })?;
            server
                .run_tls(addr, tls, server_shutdown)
                .await
                .map_err(StartupError::Serve)?;
        }
        None => {
            let listener = TcpListener::bind(&bind_address)
                .await
                .map_err(|source| StartupError::Bind {
                    address: bind_address.clone(),
                    source,
                })?;
            server
                .run(listener, server_shutdown)
                .await
                .map_err(StartupError::Serve)?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
