//! Host and path based HTTP redirector.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ net (TLS) ─▶ http::server ─▶ http::dispatch ─▶ routing
//!                                                       │              │
//!                                                       │   exact → / → *
//!                                                       ▼
//!     Client Response ◀── 302 Location | 200 interstitial page | 404
//!
//!     Cross-cutting: config (mapping table), observability, lifecycle
//! ```

pub mod cli;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::{Entry, HostMap, MappingTable, RedirectorConfig};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
