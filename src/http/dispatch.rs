//! Request dispatch decisions.
//!
//! # Responsibilities
//! - Gate operational endpoints behind the reserved host
//! - Resolve every other request against the mapping table
//! - Decide the response shape: redirect, interstitial page or 404
//!
//! # Request States
//! ```text
//! Init → HostGate ─ localhost ─→ Health | Metrics | NotFound
//!            └────── other ───→ Resolve → Redirect | Interstitial | NotFound
//! ```
//!
//! The decision is a pure function; `server.rs` turns it into a response.

use axum::http::Uri;

use crate::config::schema::{MappingTable, RESERVED_HOST};
use crate::routing::{resolve, Match};

/// Liveness endpoint, served on the reserved host only.
pub const HEALTH_PATH: &str = "/healthy";

/// Prometheus endpoint, served on the reserved host only.
pub const METRICS_PATH: &str = "/metrics";

/// What to answer a request with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch<'a> {
    /// 200 from the liveness endpoint.
    Health,
    /// 200 with the Prometheus exposition.
    Metrics,
    /// 404 without body.
    NotFound,
    /// 302 to `location`.
    Redirect { location: String, matched: Match<'a> },
    /// 200 with the rendered page pointing at the entry target.
    Interstitial { matched: Match<'a> },
}

impl Dispatch<'_> {
    /// Label used for logs and metrics.
    pub fn mode(&self) -> &'static str {
        match self {
            Dispatch::Health => "health",
            Dispatch::Metrics => "metrics",
            Dispatch::NotFound => "not_found",
            Dispatch::Redirect { .. } => "immediate",
            Dispatch::Interstitial { .. } => "interstitial",
        }
    }
}

/// Decide how to answer a request for `uri` on `host` (port already stripped).
pub fn dispatch<'a>(table: &'a MappingTable, host: &str, uri: &Uri) -> Dispatch<'a> {
    let path = uri.path();

    if host == RESERVED_HOST {
        return match path {
            HEALTH_PATH => Dispatch::Health,
            METRICS_PATH => Dispatch::Metrics,
            _ => Dispatch::NotFound,
        };
    }

    match resolve(table, host, path) {
        None => Dispatch::NotFound,
        Some(matched) if matched.entry.immediate => Dispatch::Redirect {
            location: redirect_location(&matched.entry.redirect, uri),
            matched,
        },
        Some(matched) => Dispatch::Interstitial { matched },
    }
}

/// Target followed by the original path and query, without doubling the slash.
pub fn redirect_location(target: &str, uri: &Uri) -> String {
    let suffix = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());

    match (target.strip_suffix('/'), suffix.starts_with('/')) {
        (Some(base), true) => format!("{base}{suffix}"),
        _ => format!("{target}{suffix}"),
    }
}
