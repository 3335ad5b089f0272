//! Host extraction.
//!
//! # Responsibilities
//! - Read the authority from the Host header (HTTP/1) or the URI (HTTP/2)
//! - Strip any `:port` suffix
//!
//! # Design Decisions
//! - Pure string processing, no name resolution
//! - No case folding: hosts are looked up exactly as configured
//! - Bracketed IPv6 literals keep their address, lose the port

use axum::http::{header, Request};

/// Hostname portion of an authority (`host[:port]`).
pub fn parse_host(authority: &str) -> &str {
    if let Some(rest) = authority.strip_prefix('[') {
        if let Some(end) = rest.find(']') {
            return &authority[..end + 2];
        }
        return authority;
    }

    match authority.split_once(':') {
        Some((host, _port)) => host,
        None => authority,
    }
}

/// Host a request is addressed to, port stripped. Empty when absent.
pub fn request_host<B>(req: &Request<B>) -> &str {
    let authority = req
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| req.uri().authority().map(|a| a.as_str()))
        .unwrap_or_default();

    parse_host(authority)
}
