//! Mapping validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Path patterns are `*` or absolute request paths
//! - Redirect targets are absolute `https` URIs, sent byte for byte as
//!   `Location`, so whitespace and control characters are refused
//! - Table level rules (non-empty, `localhost` reserved)
//!
//! # Design Decisions
//! - Validation is a pure function over the parsed maps
//! - Keys are visited in lexicographic order and the first failure is
//!   returned, so the reported error is reproducible
//! - Runs before a table is accepted into the system

use std::collections::BTreeMap;
use std::str::FromStr;

use axum::http::uri::PathAndQuery;
use thiserror::Error;
use url::Url;

use crate::config::schema::{Entry, HostMap, RESERVED_HOST, WILDCARD_PATH};

/// A mapping rule that cannot be served.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("found empty string as path")]
    EmptyPath,

    #[error("path [{path}] must be prefixed with '/' or be '*', relative paths are not accepted")]
    InvalidPathPrefix { path: String },

    #[error("path [{path}] is not a valid request path: {reason}")]
    MalformedPath { path: String, reason: String },

    #[error("redirect [{redirect}] for path [{path}] is not an absolute URI: {reason}")]
    MalformedRedirectUri {
        path: String,
        redirect: String,
        reason: String,
    },

    #[error("redirect [{redirect}] for path [{path}] uses scheme '{scheme}', only 'https' is allowed")]
    DisallowedScheme {
        path: String,
        redirect: String,
        scheme: String,
    },

    #[error("mapping file is empty or has no entries")]
    EmptyMappingTable,

    #[error("host '{host}' is reserved and cannot be mapped")]
    ReservedHost { host: String },
}

/// Check a single path rule.
pub fn validate_entry(path: &str, entry: &Entry) -> Result<(), ValidationError> {
    if path.is_empty() {
        return Err(ValidationError::EmptyPath);
    }

    if path != WILDCARD_PATH {
        if !path.starts_with('/') {
            return Err(ValidationError::InvalidPathPrefix {
                path: path.to_string(),
            });
        }
        PathAndQuery::from_str(path).map_err(|e| ValidationError::MalformedPath {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
    }

    // The URL parser strips tabs and newlines and trims spaces, so it would
    // accept targets that cannot be sent as a header value.
    if let Some(c) = entry
        .redirect
        .chars()
        .find(|c| c.is_control() || c.is_whitespace())
    {
        return Err(ValidationError::MalformedRedirectUri {
            path: path.to_string(),
            redirect: entry.redirect.clone(),
            reason: format!("contains forbidden character {c:?}"),
        });
    }

    let uri = Url::parse(&entry.redirect).map_err(|e| ValidationError::MalformedRedirectUri {
        path: path.to_string(),
        redirect: entry.redirect.clone(),
        reason: e.to_string(),
    })?;

    if uri.scheme() != "https" {
        return Err(ValidationError::DisallowedScheme {
            path: path.to_string(),
            redirect: entry.redirect.clone(),
            scheme: uri.scheme().to_string(),
        });
    }

    tracing::debug!(path = %path, redirect = %entry.redirect, immediate = entry.immediate, "Parsed redirect");
    Ok(())
}

/// Check every rule of a host, in key order.
pub fn validate_host_map(host_map: &HostMap) -> Result<(), ValidationError> {
    host_map
        .iter()
        .try_for_each(|(path, entry)| validate_entry(path, entry))
}

/// Check the whole host → rules map.
pub fn validate_table(hosts: &BTreeMap<String, HostMap>) -> Result<(), ValidationError> {
    if hosts.is_empty() {
        return Err(ValidationError::EmptyMappingTable);
    }

    // Reserved host first so it wins over any rule error inside other hosts.
    if hosts.contains_key(RESERVED_HOST) {
        return Err(ValidationError::ReservedHost {
            host: RESERVED_HOST.to_string(),
        });
    }

    hosts.values().try_for_each(validate_host_map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(redirect: &str) -> Entry {
        Entry::immediate(redirect)
    }

    #[test]
    fn test_accepts_valid_paths() {
        for path in ["/", "/pathA", "/a/b/c", "/with?query=1", "*"] {
            assert_eq!(validate_entry(path, &entry("https://127.0.0.1")), Ok(()), "path {path}");
        }
    }

    #[test]
    fn test_rejects_bad_mappings() {
        let bad = [
            ("", "https://127.0.0.1"),
            ("pathA", "://127.0.0.1"),
            ("pathA", "https://127.0.0.1"),
            ("/pathA", "http://127.0.0.1"),
            ("/pathA", "ftp://127.0.0.1"),
            ("/pathA", "ftp//127.0.0.1"),
            ("/pathA", "ftp//127.0.0./?"),
            ("/\x7f#fragment", "https://127.0.0.1"),
            ("/pathA", ""),
            ("/pathA", "https://exa\nmple.com"),
            ("/pathA", "https://example.com/\tpath"),
            ("/pathA", "https://example.com/\r\nSet-Cookie: a=b"),
            ("/pathA", " https://example.com"),
            ("/pathA", "https://example.com "),
            ("/pathA", "https://example.com/a b"),
            ("/pathA", "https://example.com/\x00"),
            ("/pathA", "https://example.com/\x7f"),
        ];

        for (index, (path, redirect)) in bad.iter().enumerate() {
            assert!(
                validate_entry(path, &entry(redirect)).is_err(),
                "bad mapping {index} ({path:?} -> {redirect:?}) was accepted"
            );
        }
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            validate_entry("", &entry("https://a.example")),
            Err(ValidationError::EmptyPath)
        );
        assert!(matches!(
            validate_entry("relative", &entry("https://a.example")),
            Err(ValidationError::InvalidPathPrefix { .. })
        ));
        assert!(matches!(
            validate_entry("/bad path", &entry("https://a.example")),
            Err(ValidationError::MalformedPath { .. })
        ));
        assert!(matches!(
            validate_entry("/ok", &entry("not a uri")),
            Err(ValidationError::MalformedRedirectUri { .. })
        ));
        assert!(matches!(
            validate_entry("/ok", &entry("http://a.example")),
            Err(ValidationError::DisallowedScheme { scheme, .. }) if scheme == "http"
        ));
    }

    #[test]
    fn test_whitespace_in_target_is_malformed() {
        match validate_entry("/x", &entry("https://exa\nmple.com")) {
            Err(ValidationError::MalformedRedirectUri { redirect, reason, .. }) => {
                assert_eq!(redirect, "https://exa\nmple.com");
                assert!(reason.contains("'\\n'"), "{reason}");
            }
            other => panic!("unexpected result {other:?}"),
        }
        assert!(matches!(
            validate_entry("*", &entry("https://example.com\t")),
            Err(ValidationError::MalformedRedirectUri { .. })
        ));
    }

    #[test]
    fn test_wildcard_skips_path_checks_but_not_redirect() {
        assert_eq!(validate_entry("*", &entry("https://a.example")), Ok(()));
        assert!(matches!(
            validate_entry("*", &entry("http://a.example")),
            Err(ValidationError::DisallowedScheme { .. })
        ));
    }

    #[test]
    fn test_host_map_reports_first_error_in_key_order() {
        let map: HostMap = [
            ("/zzz", entry("http://z.example")),
            ("/aaa", entry("ftp://a.example")),
            ("/mmm", entry("https://m.example")),
        ]
        .into_iter()
        .collect();

        for _ in 0..3 {
            match validate_host_map(&map) {
                Err(ValidationError::DisallowedScheme { path, .. }) => assert_eq!(path, "/aaa"),
                other => panic!("unexpected result {other:?}"),
            }
        }
    }

    #[test]
    fn test_table_rules() {
        assert_eq!(
            validate_table(&BTreeMap::new()),
            Err(ValidationError::EmptyMappingTable)
        );

        let mut hosts = BTreeMap::new();
        hosts.insert(
            "localhost".to_string(),
            [("/", entry("https://a.example"))].into_iter().collect::<HostMap>(),
        );
        assert_eq!(
            validate_table(&hosts),
            Err(ValidationError::ReservedHost {
                host: "localhost".into()
            })
        );
    }
}
