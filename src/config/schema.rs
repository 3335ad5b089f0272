//! Configuration schema definitions.
//!
//! Two kinds of configuration live here:
//! - the redirect mapping document (`mapping:` → host → path → entry)
//! - the runtime settings of the server (listener, timeouts, logging)
//!
//! All types derive Serde traits for deserialization from config files.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::validation::{validate_table, ValidationError};

/// Path pattern matching any path of a host.
pub const WILDCARD_PATH: &str = "*";

/// Path pattern used as the per-host default.
pub const ROOT_PATH: &str = "/";

/// Host reserved for operational endpoints.
pub const RESERVED_HOST: &str = "localhost";

/// One path rule: where to send the client and how.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Entry {
    /// Absolute `https` URI to send the client to.
    #[serde(default)]
    pub redirect: String,

    /// Redirect with a 302 instead of rendering the interstitial page.
    /// Absent means `false`.
    #[serde(default)]
    pub immediate: bool,
}

impl Entry {
    pub fn new(redirect: impl Into<String>, immediate: bool) -> Self {
        Self {
            redirect: redirect.into(),
            immediate,
        }
    }

    /// An entry that renders the interstitial page.
    pub fn interstitial(redirect: impl Into<String>) -> Self {
        Self::new(redirect, false)
    }

    /// An entry answered with an immediate redirect.
    pub fn immediate(redirect: impl Into<String>) -> Self {
        Self::new(redirect, true)
    }

    pub(crate) fn has_target(&self) -> bool {
        !self.redirect.is_empty()
    }
}

/// Path pattern → entry rules of a single host.
///
/// Keys are kept sorted so iteration (and therefore validation) order
/// does not depend on the order of the source document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct HostMap {
    entries: BTreeMap<String, Entry>,
}

impl HostMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the rule for `path`.
    pub fn insert(&mut self, path: impl Into<String>, entry: Entry) -> Option<Entry> {
        self.entries.insert(path.into(), entry)
    }

    /// Rule stored under exactly `path`.
    pub fn get(&self, path: &str) -> Option<&Entry> {
        self.entries.get(path)
    }

    /// Rule stored under exactly `path`, with the key it is stored under.
    pub fn get_key_value(&self, path: &str) -> Option<(&str, &Entry)> {
        self.entries
            .get_key_value(path)
            .map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: Into<String>> FromIterator<(P, Entry)> for HostMap {
    fn from_iter<I: IntoIterator<Item = (P, Entry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(p, e)| (p.into(), e)).collect(),
        }
    }
}

/// Validated host → rules table.
///
/// Only obtainable through [`MappingTable::new`] (or the loader), so every
/// instance satisfies the table invariants. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingTable {
    hosts: BTreeMap<String, HostMap>,
}

impl MappingTable {
    /// Validate `hosts` and freeze it into a table.
    pub fn new(hosts: BTreeMap<String, HostMap>) -> Result<Self, ValidationError> {
        validate_table(&hosts)?;
        Ok(Self { hosts })
    }

    /// Rules of `host`, if the host is mapped.
    pub fn host(&self, host: &str) -> Option<&HostMap> {
        self.hosts.get(host)
    }

    /// Rules of `host` together with the host key as stored in the table.
    pub fn host_key_value(&self, host: &str) -> Option<(&str, &HostMap)> {
        self.hosts
            .get_key_value(host)
            .map(|(key, rules)| (key.as_str(), rules))
    }

    pub fn hosts(&self) -> btree_map::Iter<'_, String, HostMap> {
        self.hosts.iter()
    }

    /// Number of mapped hosts.
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Always false for a constructed table; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Number of path rules across all hosts.
    pub fn entry_count(&self) -> usize {
        self.hosts.values().map(HostMap::len).sum()
    }
}

/// On-disk shape of the mapping document.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MappingFile {
    /// Missing and empty (`mapping:`) both deserialize to `None`.
    #[serde(default)]
    pub mapping: Option<BTreeMap<String, HostMap>>,
}

/// Root runtime configuration of the redirector.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedirectorConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Mapping document to load at startup.
    pub mapping_path: PathBuf,

    /// Interstitial template replacing the built-in page.
    pub template_path: Option<PathBuf>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for RedirectorConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            mapping_path: PathBuf::from("./redirect-map.yml"),
            template_path: None,
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: PathBuf,

    /// Path to private key file (PEM).
    pub key_path: PathBuf,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
        }
    }
}
