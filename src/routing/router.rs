//! Entry lookup.
//!
//! # Responsibilities
//! - Find the rules of the requested host
//! - Apply the fallback chain: exact path, then `/`, then `*`
//! - Return the matched entry or an explicit no-match
//!
//! # Design Decisions
//! - Immutable table, no locks on the read path
//! - O(log n) lookups on sorted maps
//! - An explicit `/` always wins over `*`

use crate::config::schema::{Entry, MappingTable, ROOT_PATH, WILDCARD_PATH};

/// A rule picked for a request.
///
/// `host` and `pattern` borrow the table keys, never the request, so they
/// only take values the mapping file defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    pub host: &'a str,
    /// Key the entry was found under: the exact path, `/` or `*`.
    pub pattern: &'a str,
    pub entry: &'a Entry,
}

/// Resolve `host` and `path` against the table.
///
/// `path` is the request path without query string. `None` means the
/// request is not mapped and should be answered with a 404.
pub fn resolve<'a>(table: &'a MappingTable, host: &str, path: &str) -> Option<Match<'a>> {
    let (host, host_map) = table.host_key_value(host)?;

    [path, ROOT_PATH, WILDCARD_PATH]
        .into_iter()
        .filter_map(|key| host_map.get_key_value(key))
        .find(|(_, entry)| entry.has_target())
        .map(|(pattern, entry)| Match {
            host,
            pattern,
            entry,
        })
}
