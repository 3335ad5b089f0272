//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (Host header, path)
//!     → host.rs (strip port, normalize authority)
//!     → router.rs (exact → root → wildcard lookup)
//!     → Return: matched Entry or no match
//! ```
//!
//! # Design Decisions
//! - Table built at startup, immutable at runtime
//! - Three map lookups per request, no pattern engine
//! - Deterministic: same input always resolves to the same entry

pub mod host;
pub mod router;

pub use host::{parse_host, request_host};
pub use router::{resolve, Match};
