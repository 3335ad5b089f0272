//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! mapping file (YAML/TOML/JSON)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → MappingTable (validated, immutable)
//!     → shared via Arc with every request handler
//! ```
//!
//! # Design Decisions
//! - The table is immutable once loaded; there is no reload
//! - Runtime settings have defaults to allow minimal invocations
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_mapping, parse_mapping, ConfigError, MappingFormat};
pub use schema::{
    Entry, HostMap, ListenerConfig, LogFormat, MappingTable, ObservabilityConfig,
    RedirectorConfig, TimeoutConfig, TlsConfig,
};
pub use validation::ValidationError;
