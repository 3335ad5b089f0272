//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request handling produces:
//!     → logging.rs (structured log events)
//!     → metrics.rs (redirect / not-found counters)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON lines)
//!     → localhost/metrics (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID on every request span
//! - A 404 is an expected outcome, logged at info

pub mod logging;
pub mod metrics;
