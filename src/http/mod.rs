//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → dispatch.rs (host gate, resolve, decide)
//!     → page.rs (interstitial rendering when needed)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod page;
pub mod request;
pub mod server;

pub use dispatch::{dispatch, Dispatch, HEALTH_PATH, METRICS_PATH};
pub use page::{PageError, PageRenderer};
pub use request::{request_id, MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
