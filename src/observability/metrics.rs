//! Metrics collection and exposition.
//!
//! # Metrics
//! - `redirector_redirects_total` (counter): answered redirects by mapped host,
//!   matched pattern and mode
//! - `redirector_not_found_total` (counter): unmatched requests
//!
//! Labels only carry keys of the mapping table, so the number of series is
//! bounded by the mapping file whatever clients send.
//!
//! The exposition is served by the dispatcher on `localhost/metrics`, so
//! the recorder is installed without its own HTTP listener.

use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

pub const REDIRECTS_TOTAL: &str = "redirector_redirects_total";
pub const NOT_FOUND_TOTAL: &str = "redirector_not_found_total";

/// Install the global Prometheus recorder and return its render handle.
///
/// Can only succeed once per process.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_counter!(REDIRECTS_TOTAL, "The number of redirects served");
    describe_counter!(NOT_FOUND_TOTAL, "The number of requests without a mapping");

    tracing::info!("Prometheus recorder installed");
    Ok(handle)
}

/// Handle of a recorder that is not installed globally.
///
/// Renders an empty exposition; used when metrics are not wanted and in tests.
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

/// Record a redirect answered with `mode` (immediate or interstitial).
///
/// `host` and `pattern` must be the table keys the rule was found under.
pub fn record_redirect(host: &str, pattern: &str, mode: &'static str) {
    counter!(
        REDIRECTS_TOTAL,
        "host" => host.to_owned(),
        "pattern" => pattern.to_owned(),
        "mode" => mode
    )
    .increment(1);
}

/// Record a request that matched no rule.
pub fn record_not_found() {
    counter!(NOT_FOUND_TOTAL).increment(1);
}
