//! Store request metrics.

use metrics::{counter, histogram};

pub mod names {
    /// Store requests by backend, operation and outcome.
    pub const REQUESTS_TOTAL: &str = "clipper_store_requests_total";

    /// Store request latency in seconds by backend and operation.
    pub const LATENCY_SECONDS: &str = "clipper_store_latency_seconds";
}

/// Record one completed store request.
pub fn record_request(backend: &'static str, operation: &'static str, ok: bool, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "backend" => backend,
        "operation" => operation,
        "outcome" => if ok { "ok" } else { "error" }
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "backend" => backend,
        "operation" => operation
    )
    .record(latency_ms / 1000.0);
}
