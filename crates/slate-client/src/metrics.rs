//! Client metrics collection.
//!
//! Standardized metrics for monitoring service calls:
//! - Request counters by operation and status
//! - Latency histograms
//! - Credential refresh counter

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Total service requests by operation and status.
    pub const REQUESTS_TOTAL: &str = "slate_requests_total";

    /// Request latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "slate_request_latency_seconds";

    /// Total credential refreshes (login calls).
    pub const CREDENTIAL_REFRESHES_TOTAL: &str = "slate_credential_refreshes_total";
}

/// Record metrics for a completed service request.
pub fn record_request(operation: &str, status: u16, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}

/// Record a credential refresh.
pub fn record_credential_refresh() {
    counter!(names::CREDENTIAL_REFRESHES_TOTAL).increment(1);
}
