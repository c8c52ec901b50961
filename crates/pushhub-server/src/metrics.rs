//! Prometheus metrics for the push server.
//!
//! - HTTP request count and latency, labelled by matched route
//! - Deliveries by outcome and source (on-demand send vs. sweep)
//! - Subscriptions created and removed
//! - Sweep ticks by result

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

/// Global Prometheus handle for rendering metrics.
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

    // Push metrics
    pub const PUSH_DELIVERIES_TOTAL: &str = "push_deliveries_total";
    pub const PUSH_SUBSCRIPTIONS_CREATED_TOTAL: &str = "push_subscriptions_created_total";
    pub const PUSH_SUBSCRIPTIONS_REMOVED_TOTAL: &str = "push_subscriptions_removed_total";
    pub const PUSH_SWEEP_TICKS_TOTAL: &str = "push_sweep_ticks_total";
    pub const PUSH_SWEEP_DURATION_SECONDS: &str = "push_sweep_duration_seconds";
    pub const PUSH_SWEEP_LAST_ATTEMPTED: &str = "push_sweep_last_attempted";
}

/// Initialize the Prometheus metrics exporter.
///
/// Returns `true` if initialization succeeded, `false` if already initialized.
pub fn init_metrics() -> bool {
    if PROMETHEUS_HANDLE.get().is_some() {
        tracing::debug!("Prometheus metrics already initialized");
        return false;
    }

    // Pull-based: /metrics renders from the handle
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if PROMETHEUS_HANDLE.set(handle).is_err() {
                tracing::warn!("Failed to store Prometheus handle (already set)");
                return false;
            }

            tracing::info!("Prometheus metrics initialized");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Prometheus recorder");
            false
        }
    }
}

/// Render all metrics in Prometheus text format.
///
/// Returns `None` if metrics were not initialized.
pub fn render_metrics() -> Option<String> {
    PROMETHEUS_HANDLE.get().map(|handle| handle.render())
}

// =============================================================================
// HTTP Metrics
// =============================================================================

/// Record an HTTP request. `route` is the matched route template, so ids
/// never become label values.
pub fn record_http_request(method: &str, route: &str, status: u16, duration: Duration) {
    counter!(
        names::HTTP_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "path" => route.to_string(),
        "status" => status.to_string(),
        "status_class" => status_class(status)
    )
    .increment(1);

    histogram!(
        names::HTTP_REQUEST_DURATION_SECONDS,
        "method" => method.to_string(),
        "path" => route.to_string()
    )
    .record(duration.as_secs_f64());
}

fn status_class(status: u16) -> &'static str {
    match status {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

// =============================================================================
// Push Metrics
// =============================================================================

/// Record one delivery attempt. `outcome` is `delivered`, `removed` or
/// `failed`; `source` is `on_demand` or `sweep`.
pub fn record_delivery(outcome: &'static str, source: &'static str) {
    counter!(
        names::PUSH_DELIVERIES_TOTAL,
        "outcome" => outcome,
        "source" => source
    )
    .increment(1);
}

pub fn record_subscription_created() {
    counter!(names::PUSH_SUBSCRIPTIONS_CREATED_TOTAL).increment(1);
}

pub fn record_subscription_removed() {
    counter!(names::PUSH_SUBSCRIPTIONS_REMOVED_TOTAL).increment(1);
}

/// Record a sweep tick. `result` is `ok`, `error` or `skipped`.
pub fn record_sweep_tick(result: &'static str, duration: Option<Duration>) {
    counter!(names::PUSH_SWEEP_TICKS_TOTAL, "result" => result).increment(1);
    if let Some(duration) = duration {
        histogram!(names::PUSH_SWEEP_DURATION_SECONDS).record(duration.as_secs_f64());
    }
}

pub fn record_sweep_attempted(attempted: usize) {
    gauge!(names::PUSH_SWEEP_LAST_ATTEMPTED).set(attempted as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_class() {
        assert_eq!(status_class(201), "2xx");
        assert_eq!(status_class(404), "4xx");
        assert_eq!(status_class(410), "4xx");
        assert_eq!(status_class(500), "5xx");
        assert_eq!(status_class(99), "other");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_delivery("delivered", "sweep");
        record_sweep_tick("skipped", None);
        record_http_request("GET", "/healthz", 200, Duration::from_millis(3));
    }
}
