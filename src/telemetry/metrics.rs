//! Prometheus metrics setup and metric definitions

use anyhow::{Context, Result};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering metrics.
pub fn install_prometheus_recorder() -> Result<PrometheusHandle> {
    // Upstream calls are slower than local handlers; keep buckets up to the provider timeout
    let buckets = [
        0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
    ];

    PrometheusBuilder::new()
        .set_buckets(&buckets)
        .context("failed to set histogram buckets")?
        .install_recorder()
        .context("failed to install Prometheus recorder")
}

/// Register metric descriptions and emit initial zero values so Prometheus output
/// includes HELP/TYPE lines for all metrics from startup.
pub fn describe_metrics() {
    describe_counter!("audial_http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "audial_http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_gauge!(
        "audial_http_requests_in_flight",
        "Number of HTTP requests currently being processed"
    );

    describe_counter!(
        "audial_token_exchange_total",
        "Token exchange requests by outcome"
    );
    describe_histogram!(
        "audial_upstream_request_duration_seconds",
        "Token provider and identity broker call duration in seconds"
    );

    counter!("audial_token_exchange_total", "result" => "success").absolute(0);
    gauge!("audial_http_requests_in_flight").set(0.0);
}
