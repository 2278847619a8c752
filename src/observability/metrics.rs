//! Metrics collection and exposition.
//!
//! # Metrics
//! - `stability_proxy_requests_total` (counter): by method, status, kind
//! - `stability_proxy_request_duration_seconds` (histogram): by kind
//! - `stability_proxy_probes_total` (counter): by outcome
//! - `stability_proxy_probe_duration_seconds` (histogram)
//!
//! `kind` is one of `admin`, `stabilized`, `direct`.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, kind: &'static str, start: Instant) {
    counter!(
        "stability_proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "kind" => kind
    )
    .increment(1);
    histogram!("stability_proxy_request_duration_seconds", "kind" => kind)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_probe(outcome: &'static str, start: Instant) {
    counter!("stability_proxy_probes_total", "outcome" => outcome).increment(1);
    histogram!("stability_proxy_probe_duration_seconds").record(start.elapsed().as_secs_f64());
}
