//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Count error page requests and measure their latency
//! - Expose Prometheus-compatible metrics text for `/metrics`
//!
//! # Metrics
//! - `default_http_backend_http_request_count_total` (counter): requests by protocol
//! - `default_http_backend_http_request_duration_seconds` (histogram): latency by protocol
//!
//! # Design Decisions
//! - The sink is an injected object, not a global recorder, so tests can
//!   swap in their own
//! - Recording happens after the inner handler returns, whatever it answered
//! - Histogram buckets start at 1ms; rendering a page is usually sub-10ms

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Request, Version},
    middleware::Next,
    response::Response,
};
use metrics_exporter_prometheus::{
    BuildError, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder,
};

pub const REQUEST_COUNT: &str = "default_http_backend_http_request_count_total";
pub const REQUEST_DURATION: &str = "default_http_backend_http_request_duration_seconds";

pub const DURATION_BUCKETS: &[f64] = &[
    0.001, 0.003, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Destination of the per-request measurements.
///
/// Implementations are shared by every in-flight request and must accumulate
/// concurrently without losing updates.
pub trait MetricsSink: Send + Sync {
    fn increment_counter(&self, proto: &str);

    fn observe_histogram(&self, proto: &str, seconds: f64);

    /// Exposition text, if this sink can produce one.
    fn render(&self) -> Option<String> {
        None
    }
}

/// Sink backed by a private Prometheus recorder.
pub struct PrometheusSink {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
}

impl PrometheusSink {
    pub fn new() -> Result<Self, BuildError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(Matcher::Full(REQUEST_DURATION.to_string()), DURATION_BUCKETS)?
            .build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            metrics::describe_counter!(REQUEST_COUNT, "Counter of HTTP requests made.");
            metrics::describe_histogram!(
                REQUEST_DURATION,
                metrics::Unit::Seconds,
                "Histogram of the time (in seconds) each request took."
            );
        });

        Ok(Self { recorder, handle })
    }
}

impl MetricsSink for PrometheusSink {
    fn increment_counter(&self, proto: &str) {
        metrics::with_local_recorder(&self.recorder, || {
            metrics::counter!(REQUEST_COUNT, "proto" => proto.to_owned()).increment(1);
        });
    }

    fn observe_histogram(&self, proto: &str, seconds: f64) {
        metrics::with_local_recorder(&self.recorder, || {
            metrics::histogram!(REQUEST_DURATION, "proto" => proto.to_owned()).record(seconds);
        });
    }

    fn render(&self) -> Option<String> {
        Some(self.handle.render())
    }
}

/// Sink used when metrics are disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn increment_counter(&self, _proto: &str) {}

    fn observe_histogram(&self, _proto: &str, _seconds: f64) {}
}

/// "major.minor" label for an HTTP version.
pub fn protocol_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_11 => "1.1",
        Version::HTTP_2 => "2.0",
        Version::HTTP_3 => "3.0",
        _ => "unknown",
    }
}

/// Middleware recording count and latency of every request it wraps.
///
/// Never touches the response.
pub async fn measure(
    State(sink): State<Arc<dyn MetricsSink>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let proto = protocol_label(request.version());

    let response = next.run(request).await;

    let seconds = start.elapsed().as_secs_f64();
    sink.increment_counter(proto);
    sink.observe_histogram(proto, seconds);

    response
}
