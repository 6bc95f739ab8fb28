//! Prometheus metrics for classification, prediction, login and HTTP traffic.
//!
//! Metrics live in a process-wide registry; call [`init_metrics`] once at
//! startup and expose [`gather_metrics`] on the `/metrics` endpoint.
//!
//! # Example
//! ```no_run
//! use agrisense::metrics::CLASSIFICATIONS_TOTAL;
//!
//! CLASSIFICATIONS_TOTAL
//!     .with_label_values(&["temperature", "critical"])
//!     .inc();
//! ```

use crate::models::{Dimension, Tier};
use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use lazy_static::lazy_static;
use prometheus::{CounterVec, Histogram, HistogramOpts, HistogramVec, Opts, Registry};
use std::time::Instant;

const NAMESPACE: &str = "agrisense";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    /// Total number of HTTP requests received
    ///
    /// Labels: method, path, status_code
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests")
            .namespace(NAMESPACE),
        &["method", "path", "status_code"]
    ).expect("Failed to create HTTP_REQUESTS_TOTAL metric");

    /// HTTP request duration in seconds
    ///
    /// Labels: method, path
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
        &["method", "path"]
    ).expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric");

    /// Per-dimension rule classifications
    ///
    /// Labels: dimension, tier
    pub static ref CLASSIFICATIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("classifications_total", "Dimension classifications by resulting tier")
            .namespace(NAMESPACE),
        &["dimension", "tier"]
    ).expect("Failed to create CLASSIFICATIONS_TOTAL metric");

    /// Advisor requests
    ///
    /// Labels: strategy, outcome
    pub static ref PREDICTIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("predictions_total", "Recommendation requests by strategy")
            .namespace(NAMESPACE),
        &["strategy", "outcome"]
    ).expect("Failed to create PREDICTIONS_TOTAL metric");

    /// Login attempts
    ///
    /// Labels: outcome (success, failure)
    pub static ref LOGIN_ATTEMPTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("login_attempts_total", "Login attempts by outcome")
            .namespace(NAMESPACE),
        &["outcome"]
    ).expect("Failed to create LOGIN_ATTEMPTS_TOTAL metric");

    /// Time spent reading and decoding the model artifact
    pub static ref MODEL_LOAD_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "model_load_duration_seconds",
            "Model artifact load duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0])
    ).expect("Failed to create MODEL_LOAD_DURATION_SECONDS metric");
}

/// Register every metric with the global registry
pub fn init_metrics() -> Result<(), prometheus::Error> {
    PROMETHEUS_REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(CLASSIFICATIONS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(PREDICTIONS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(LOGIN_ATTEMPTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(MODEL_LOAD_DURATION_SECONDS.clone()))?;

    tracing::info!("Prometheus metrics initialized");
    Ok(())
}

/// Render the registry in Prometheus text format
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}

pub fn record_classification(dimension: Dimension, tier: Tier) {
    CLASSIFICATIONS_TOTAL
        .with_label_values(&[dimension.field_name(), &tier.to_string()])
        .inc();
}

pub fn record_prediction(strategy: &str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    PREDICTIONS_TOTAL.with_label_values(&[strategy, outcome]).inc();
}

pub fn record_login(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    LOGIN_ATTEMPTS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn observe_model_load(seconds: f64) {
    MODEL_LOAD_DURATION_SECONDS.observe(seconds);
}

/// Axum middleware recording request counts and latency per route
pub async fn track_http(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let started = Instant::now();
    let response = next.run(req).await;

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &path])
        .observe(started.elapsed().as_secs_f64());
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, response.status().as_str()])
        .inc();

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initialization() {
        // The registry is global, so a second registration in the same process fails
        let result = init_metrics();
        assert!(result.is_ok() || result.is_err());
    }

    #[test]
    fn test_classification_counter() {
        record_classification(Dimension::Ph, Tier::Critical);

        let value = CLASSIFICATIONS_TOTAL
            .with_label_values(&["ph", "critical"])
            .get();
        assert!(value >= 1.0);
    }

    #[test]
    fn test_login_counter() {
        record_login(false);
        assert!(LOGIN_ATTEMPTS_TOTAL.with_label_values(&["failure"]).get() >= 1.0);
    }

    #[test]
    fn test_gather_metrics() {
        let _ = init_metrics();
        record_prediction("rules", true);
        let metrics = gather_metrics();
        assert!(metrics.contains("agrisense_predictions_total"));
    }
}
