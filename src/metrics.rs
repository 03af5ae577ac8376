// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the Konnekt operator.
//!
//! This module provides metrics collection with the namespace prefix
//! `konnekt_io_` (prometheus-safe version of "konnekt.io").
//!
//! # Metrics Categories
//!
//! - **Reconciliation Metrics** - Track reconciliation operations and their outcomes
//! - **Connect REST Metrics** - Track calls against the Connect REST API
//!
//! # Example
//!
//! ```rust,no_run
//! use konnekt::metrics::{record_reconciliation, render};
//!
//! record_reconciliation("KafkaConnect", "success", std::time::Duration::from_secs(1));
//! let exposition = render();
//! ```

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

/// Namespace prefix for all Konnekt metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "konnekt_io";

/// Global Prometheus metrics registry
///
/// All metrics are registered here and exposed via the `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Total number of reconciliations by resource type and outcome
///
/// Labels:
/// - `resource_type`: Kind of resource (`KafkaConnect`, `KafkaConnector`)
/// - `status`: Outcome (`success`, `error`)
pub static RECONCILIATION_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_reconciliations_total"),
        "Total number of reconciliations by resource type and outcome",
    );
    let counter = CounterVec::new(opts, &["resource_type", "status"])
        .expect("reconciliations_total metric definition is valid");
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .expect("reconciliations_total registers once");
    counter
});

/// Reconciliation duration in seconds by resource type
pub static RECONCILIATION_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
        "Reconciliation duration in seconds by resource type",
    )
    .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 60.0]);
    let histogram = HistogramVec::new(opts, &["resource_type"])
        .expect("reconciliation_duration metric definition is valid");
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .expect("reconciliation_duration registers once");
    histogram
});

/// Total number of Connect REST API requests by method and outcome
///
/// Labels:
/// - `method`: HTTP method (`GET`, `PUT`, `POST`, `DELETE`)
/// - `outcome`: `success` or `error` (after retries)
pub static CONNECT_API_REQUESTS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_connect_api_requests_total"),
        "Total number of Connect REST API requests by method and outcome",
    );
    let counter = CounterVec::new(opts, &["method", "outcome"])
        .expect("connect_api_requests_total metric definition is valid");
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .expect("connect_api_requests_total registers once");
    counter
});

/// Record one reconciliation outcome with its duration.
pub fn record_reconciliation(resource_type: &str, status: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, status])
        .inc();
    RECONCILIATION_DURATION
        .with_label_values(&[resource_type])
        .observe(duration.as_secs_f64());
}

/// Record one Connect REST API request outcome (after retries).
pub fn record_connect_api_request(method: &str, outcome: &str) {
    CONNECT_API_REQUESTS_TOTAL
        .with_label_values(&[method, outcome])
        .inc();
}

/// Render all registered metrics in the Prometheus text exposition format.
#[must_use]
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if encoder
        .encode(&METRICS_REGISTRY.gather(), &mut buffer)
        .is_err()
    {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
