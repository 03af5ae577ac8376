// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP error code mapping to Kubernetes status condition reasons.
//!
//! This module provides utilities for mapping HTTP status codes from the
//! Kafka Connect REST API to standardized Kubernetes condition reasons,
//! enabling consistent error reporting across the operator.
//!
//! # Usage
//!
//! ```rust
//! use konnekt::http_errors::map_http_error_to_reason;
//!
//! let (reason, message) = map_http_error_to_reason(404);
//! assert_eq!(reason, "ConnectorNotFound");
//!
//! let (reason, message) = map_http_error_to_reason(409);
//! assert_eq!(reason, "RebalanceInProgress");
//! ```

use crate::status_reasons::{
    REASON_CONNECT_BAD_REQUEST, REASON_CONNECT_INTERNAL_ERROR, REASON_CONNECT_UNAVAILABLE,
    REASON_CONNECTOR_NOT_FOUND, REASON_GATEWAY_ERROR, REASON_REBALANCE_IN_PROGRESS,
};

/// Map an HTTP status code from the Connect REST API to a condition reason
/// and a human-readable message.
///
/// # HTTP Code Mapping
///
/// | HTTP Code | Reason | Meaning |
/// |-----------|--------|---------|
/// | 400 | `ConnectBadRequest` | Invalid connector configuration or request |
/// | 404 | `ConnectorNotFound` | Connector or task not found |
/// | 409 | `RebalanceInProgress` | Cluster rebalancing, retry later |
/// | 500 | `ConnectInternalError` | Connect worker internal error |
/// | 502 | `GatewayError` | Bad gateway |
/// | 503 | `GatewayError` | Service unavailable |
/// | 504 | `GatewayError` | Gateway timeout |
/// | Other | `ConnectUnavailable` | Unexpected error |
#[must_use]
pub fn map_http_error_to_reason(status_code: u16) -> (&'static str, String) {
    match status_code {
        400 => (
            REASON_CONNECT_BAD_REQUEST,
            "Connect REST API rejected the request (400)".into(),
        ),
        404 => (
            REASON_CONNECTOR_NOT_FOUND,
            "Connector or task not found on the Connect cluster (404)".into(),
        ),
        409 => (
            REASON_REBALANCE_IN_PROGRESS,
            "Connect cluster is rebalancing (409)".into(),
        ),
        500 => (
            REASON_CONNECT_INTERNAL_ERROR,
            "Connect REST API internal error (500)".into(),
        ),
        502 => (
            REASON_GATEWAY_ERROR,
            "Bad gateway reaching the Connect cluster (502)".into(),
        ),
        503 => (
            REASON_GATEWAY_ERROR,
            "Connect REST API unavailable (503)".into(),
        ),
        504 => (
            REASON_GATEWAY_ERROR,
            "Gateway timeout reaching the Connect cluster (504)".into(),
        ),
        _ => (
            REASON_CONNECT_UNAVAILABLE,
            format!("Unexpected HTTP error from the Connect REST API ({status_code})"),
        ),
    }
}
