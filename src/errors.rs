// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation and Connect REST API error types for Konnekt.
//!
//! This module provides specialized error types for:
//! - Transport-level failures talking to the Kafka Connect REST API
//! - Per-connector reconciliation failures surfaced in status conditions
//! - Assembly-level aggregation failures
//! - Status store conflicts
//!
//! These errors provide structured error handling for reconciliation,
//! enabling accurate status conditions and retry decisions: an
//! [`ConnectorError::InvalidSpec`] is never retried automatically, while a
//! [`ConnectorError::ConnectUnavailable`] is retried on the next trigger.

use thiserror::Error;

/// Errors from the Kafka Connect REST client.
///
/// These represent failures at the HTTP boundary, before any reconciliation
/// semantics are applied. The reconciler maps them into [`ConnectorError`].
#[derive(Error, Debug)]
pub enum ConnectError {
    /// The Connect cluster endpoint could not be reached at all.
    ///
    /// Covers connection refusals, DNS failures and timeouts. Transient by
    /// nature; the reconciliation pass surfaces it and the next trigger retries.
    #[error("Connect REST API at {endpoint} unreachable: {reason}")]
    Unreachable {
        /// The Connect REST endpoint that could not be reached
        endpoint: String,
        /// Underlying transport error text
        reason: String,
    },

    /// The Connect REST API answered with a non-success HTTP status.
    ///
    /// The status code is preserved so callers can distinguish permanent
    /// rejections (400) from conditions like a rebalance in progress (409).
    #[error("Connect REST API returned HTTP {status}: {message}")]
    Api {
        /// HTTP status code returned by the Connect REST API
        status: u16,
        /// Response body, as returned by the API
        message: String,
    },

    /// The Connect REST API returned a payload the client could not decode.
    #[error("Unexpected payload from Connect REST API: {reason}")]
    UnexpectedPayload {
        /// What failed to decode
        reason: String,
    },
}

impl ConnectError {
    /// HTTP status code carried by this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ConnectError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error means "the connector does not exist" (HTTP 404).
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Per-connector reconciliation failures.
///
/// This is the error taxonomy surfaced in connector status conditions.
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// The desired configuration is invalid and can never converge.
    ///
    /// Never retried automatically; the resource owner must edit the spec.
    #[error("Invalid connector spec for '{connector}': {reason}")]
    InvalidSpec {
        /// Connector name
        connector: String,
        /// What is invalid about the spec
        reason: String,
    },

    /// The Connect cluster could not be reached or refused service.
    ///
    /// Surfaced, not retried within the pass; the next trigger retries.
    #[error("Connect cluster unavailable while reconciling '{connector}': {reason}")]
    ConnectUnavailable {
        /// Connector name
        connector: String,
        /// Underlying failure text
        reason: String,
        /// HTTP status returned by the REST API, when the failure got that far
        status: Option<u16>,
    },

    /// Bounded status-write retries were exhausted by concurrent writers.
    #[error("Status conflict for '{connector}' after {attempts} attempts")]
    StatusConflict {
        /// Connector name
        connector: String,
        /// Number of write attempts made
        attempts: u32,
    },

    /// The resource status store failed for a reason other than a conflict.
    #[error("Status store failure for '{connector}': {source}")]
    Store {
        /// Connector name
        connector: String,
        /// Underlying store error
        #[source]
        source: StoreError,
    },
}

impl ConnectorError {
    /// Condition reason constant for this failure class.
    ///
    /// Unavailability that carries an HTTP status maps through
    /// [`crate::http_errors::map_http_error_to_reason`] so a 409 rebalance
    /// reads differently from a dead gateway in the resource conditions.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            ConnectorError::InvalidSpec { .. } => crate::status_reasons::REASON_INVALID_SPEC,
            ConnectorError::ConnectUnavailable {
                status: Some(code), ..
            } => crate::http_errors::map_http_error_to_reason(*code).0,
            ConnectorError::ConnectUnavailable { status: None, .. } => {
                crate::status_reasons::REASON_CONNECT_UNAVAILABLE
            }
            ConnectorError::StatusConflict { .. } => crate::status_reasons::REASON_STATUS_CONFLICT,
            ConnectorError::Store { .. } => crate::status_reasons::REASON_STATUS_CONFLICT,
        }
    }
}

/// Assembly-level reconciliation failures.
#[derive(Error, Debug)]
pub enum AssemblyError {
    /// One or more connectors failed while their siblings converged.
    ///
    /// The assembly pass as a whole is reported failed so the trigger is
    /// requeued, but successfully reconciled connectors are not rolled back.
    #[error("{failed} of {total} connectors failed to reconcile for '{cluster}'")]
    PartialFailure {
        /// KafkaConnect cluster name
        cluster: String,
        /// Number of connectors that failed
        failed: usize,
        /// Total number of connectors reconciled
        total: usize,
    },

    /// Enumerating the cluster's connector resources failed.
    #[error("Failed to list connectors for '{cluster}': {reason}")]
    ListFailed {
        /// KafkaConnect cluster name
        cluster: String,
        /// Underlying failure text
        reason: String,
    },

    /// Writing the cluster-level status failed.
    #[error("Failed to update status for '{cluster}': {source}")]
    Status {
        /// KafkaConnect cluster name
        cluster: String,
        /// Underlying store error
        #[source]
        source: StoreError,
    },
}

/// Errors from the resource status store.
///
/// [`StoreError::Conflict`] is the optimistic-concurrency signal: the stored
/// resource version changed between read and write, so the write was rejected
/// and must be retried against a fresh read.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The stored resource version changed since the read this write is based on.
    #[error("Version conflict writing status for {namespace}/{name}")]
    Conflict {
        /// Resource namespace
        namespace: String,
        /// Resource name
        name: String,
    },

    /// The resource no longer exists.
    #[error("Resource {namespace}/{name} not found")]
    NotFound {
        /// Resource namespace
        namespace: String,
        /// Resource name
        name: String,
    },

    /// Any other Kubernetes API failure.
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    /// The resource could not be serialized for the write.
    #[error("Failed to serialize resource: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
