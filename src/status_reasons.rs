// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Standard Kubernetes status condition reasons for Konnekt resources.
//!
//! This module defines constants for condition reasons following Kubernetes
//! conventions. Reasons are programmatic identifiers in CamelCase that explain
//! why a condition has a particular status.
//!
//! # Condition Hierarchy
//!
//! Konnekt tracks status at two levels:
//!
//! - **`KafkaConnect`** → aggregates the health of its `KafkaConnector` resources
//! - **`KafkaConnector`** → mirrors the live connector and task states reported
//!   by the Kafka Connect REST API
//!
//! All resources carry a single encompassing `type: Ready` condition.
//!
//! # Example Status
//!
//! ```yaml
//! status:
//!   conditions:
//!     - type: Ready
//!       status: "False"
//!       reason: TaskFailed
//!       message: "Task 1 is FAILED: org.apache.kafka.connect.errors.ConnectException: ..."
//! ```

// ============================================================================
// Common Reasons
// ============================================================================

/// The connector is RUNNING and no task is FAILED.
pub const REASON_CONNECTOR_READY: &str = "ConnectorReady";

/// The connector is not (yet) RUNNING.
pub const REASON_CONNECTOR_NOT_READY: &str = "ConnectorNotReady";

/// The connector is paused, matching the desired state.
pub const REASON_CONNECTOR_PAUSED: &str = "ConnectorPaused";

/// One or more connector tasks reported FAILED.
pub const REASON_TASK_FAILED: &str = "TaskFailed";

/// The desired configuration is invalid and requires a spec edit.
pub const REASON_INVALID_SPEC: &str = "InvalidSpec";

/// The Kafka Connect REST cluster could not be reached.
pub const REASON_CONNECT_UNAVAILABLE: &str = "ConnectUnavailable";

/// A concurrent writer kept updating the resource while the controller was
/// trying to publish status; all bounded retries were exhausted.
pub const REASON_STATUS_CONFLICT: &str = "StatusConflict";

// ============================================================================
// Assembly (KafkaConnect) Reasons
// ============================================================================

/// All connectors owned by the cluster are ready.
pub const REASON_ALL_CONNECTORS_READY: &str = "AllConnectorsReady";

/// Some but not all connectors owned by the cluster are ready.
pub const REASON_PARTIALLY_READY: &str = "PartiallyReady";

/// No connector owned by the cluster is ready.
pub const REASON_NONE_READY: &str = "NoneReady";

/// The cluster owns no connector resources.
pub const REASON_NO_CONNECTORS: &str = "NoConnectors";

/// Listing the cluster's connector resources failed.
pub const REASON_LIST_FAILED: &str = "ListFailed";

// ============================================================================
// Connect REST API Reasons
// ============================================================================

/// The Connect REST API rejected the request as malformed (HTTP 400).
pub const REASON_CONNECT_BAD_REQUEST: &str = "ConnectBadRequest";

/// The named connector does not exist on the Connect cluster (HTTP 404).
pub const REASON_CONNECTOR_NOT_FOUND: &str = "ConnectorNotFound";

/// The Connect cluster is rebalancing and cannot serve the request (HTTP 409).
pub const REASON_REBALANCE_IN_PROGRESS: &str = "RebalanceInProgress";

/// The Connect REST API reported an internal error (HTTP 500).
pub const REASON_CONNECT_INTERNAL_ERROR: &str = "ConnectInternalError";

/// A gateway between the operator and the Connect cluster failed (HTTP 502/503/504).
pub const REASON_GATEWAY_ERROR: &str = "GatewayError";

#[cfg(test)]
#[path = "status_reasons_tests.rs"]
mod status_reasons_tests;
