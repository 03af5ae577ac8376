// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the Konnekt operator.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for all Konnekt CRDs
pub const API_GROUP: &str = "kafka.konnekt.io";

/// API version for all Konnekt CRDs
pub const API_VERSION: &str = "v1alpha1";

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "kafka.konnekt.io/v1alpha1";

/// Kind name for the `KafkaConnect` resource
pub const KIND_KAFKA_CONNECT: &str = "KafkaConnect";

/// Kind name for the `KafkaConnector` resource
pub const KIND_KAFKA_CONNECTOR: &str = "KafkaConnector";

// ============================================================================
// Kafka Connect REST API Constants
// ============================================================================

/// Default Kafka Connect REST API port
pub const CONNECT_REST_PORT: u16 = 8083;

/// Reserved connector config key injected from `spec.className`
pub const CONFIG_KEY_CONNECTOR_CLASS: &str = "connector.class";

/// Reserved connector config key injected from `spec.tasksMax`
pub const CONFIG_KEY_TASKS_MAX: &str = "tasks.max";

/// Config key the Connect REST layer injects into stored configs.
/// Stripped before diffing desired against live configuration.
pub const CONFIG_KEY_NAME: &str = "name";

// ============================================================================
// Reconciliation Bounds
// ============================================================================

/// Maximum attempts for a status write before surfacing `StatusConflict`.
///
/// Each attempt re-reads the resource and recomputes the status against the
/// fresh copy, so a small bound is enough to ride out concurrent writers.
pub const MAX_STATUS_UPDATE_ATTEMPTS: u32 = 3;

/// Maximum restart calls issued per FAILED task within one reconciliation pass.
///
/// Restarting more than once per pass risks a restart loop against a task
/// that fails immediately on startup; further attempts happen on later passes.
pub const MAX_TASK_RESTARTS_PER_PASS: u32 = 1;

/// Maximum length of a task trace carried into a condition message.
pub const TRACE_MESSAGE_MAX_LEN: usize = 512;

// ============================================================================
// Requeue Intervals
// ============================================================================

/// Requeue interval when a resource is Ready (5 minutes)
pub const REQUEUE_READY_SECS: u64 = 300;

/// Requeue interval when a resource is not yet Ready (30 seconds)
pub const REQUEUE_NOT_READY_SECS: u64 = 30;
