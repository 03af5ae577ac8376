// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) for Kafka Connect management.
//!
//! This module defines the Kubernetes Custom Resource Definitions used by
//! Konnekt to manage Kafka Connect clusters and their connectors declaratively.
//!
//! # Resource Types
//!
//! - [`KafkaConnect`] - A Kafka Connect cluster whose REST API the operator drives
//! - [`KafkaConnector`] - A single connector running inside a Connect cluster
//!
//! A `KafkaConnector` belongs to a `KafkaConnect` cluster through the
//! `kafka.konnekt.io/cluster` label on its metadata. The operator never
//! mutates specs; it only reads them and writes status back.
//!
//! # Example: Declaring a Connector
//!
//! ```rust,no_run
//! use konnekt::crd::KafkaConnectorSpec;
//! use std::collections::BTreeMap;
//!
//! let mut config = BTreeMap::new();
//! config.insert("topics".to_string(), serde_json::json!("my-topic"));
//!
//! let spec = KafkaConnectorSpec {
//!     class_name: "org.apache.kafka.connect.file.FileStreamSourceConnector".to_string(),
//!     tasks_max: 1,
//!     config: Some(config),
//!     pause: None,
//! };
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Condition represents an observation of a resource's current state.
///
/// Conditions are used in status subresources to communicate the state of
/// a resource to users and controllers.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition. Common types include: Ready, Available, Progressing, Degraded.
    pub r#type: String,

    /// Status of the condition: True, False, or Unknown.
    pub status: String,

    /// Brief CamelCase reason for the condition's last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message indicating details about the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Last time the condition transitioned from one status to another (RFC3339 format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

/// `KafkaConnect` status, aggregated from the cluster's connector resources.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KafkaConnectStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// Generation of the spec most recently acted on by the controller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Base URL of the Connect REST API the controller is driving.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Total number of `KafkaConnector` resources owned by this cluster.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector_count: Option<i32>,

    /// Number of owned connectors whose Ready condition is True.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connectors_ready: Option<i32>,

    /// Number of owned connectors whose reconciliation failed this pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connectors_failed: Option<i32>,
}

/// `KafkaConnect` declares a Kafka Connect cluster to be managed by Konnekt.
///
/// The operator does not deploy the Connect workers themselves (that is the
/// job of the workload machinery); it drives the cluster's REST API to keep
/// the set of running connectors in sync with the `KafkaConnector` resources
/// labelled as belonging to this cluster.
///
/// # Example
///
/// ```yaml
/// apiVersion: kafka.konnekt.io/v1alpha1
/// kind: KafkaConnect
/// metadata:
///   name: my-connect
///   namespace: kafka
/// spec:
///   bootstrapServers: my-kafka-bootstrap:9092
///   replicas: 3
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "kafka.konnekt.io",
    version = "v1alpha1",
    kind = "KafkaConnect",
    namespaced,
    doc = "KafkaConnect represents a Kafka Connect cluster whose connectors are kept in sync with KafkaConnector resources via the Connect REST API."
)]
#[kube(status = "KafkaConnectStatus")]
#[serde(rename_all = "camelCase")]
pub struct KafkaConnectSpec {
    /// Kafka bootstrap servers the Connect cluster is attached to
    /// (e.g., "my-kafka-bootstrap:9092").
    pub bootstrap_servers: String,

    /// Number of Connect worker replicas. Informational for this controller;
    /// the workload machinery scales the workers.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 0, max = 2_147_483_647))]
    pub replicas: Option<i32>,

    /// Worker-level Connect configuration overrides (e.g., key/value converters).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<BTreeMap<String, serde_json::Value>>,

    /// Explicit Connect REST API endpoint. When unset, the conventional
    /// in-cluster service address `http://<name>-connect-api.<namespace>.svc:8083`
    /// is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest_endpoint: Option<String>,
}

/// `KafkaConnector` status, projected from the live Connect REST state.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KafkaConnectorStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// Generation of the spec most recently reconciled successfully.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Verbatim copy of the Connect REST `/status` payload for this connector:
    /// `connector` -> {state, worker_id}, `tasks` -> [{id, state, worker_id, trace}].
    /// Field names and nesting are preserved exactly as received; external
    /// consumers parse these by convention.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector_status: Option<BTreeMap<String, serde_json::Value>>,
}

/// `KafkaConnector` declares a single connector inside a Connect cluster.
///
/// The connector is linked to its cluster by the `kafka.konnekt.io/cluster`
/// label. The controller diffs the declared configuration against the live
/// one and issues the minimal create/update/pause/resume/restart calls needed
/// to converge.
///
/// # Example
///
/// ```yaml
/// apiVersion: kafka.konnekt.io/v1alpha1
/// kind: KafkaConnector
/// metadata:
///   name: my-connector
///   namespace: kafka
///   labels:
///     kafka.konnekt.io/cluster: my-connect
/// spec:
///   className: org.apache.kafka.connect.file.FileStreamSourceConnector
///   tasksMax: 2
///   config:
///     topic: my-topic
///     file: /tmp/input.txt
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "kafka.konnekt.io",
    version = "v1alpha1",
    kind = "KafkaConnector",
    namespaced,
    doc = "KafkaConnector represents a named, configured unit of work running inside a Kafka Connect cluster, with one or more tasks."
)]
#[kube(status = "KafkaConnectorStatus")]
#[serde(rename_all = "camelCase")]
pub struct KafkaConnectorSpec {
    /// Fully qualified class name of the connector implementation
    /// (e.g., "org.apache.kafka.connect.file.FileStreamSourceConnector").
    #[schemars(length(min = 1))]
    pub class_name: String,

    /// Maximum number of tasks the connector may spawn.
    #[schemars(range(min = 1, max = 2_147_483_647))]
    pub tasks_max: i32,

    /// Connector configuration passed through to the Connect REST API.
    /// Values are opaque to the controller; ordering only matters for
    /// deterministic diff output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<BTreeMap<String, serde_json::Value>>,

    /// Whether the connector should be paused.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pause: Option<bool>,
}

impl KafkaConnector {
    /// Name of the `KafkaConnect` cluster this connector belongs to,
    /// read from the `kafka.konnekt.io/cluster` label.
    #[must_use]
    pub fn cluster_name(&self) -> Option<&str> {
        self.metadata
            .labels
            .as_ref()
            .and_then(|labels| labels.get(crate::labels::CLUSTER_LABEL))
            .map(String::as_str)
    }
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
