// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed views over the Kafka Connect REST payloads.
//!
//! The Connect REST API reports connector and task state as loosely structured
//! JSON. The reconciler only inspects a handful of fields (`connector.state`,
//! the task list and each task's `state`/`trace`); everything else is carried
//! through verbatim into `status.connectorStatus`, so the document itself
//! stays an opaque map.

use crate::constants::{CONFIG_KEY_CONNECTOR_CLASS, CONFIG_KEY_NAME, CONFIG_KEY_TASKS_MAX};
use crate::crd::KafkaConnectorSpec;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Connector configuration as stored by the Connect REST API.
///
/// Connect flattens every config value to a string on the wire, so the
/// desired config is stringified before diffing against the live one.
pub type ConnectorConfig = BTreeMap<String, String>;

/// Run state of a connector or one of its tasks, as reported by the REST API.
///
/// Foreign values that this operator does not know about are preserved in
/// [`ConnectorState::Unknown`] rather than rejected; the payload is evolving
/// and an unknown state must never fail a reconciliation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectorState {
    /// The connector/task is running.
    Running,
    /// The connector/task is administratively paused.
    Paused,
    /// The connector/task has failed; tasks in this state are restart candidates.
    Failed,
    /// The connector/task is not assigned to any worker yet.
    Unassigned,
    /// Any state value this operator does not recognize.
    Unknown(String),
}

impl ConnectorState {
    /// Parse a REST API state string (e.g., "RUNNING").
    #[must_use]
    pub fn parse(state: &str) -> Self {
        match state {
            "RUNNING" => ConnectorState::Running,
            "PAUSED" => ConnectorState::Paused,
            "FAILED" => ConnectorState::Failed,
            "UNASSIGNED" => ConnectorState::Unassigned,
            other => ConnectorState::Unknown(other.to_string()),
        }
    }

    /// The REST API string for this state.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            ConnectorState::Running => "RUNNING",
            ConnectorState::Paused => "PAUSED",
            ConnectorState::Failed => "FAILED",
            ConnectorState::Unassigned => "UNASSIGNED",
            ConnectorState::Unknown(other) => other,
        }
    }
}

/// One task entry from the `/status` payload, reduced to the fields the
/// reconciler inspects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskStatus {
    /// Task id within the connector
    pub id: i64,
    /// Run state of the task
    pub state: ConnectorState,
    /// Worker the task is assigned to, if any
    pub worker_id: Option<String>,
    /// Stack trace reported for a FAILED task, if any
    pub trace: Option<String>,
}

/// Opaque view over a connector's `/status` REST payload.
///
/// The document is kept verbatim (field names and nesting exactly as
/// received) so it can be projected into `status.connectorStatus` without
/// loss; typed accessors cover only what the reconciler needs.
#[derive(Clone, Debug, Default)]
pub struct ConnectorStatusDoc(BTreeMap<String, Value>);

impl ConnectorStatusDoc {
    /// Wrap a decoded `/status` payload.
    #[must_use]
    pub fn new(doc: BTreeMap<String, Value>) -> Self {
        Self(doc)
    }

    /// Connector-level state, `Unknown("")` when the field is absent.
    #[must_use]
    pub fn connector_state(&self) -> ConnectorState {
        self.0
            .get("connector")
            .and_then(|connector| connector.get("state"))
            .and_then(Value::as_str)
            .map_or_else(
                || ConnectorState::Unknown(String::new()),
                ConnectorState::parse,
            )
    }

    /// Task entries from the payload, in reported order.
    ///
    /// Entries without an `id` are skipped; other missing fields degrade to
    /// `None`/`Unknown` so a partially populated payload still reconciles.
    #[must_use]
    pub fn tasks(&self) -> Vec<TaskStatus> {
        let Some(tasks) = self.0.get("tasks").and_then(Value::as_array) else {
            return Vec::new();
        };

        tasks
            .iter()
            .filter_map(|task| {
                let id = task.get("id").and_then(Value::as_i64)?;
                let state = task
                    .get("state")
                    .and_then(Value::as_str)
                    .map_or_else(
                        || ConnectorState::Unknown(String::new()),
                        ConnectorState::parse,
                    );
                Some(TaskStatus {
                    id,
                    state,
                    worker_id: task
                        .get("worker_id")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    trace: task
                        .get("trace")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                })
            })
            .collect()
    }

    /// Tasks currently in FAILED state.
    #[must_use]
    pub fn failed_tasks(&self) -> Vec<TaskStatus> {
        self.tasks()
            .into_iter()
            .filter(|task| task.state == ConnectorState::Failed)
            .collect()
    }

    /// The raw payload, for verbatim projection into resource status.
    #[must_use]
    pub fn as_map(&self) -> &BTreeMap<String, Value> {
        &self.0
    }

    /// Consume the view, returning the raw payload.
    #[must_use]
    pub fn into_map(self) -> BTreeMap<String, Value> {
        self.0
    }
}

/// Build the effective wire config for a connector from its spec.
///
/// User config values are stringified the way Connect stores them (strings
/// kept as-is, everything else JSON-rendered), then the typed spec fields
/// are forced in under their reserved keys. A user entry colliding with a
/// reserved key is overridden by the typed field.
#[must_use]
pub fn effective_config(spec: &KafkaConnectorSpec) -> ConnectorConfig {
    let mut config = ConnectorConfig::new();

    if let Some(user_config) = &spec.config {
        for (key, value) in user_config {
            if key == CONFIG_KEY_CONNECTOR_CLASS || key == CONFIG_KEY_TASKS_MAX {
                debug!(
                    key = %key,
                    "Connector config overrides a reserved key, using the typed spec field instead"
                );
                continue;
            }
            config.insert(key.clone(), stringify_value(value));
        }
    }

    config.insert(
        CONFIG_KEY_CONNECTOR_CLASS.to_string(),
        spec.class_name.clone(),
    );
    config.insert(CONFIG_KEY_TASKS_MAX.to_string(), spec.tasks_max.to_string());

    config
}

/// Compare the desired effective config against the live one.
///
/// The Connect REST layer injects the connector `name` into stored configs;
/// it is stripped before the key-by-key comparison so that a converged
/// connector diffs clean.
#[must_use]
pub fn configs_equal(desired: &ConnectorConfig, live: &ConnectorConfig) -> bool {
    if live.len().saturating_sub(usize::from(live.contains_key(CONFIG_KEY_NAME))) != desired.len() {
        return false;
    }

    live.iter()
        .filter(|(key, _)| key.as_str() != CONFIG_KEY_NAME)
        .all(|(key, value)| desired.get(key) == Some(value))
}

fn stringify_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
