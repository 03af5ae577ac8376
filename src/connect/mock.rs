// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory [`ConnectApi`] implementation for reconciler tests.
//!
//! Models a small Connect cluster: stored configs, synthesized RUNNING
//! statuses, pause/resume transitions and per-operation call counters so
//! tests can assert on the exact set of REST calls a reconciliation issued.

use crate::connect::client::ConnectApi;
use crate::connect::types::{ConnectorConfig, ConnectorStatusDoc};
use crate::errors::ConnectError;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Default)]
struct MockState {
    configs: BTreeMap<String, ConnectorConfig>,
    statuses: BTreeMap<String, BTreeMap<String, Value>>,
    update_calls: u32,
    delete_calls: u32,
    pause_calls: u32,
    resume_calls: u32,
    restart_calls: Vec<(String, i64)>,
    unreachable: bool,
}

/// In-memory Connect cluster double with call accounting.
#[derive(Default)]
pub struct MockConnectApi {
    state: Mutex<MockState>,
}

impl MockConnectApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with `ConnectError::Unreachable`.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().unwrap().unreachable = unreachable;
    }

    /// Replace the `/status` document reported for a connector.
    pub fn set_status(&self, name: &str, doc: Value) {
        let map: BTreeMap<String, Value> = serde_json::from_value(doc).unwrap();
        self.state
            .lock()
            .unwrap()
            .statuses
            .insert(name.to_string(), map);
    }

    /// The stored config for a connector, if any.
    #[must_use]
    pub fn stored_config(&self, name: &str) -> Option<ConnectorConfig> {
        self.state.lock().unwrap().configs.get(name).cloned()
    }

    /// Number of `create_or_update_connector` calls so far.
    #[must_use]
    pub fn update_calls(&self) -> u32 {
        self.state.lock().unwrap().update_calls
    }

    /// Number of `delete_connector` calls so far.
    #[must_use]
    pub fn delete_calls(&self) -> u32 {
        self.state.lock().unwrap().delete_calls
    }

    /// Number of `pause_connector` calls so far.
    #[must_use]
    pub fn pause_calls(&self) -> u32 {
        self.state.lock().unwrap().pause_calls
    }

    /// Number of `resume_connector` calls so far.
    #[must_use]
    pub fn resume_calls(&self) -> u32 {
        self.state.lock().unwrap().resume_calls
    }

    /// Every `(connector, task_id)` restart issued so far, in order.
    #[must_use]
    pub fn restart_calls(&self) -> Vec<(String, i64)> {
        self.state.lock().unwrap().restart_calls.clone()
    }

    fn running_status(name: &str) -> BTreeMap<String, Value> {
        serde_json::from_value(json!({
            "name": name,
            "connector": {"state": "RUNNING", "worker_id": "10.0.0.1:8083"},
            "tasks": [
                {"id": 0, "state": "RUNNING", "worker_id": "10.0.0.1:8083"}
            ],
            "type": "source"
        }))
        .unwrap()
    }

    fn check_reachable(state: &MockState) -> Result<(), ConnectError> {
        if state.unreachable {
            return Err(ConnectError::Unreachable {
                endpoint: "http://mock-connect:8083".to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ConnectApi for MockConnectApi {
    async fn list_connectors(&self) -> Result<Vec<String>, ConnectError> {
        let state = self.state.lock().unwrap();
        Self::check_reachable(&state)?;
        Ok(state.configs.keys().cloned().collect())
    }

    async fn connector_config(
        &self,
        name: &str,
    ) -> Result<Option<ConnectorConfig>, ConnectError> {
        let state = self.state.lock().unwrap();
        Self::check_reachable(&state)?;
        Ok(state.configs.get(name).cloned())
    }

    async fn create_or_update_connector(
        &self,
        name: &str,
        config: &ConnectorConfig,
    ) -> Result<(), ConnectError> {
        let mut state = self.state.lock().unwrap();
        Self::check_reachable(&state)?;
        state.update_calls += 1;
        state.configs.insert(name.to_string(), config.clone());
        state
            .statuses
            .entry(name.to_string())
            .or_insert_with(|| Self::running_status(name));
        Ok(())
    }

    async fn delete_connector(&self, name: &str) -> Result<(), ConnectError> {
        let mut state = self.state.lock().unwrap();
        Self::check_reachable(&state)?;
        state.delete_calls += 1;
        state.configs.remove(name);
        state.statuses.remove(name);
        Ok(())
    }

    async fn connector_status(
        &self,
        name: &str,
    ) -> Result<Option<ConnectorStatusDoc>, ConnectError> {
        let state = self.state.lock().unwrap();
        Self::check_reachable(&state)?;
        if !state.configs.contains_key(name) {
            return Ok(None);
        }
        let doc = state
            .statuses
            .get(name)
            .cloned()
            .unwrap_or_else(|| Self::running_status(name));
        Ok(Some(ConnectorStatusDoc::new(doc)))
    }

    async fn restart_task(&self, name: &str, task_id: i64) -> Result<(), ConnectError> {
        let mut state = self.state.lock().unwrap();
        Self::check_reachable(&state)?;
        state.restart_calls.push((name.to_string(), task_id));
        Ok(())
    }

    async fn pause_connector(&self, name: &str) -> Result<(), ConnectError> {
        let mut state = self.state.lock().unwrap();
        Self::check_reachable(&state)?;
        state.pause_calls += 1;
        if let Some(status) = state.statuses.get_mut(name) {
            status.insert(
                "connector".to_string(),
                json!({"state": "PAUSED", "worker_id": "10.0.0.1:8083"}),
            );
        }
        Ok(())
    }

    async fn resume_connector(&self, name: &str) -> Result<(), ConnectError> {
        let mut state = self.state.lock().unwrap();
        Self::check_reachable(&state)?;
        state.resume_calls += 1;
        if let Some(status) = state.statuses.get_mut(name) {
            status.insert(
                "connector".to_string(),
                json!({"state": "RUNNING", "worker_id": "10.0.0.1:8083"}),
            );
        }
        Ok(())
    }
}
