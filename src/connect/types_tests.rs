// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `types.rs`

#[cfg(test)]
mod tests {
    use crate::connect::types::{
        configs_equal, effective_config, ConnectorConfig, ConnectorState, ConnectorStatusDoc,
    };
    use crate::crd::KafkaConnectorSpec;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn status_doc(value: serde_json::Value) -> ConnectorStatusDoc {
        ConnectorStatusDoc::new(serde_json::from_value(value).unwrap())
    }

    fn spec_with_config(config: serde_json::Value) -> KafkaConnectorSpec {
        KafkaConnectorSpec {
            class_name: "io.example.TestingConnector".to_string(),
            tasks_max: 2,
            config: Some(serde_json::from_value(config).unwrap()),
            pause: None,
        }
    }

    #[test]
    fn test_connector_state_parse_known_values() {
        assert_eq!(ConnectorState::parse("RUNNING"), ConnectorState::Running);
        assert_eq!(ConnectorState::parse("PAUSED"), ConnectorState::Paused);
        assert_eq!(ConnectorState::parse("FAILED"), ConnectorState::Failed);
        assert_eq!(
            ConnectorState::parse("UNASSIGNED"),
            ConnectorState::Unassigned
        );
    }

    #[test]
    fn test_connector_state_parse_foreign_value() {
        let state = ConnectorState::parse("RESTARTING");
        assert_eq!(state, ConnectorState::Unknown("RESTARTING".to_string()));
        assert_eq!(state.as_str(), "RESTARTING");
    }

    #[test]
    fn test_status_doc_connector_state() {
        let doc = status_doc(json!({
            "name": "my-connector",
            "connector": {"state": "RUNNING", "worker_id": "10.0.0.1:8083"},
            "tasks": []
        }));
        assert_eq!(doc.connector_state(), ConnectorState::Running);
    }

    #[test]
    fn test_status_doc_missing_connector_block() {
        let doc = status_doc(json!({"tasks": []}));
        assert_eq!(
            doc.connector_state(),
            ConnectorState::Unknown(String::new())
        );
    }

    #[test]
    fn test_status_doc_tasks() {
        let doc = status_doc(json!({
            "connector": {"state": "RUNNING"},
            "tasks": [
                {"id": 0, "state": "RUNNING", "worker_id": "10.0.0.1:8083"},
                {"id": 1, "state": "FAILED", "worker_id": "10.0.0.2:8083",
                 "trace": "org.apache.kafka.connect.errors.ConnectException: boom"}
            ]
        }));

        let tasks = doc.tasks();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, 0);
        assert_eq!(tasks[0].state, ConnectorState::Running);
        assert!(tasks[0].trace.is_none());
        assert_eq!(tasks[1].state, ConnectorState::Failed);
        assert!(tasks[1].trace.as_deref().unwrap().contains("boom"));

        let failed = doc.failed_tasks();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].id, 1);
    }

    #[test]
    fn test_status_doc_tolerates_malformed_tasks() {
        let doc = status_doc(json!({
            "connector": {"state": "RUNNING"},
            "tasks": [{"state": "RUNNING"}, {"id": 3}]
        }));

        // Entry without id is skipped, entry without state degrades to Unknown
        let tasks = doc.tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, 3);
        assert_eq!(tasks[0].state, ConnectorState::Unknown(String::new()));
    }

    #[test]
    fn test_status_doc_passthrough_is_verbatim() {
        let payload = json!({
            "name": "my-connector",
            "connector": {"state": "RUNNING", "worker_id": "10.0.0.1:8083"},
            "tasks": [{"id": 0, "state": "RUNNING", "worker_id": "10.0.0.1:8083"}],
            "type": "source"
        });
        let doc = status_doc(payload.clone());
        assert_eq!(serde_json::to_value(doc.as_map()).unwrap(), payload);
    }

    #[test]
    fn test_effective_config_stringifies_values() {
        let spec = spec_with_config(json!({
            "topic": "my-topic",
            "batch.size": 100,
            "exactly.once": true
        }));

        let config = effective_config(&spec);
        assert_eq!(config.get("topic").unwrap(), "my-topic");
        assert_eq!(config.get("batch.size").unwrap(), "100");
        assert_eq!(config.get("exactly.once").unwrap(), "true");
        assert_eq!(
            config.get("connector.class").unwrap(),
            "io.example.TestingConnector"
        );
        assert_eq!(config.get("tasks.max").unwrap(), "2");
    }

    #[test]
    fn test_effective_config_reserved_keys_win() {
        let spec = spec_with_config(json!({
            "connector.class": "io.example.Sneaky",
            "tasks.max": 99
        }));

        let config = effective_config(&spec);
        assert_eq!(
            config.get("connector.class").unwrap(),
            "io.example.TestingConnector"
        );
        assert_eq!(config.get("tasks.max").unwrap(), "2");
    }

    #[test]
    fn test_configs_equal_ignores_injected_name() {
        let spec = spec_with_config(json!({"topic": "my-topic"}));
        let desired = effective_config(&spec);

        let mut live: ConnectorConfig = desired.clone();
        live.insert("name".to_string(), "my-connector".to_string());

        assert!(configs_equal(&desired, &live));
    }

    #[test]
    fn test_configs_equal_detects_value_change() {
        let spec = spec_with_config(json!({"topic": "my-topic"}));
        let desired = effective_config(&spec);

        let mut live = desired.clone();
        live.insert("topic".to_string(), "other-topic".to_string());

        assert!(!configs_equal(&desired, &live));
    }

    #[test]
    fn test_configs_equal_detects_removed_key() {
        let spec = spec_with_config(json!({"topic": "my-topic"}));
        let desired = effective_config(&spec);

        // Live still carries a key the desired config no longer has
        let mut live = desired.clone();
        live.insert("stale.key".to_string(), "still-here".to_string());

        assert!(!configs_equal(&desired, &live));
    }

    #[test]
    fn test_configs_equal_empty_maps() {
        assert!(configs_equal(&BTreeMap::new(), &BTreeMap::new()));
    }
}
