// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `status.rs`

#[cfg(test)]
mod tests {
    use crate::crd::{Condition, KafkaConnector, KafkaConnectorStatus};
    use crate::errors::{ConnectorError, StoreError};
    use crate::reconcilers::status::{
        conditions_equal, connector_status_changed, create_condition, merge_conditions,
        publish_connector_status,
    };
    use crate::store::mock::MockStatusStore;
    use crate::store::ResourceStatusStore;
    use serde_json::json;

    const NAMESPACE: &str = "kafka";
    const CONNECTOR: &str = "my-connector";

    fn connector(generation: i64) -> KafkaConnector {
        serde_json::from_value(json!({
            "apiVersion": "kafka.konnekt.io/v1alpha1",
            "kind": "KafkaConnector",
            "metadata": {
                "name": CONNECTOR,
                "namespace": NAMESPACE,
                "generation": generation
            },
            "spec": {"className": "io.example.TestingConnector", "tasksMax": 1}
        }))
        .unwrap()
    }

    fn ready_status(generation: i64) -> KafkaConnectorStatus {
        KafkaConnectorStatus {
            conditions: vec![create_condition(
                "Ready",
                "True",
                "ConnectorReady",
                "Connector is RUNNING with 1 task(s)",
            )],
            observed_generation: Some(generation),
            connector_status: Some(
                serde_json::from_value(json!({
                    "connector": {"state": "RUNNING", "worker_id": "10.0.0.1:8083"},
                    "tasks": [{"id": 0, "state": "RUNNING"}]
                }))
                .unwrap(),
            ),
        }
    }

    #[test]
    fn test_create_condition_basic() {
        let condition = create_condition("Ready", "True", "ConnectorReady", "all good");
        assert_eq!(condition.r#type, "Ready");
        assert_eq!(condition.status, "True");
        assert_eq!(condition.reason.as_deref(), Some("ConnectorReady"));
        assert_eq!(condition.message.as_deref(), Some("all good"));
        assert!(condition.last_transition_time.is_some());
    }

    #[test]
    fn test_conditions_equal_ignores_transition_time() {
        let mut a = create_condition("Ready", "True", "ConnectorReady", "ok");
        let b = create_condition("Ready", "True", "ConnectorReady", "ok");
        a.last_transition_time = Some("2020-01-01T00:00:00Z".to_string());
        assert!(conditions_equal(&[a], &[b]));
    }

    #[test]
    fn test_conditions_equal_detects_status_flip() {
        let a = create_condition("Ready", "True", "ConnectorReady", "ok");
        let b = create_condition("Ready", "False", "TaskFailed", "boom");
        assert!(!conditions_equal(&[a], &[b]));
    }

    #[test]
    fn test_merge_conditions_preserves_transition_time_when_status_unchanged() {
        let mut existing = create_condition("Ready", "True", "ConnectorReady", "ok");
        existing.last_transition_time = Some("2020-01-01T00:00:00Z".to_string());

        let new = create_condition("Ready", "True", "ConnectorReady", "still ok");
        let merged = merge_conditions(&[existing], vec![new]);

        assert_eq!(
            merged[0].last_transition_time.as_deref(),
            Some("2020-01-01T00:00:00Z")
        );
        assert_eq!(merged[0].message.as_deref(), Some("still ok"));
    }

    #[test]
    fn test_merge_conditions_stamps_new_time_on_flip() {
        let mut existing = create_condition("Ready", "True", "ConnectorReady", "ok");
        existing.last_transition_time = Some("2020-01-01T00:00:00Z".to_string());

        let new = create_condition("Ready", "False", "TaskFailed", "boom");
        let merged = merge_conditions(&[existing], vec![new]);

        assert_ne!(
            merged[0].last_transition_time.as_deref(),
            Some("2020-01-01T00:00:00Z")
        );
    }

    #[test]
    fn test_connector_status_changed() {
        let status = ready_status(1);
        assert!(connector_status_changed(None, &status));
        assert!(!connector_status_changed(Some(&status.clone()), &status));

        let newer = ready_status(2);
        assert!(connector_status_changed(Some(&status), &newer));
    }

    #[tokio::test]
    async fn test_publish_writes_status() {
        let store = MockStatusStore::new();
        store.insert(connector(1));

        publish_connector_status(&store, NAMESPACE, CONNECTOR, &ready_status(1))
            .await
            .unwrap();

        let stored = store.get(NAMESPACE, CONNECTOR).unwrap();
        let status = stored.status.unwrap();
        assert_eq!(status.observed_generation, Some(1));
        assert_eq!(status.conditions[0].status, "True");
    }

    #[tokio::test]
    async fn test_publish_skips_semantically_unchanged_status() {
        let store = MockStatusStore::new();
        store.insert(connector(1));

        publish_connector_status(&store, NAMESPACE, CONNECTOR, &ready_status(1))
            .await
            .unwrap();
        let writes_after_first = store.update_calls();

        publish_connector_status(&store, NAMESPACE, CONNECTOR, &ready_status(1))
            .await
            .unwrap();

        assert_eq!(
            store.update_calls(),
            writes_after_first,
            "identical status must not be rewritten"
        );
    }

    #[tokio::test]
    async fn test_publish_retries_conflict_against_fresh_read() {
        let store = MockStatusStore::new();
        store.insert(connector(1));
        store.inject_conflicts(1);

        publish_connector_status(&store, NAMESPACE, CONNECTOR, &ready_status(1))
            .await
            .unwrap();

        // One conflicted write plus one successful retry
        assert_eq!(store.update_calls(), 2);
        let stored = store.get(NAMESPACE, CONNECTOR).unwrap();
        assert_eq!(stored.status.unwrap().observed_generation, Some(1));
    }

    #[tokio::test]
    async fn test_publish_surfaces_status_conflict_after_bounded_retries() {
        let store = MockStatusStore::new();
        store.insert(connector(1));
        // More conflicts than MAX_STATUS_UPDATE_ATTEMPTS can absorb
        store.inject_conflicts(10);

        let err = publish_connector_status(&store, NAMESPACE, CONNECTOR, &ready_status(1))
            .await
            .unwrap_err();

        match err {
            ConnectorError::StatusConflict { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("expected StatusConflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stale_write_is_rejected_by_the_store() {
        let store = MockStatusStore::new();
        store.insert(connector(1));

        // Read a copy, then let a concurrent writer bump the stored version
        let stale = store.get(NAMESPACE, CONNECTOR).unwrap();
        store.bump_version(NAMESPACE, CONNECTOR);

        let err = store.update_status_async(&stale).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_publish_failure_status_preserves_last_observed_state() {
        let store = MockStatusStore::new();
        store.insert(connector(2));

        // A successful pass records runtime state for generation 2
        publish_connector_status(&store, NAMESPACE, CONNECTOR, &ready_status(2))
            .await
            .unwrap();

        // A later failed pass publishes conditions only
        let failure = crate::reconcilers::connector::connector_failure_status(
            &ConnectorError::ConnectUnavailable {
                connector: CONNECTOR.to_string(),
                reason: "connection refused".to_string(),
                status: None,
            },
        );
        publish_connector_status(&store, NAMESPACE, CONNECTOR, &failure)
            .await
            .unwrap();

        let status = store.get(NAMESPACE, CONNECTOR).unwrap().status.unwrap();
        assert_eq!(status.conditions[0].status, "False");
        // Last known runtime state and generation survive the failure
        assert!(status.connector_status.is_some());
        assert_eq!(status.observed_generation, Some(2));
    }

    #[tokio::test]
    async fn test_publish_never_regresses_a_newer_observation() {
        let store = MockStatusStore::new();
        store.insert(connector(5));

        publish_connector_status(&store, NAMESPACE, CONNECTOR, &ready_status(5))
            .await
            .unwrap();
        let writes_after_first = store.update_calls();

        // A straggler pass that observed generation 3 finishes late
        let mut stale = ready_status(3);
        stale.conditions =
            vec![create_condition("Ready", "False", "ConnectorNotReady", "stale")];
        publish_connector_status(&store, NAMESPACE, CONNECTOR, &stale)
            .await
            .unwrap();

        let status = store.get(NAMESPACE, CONNECTOR).unwrap().status.unwrap();
        assert_eq!(status.observed_generation, Some(5));
        assert_eq!(status.conditions[0].status, "True");
        assert_eq!(store.update_calls(), writes_after_first);
    }

    #[tokio::test]
    async fn test_publish_for_deleted_resource_is_a_noop() {
        let store: MockStatusStore<KafkaConnector> = MockStatusStore::new();

        publish_connector_status(&store, NAMESPACE, "gone", &ready_status(1))
            .await
            .unwrap();
        assert_eq!(store.update_calls(), 0);
    }

    #[test]
    fn test_condition_struct_round_trip() {
        let condition = Condition {
            r#type: "Ready".to_string(),
            status: "True".to_string(),
            reason: Some("ConnectorReady".to_string()),
            message: None,
            last_transition_time: Some("2026-01-01T00:00:00Z".to_string()),
        };
        let value = serde_json::to_value(&condition).unwrap();
        assert_eq!(value["lastTransitionTime"], json!("2026-01-01T00:00:00Z"));
        assert!(value.get("message").is_none());
    }
}
