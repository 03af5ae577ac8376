// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status condition helpers and the optimistic-concurrency status writer.
//!
//! Conditions follow the standard Kubernetes format:
//! - `type`: the aspect being reported (e.g., "Ready")
//! - `status`: "True", "False", or "Unknown"
//! - `reason`: a programmatic CamelCase identifier
//! - `message`: a human-readable explanation
//! - `lastTransitionTime`: RFC3339 timestamp of the last status flip
//!
//! Status writes go through [`publish_connector_status`] /
//! [`publish_connect_status`]: read the fresh resource, merge the computed
//! status into it (preserving transition times for conditions that did not
//! flip), skip the write when nothing changed semantically, and retry a
//! bounded number of times when a concurrent writer causes a version
//! conflict. A write based on a stale read is never persisted.

use crate::constants::MAX_STATUS_UPDATE_ATTEMPTS;
use crate::crd::{Condition, KafkaConnect, KafkaConnectStatus, KafkaConnector, KafkaConnectorStatus};
use crate::errors::{AssemblyError, ConnectorError, StoreError};
use crate::store::ResourceStatusStore;
use chrono::Utc;
use tracing::{debug, warn};

/// Create a new Kubernetes condition with the current timestamp.
#[must_use]
pub fn create_condition(
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
) -> Condition {
    Condition {
        r#type: condition_type.to_string(),
        status: status.to_string(),
        reason: Some(reason.to_string()),
        message: Some(message.to_string()),
        last_transition_time: Some(Utc::now().to_rfc3339()),
    }
}

/// Compare two condition lists for semantic equality.
///
/// Ignores `lastTransitionTime`; only type, status, reason and message count.
#[must_use]
pub fn conditions_equal(current: &[Condition], new: &[Condition]) -> bool {
    if current.len() != new.len() {
        return false;
    }

    for new_cond in new {
        match current.iter().find(|c| c.r#type == new_cond.r#type) {
            None => return false,
            Some(curr_cond) => {
                if curr_cond.status != new_cond.status
                    || curr_cond.reason != new_cond.reason
                    || curr_cond.message != new_cond.message
                {
                    return false;
                }
            }
        }
    }

    true
}

/// Carry `lastTransitionTime` forward for conditions whose status value did
/// not flip, so transition times reflect actual transitions.
#[must_use]
pub fn merge_conditions(existing: &[Condition], mut new: Vec<Condition>) -> Vec<Condition> {
    for condition in &mut new {
        if let Some(previous) = existing.iter().find(|c| c.r#type == condition.r#type) {
            if previous.status == condition.status {
                condition.last_transition_time = previous.last_transition_time.clone();
            }
        }
    }
    new
}

/// Whether a connector status write is semantically needed.
#[must_use]
pub fn connector_status_changed(
    current: Option<&KafkaConnectorStatus>,
    new: &KafkaConnectorStatus,
) -> bool {
    match current {
        None => true,
        Some(current) => {
            current.observed_generation != new.observed_generation
                || current.connector_status != new.connector_status
                || !conditions_equal(&current.conditions, &new.conditions)
        }
    }
}

/// Whether a cluster status write is semantically needed.
#[must_use]
pub fn connect_status_changed(
    current: Option<&KafkaConnectStatus>,
    new: &KafkaConnectStatus,
) -> bool {
    match current {
        None => true,
        Some(current) => {
            current.observed_generation != new.observed_generation
                || current.url != new.url
                || current.connector_count != new.connector_count
                || current.connectors_ready != new.connectors_ready
                || current.connectors_failed != new.connectors_failed
                || !conditions_equal(&current.conditions, &new.conditions)
        }
    }
}

/// Write a connector's status with bounded conflict retry.
///
/// Each attempt works against a fresh read: the computed status is merged
/// into the current resource and written conditioned on that read's version
/// token. A conflict means another writer got in between; the loop re-reads
/// and recomputes rather than overwrite blindly. A resource deleted
/// mid-flight ends the write silently - there is nothing left to report on.
///
/// # Errors
///
/// [`ConnectorError::StatusConflict`] when `MAX_STATUS_UPDATE_ATTEMPTS`
/// consecutive writes conflicted, [`ConnectorError::Store`] for any other
/// store failure.
pub async fn publish_connector_status(
    store: &dyn ResourceStatusStore<KafkaConnector>,
    namespace: &str,
    name: &str,
    new_status: &KafkaConnectorStatus,
) -> Result<(), ConnectorError> {
    for attempt in 1..=MAX_STATUS_UPDATE_ATTEMPTS {
        let fresh = store
            .get_async(namespace, name)
            .await
            .map_err(|source| ConnectorError::Store {
                connector: name.to_string(),
                source,
            })?;

        let Some(mut fresh) = fresh else {
            debug!(
                namespace = %namespace,
                name = %name,
                "Connector resource gone, skipping status write"
            );
            return Ok(());
        };

        // Never regress an already-newer observation from a concurrent pass
        let fresh_generation = fresh.status.as_ref().and_then(|s| s.observed_generation);
        if let (Some(fresh_gen), Some(new_gen)) = (fresh_generation, new_status.observed_generation)
        {
            if fresh_gen > new_gen {
                debug!(
                    namespace = %namespace,
                    name = %name,
                    fresh_generation = fresh_gen,
                    new_generation = new_gen,
                    "Stored status observed a newer generation, skipping status write"
                );
                return Ok(());
            }
        }

        let mut merged = new_status.clone();
        if let Some(current) = &fresh.status {
            merged.conditions = merge_conditions(&current.conditions, merged.conditions);
            // A failed pass publishes conditions only; the last observed
            // runtime state and generation are carried forward, not erased
            if merged.connector_status.is_none() {
                merged.connector_status = current.connector_status.clone();
            }
            if merged.observed_generation.is_none() {
                merged.observed_generation = current.observed_generation;
            }
        }

        if !connector_status_changed(fresh.status.as_ref(), &merged) {
            debug!(
                namespace = %namespace,
                name = %name,
                "Connector status unchanged, skipping update"
            );
            return Ok(());
        }

        fresh.status = Some(merged);

        match store.update_status_async(&fresh).await {
            Ok(_) => return Ok(()),
            Err(StoreError::Conflict { .. }) => {
                warn!(
                    namespace = %namespace,
                    name = %name,
                    attempt = attempt,
                    "Connector status write conflicted, re-reading"
                );
            }
            Err(StoreError::NotFound { .. }) => return Ok(()),
            Err(source) => {
                return Err(ConnectorError::Store {
                    connector: name.to_string(),
                    source,
                })
            }
        }
    }

    Err(ConnectorError::StatusConflict {
        connector: name.to_string(),
        attempts: MAX_STATUS_UPDATE_ATTEMPTS,
    })
}

/// Write a cluster's aggregated status with bounded conflict retry.
///
/// Same protocol as [`publish_connector_status`], for the assembly resource.
///
/// # Errors
///
/// [`AssemblyError::Status`] when the store fails or all retries conflicted.
pub async fn publish_connect_status(
    store: &dyn ResourceStatusStore<KafkaConnect>,
    namespace: &str,
    name: &str,
    new_status: &KafkaConnectStatus,
) -> Result<(), AssemblyError> {
    for attempt in 1..=MAX_STATUS_UPDATE_ATTEMPTS {
        let fresh = store
            .get_async(namespace, name)
            .await
            .map_err(|source| AssemblyError::Status {
                cluster: name.to_string(),
                source,
            })?;

        let Some(mut fresh) = fresh else {
            debug!(
                namespace = %namespace,
                name = %name,
                "KafkaConnect resource gone, skipping status write"
            );
            return Ok(());
        };

        let mut merged = new_status.clone();
        if let Some(current) = &fresh.status {
            merged.conditions = merge_conditions(&current.conditions, merged.conditions);
        }

        if !connect_status_changed(fresh.status.as_ref(), &merged) {
            debug!(
                namespace = %namespace,
                name = %name,
                "KafkaConnect status unchanged, skipping update"
            );
            return Ok(());
        }

        fresh.status = Some(merged);

        match store.update_status_async(&fresh).await {
            Ok(_) => return Ok(()),
            Err(StoreError::Conflict { .. }) => {
                warn!(
                    namespace = %namespace,
                    name = %name,
                    attempt = attempt,
                    "KafkaConnect status write conflicted, re-reading"
                );
            }
            Err(StoreError::NotFound { .. }) => return Ok(()),
            Err(source) => {
                return Err(AssemblyError::Status {
                    cluster: name.to_string(),
                    source,
                })
            }
        }
    }

    Err(AssemblyError::Status {
        cluster: name.to_string(),
        source: StoreError::Conflict {
            namespace: namespace.to_string(),
            name: name.to_string(),
        },
    })
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod status_tests;
