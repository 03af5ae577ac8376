// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kafka Connect cluster (assembly) reconciliation logic.
//!
//! One pass over a `KafkaConnect` resource:
//!
//! 1. Enumerate the `KafkaConnector` resources labelled as belonging to the
//!    cluster
//! 2. Reconcile each connector independently - one bad connector never blocks
//!    convergence of its siblings
//! 3. Write every connector's status, success or failure, so failures are
//!    observable on the resource that caused them
//! 4. Delete connectors running on the cluster that no longer have a backing
//!    resource
//! 5. Aggregate the outcomes into the cluster-level status
//!
//! A pass with any failed connector reports [`AssemblyError::PartialFailure`]
//! after the status writes; successes are never rolled back.

use crate::connect::ConnectApi;
use crate::constants::{CONNECT_REST_PORT, KIND_KAFKA_CONNECTOR};
use crate::context::Context;
use crate::crd::{Condition, KafkaConnect, KafkaConnectStatus, KafkaConnector};
use crate::errors::AssemblyError;
use crate::labels::cluster_selector;
use crate::reconcilers::connector::{connector_failure_status, reconcile_connector};
use crate::reconcilers::driver::Reconciliation;
use crate::reconcilers::retry::retry_api_call;
use crate::reconcilers::status::{
    create_condition, publish_connect_status, publish_connector_status,
};
use crate::status_reasons::{
    REASON_ALL_CONNECTORS_READY, REASON_LIST_FAILED, REASON_NONE_READY, REASON_NO_CONNECTORS,
    REASON_PARTIALLY_READY,
};
use crate::store::{KubeStatusStore, ResourceStatusStore};
use kube::api::ListParams;
use kube::{Api, ResourceExt};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Outcome counts of one assembly pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConnectSummary {
    /// Connector resources reconciled
    pub total: usize,
    /// Connectors whose Ready condition came out True
    pub ready: usize,
    /// Connectors whose reconciliation or status write failed
    pub failed: usize,
    /// Runtime connectors deleted because their resource is gone
    pub orphans_deleted: usize,
}

/// Reconciles a `KafkaConnect` resource.
///
/// # Errors
///
/// * [`AssemblyError::ListFailed`] - the connector resources could not be enumerated
/// * [`AssemblyError::PartialFailure`] - at least one connector failed this pass
/// * [`AssemblyError::Status`] - the cluster status write failed
pub async fn reconcile_connect(
    ctx: Arc<Context>,
    recon: &Reconciliation,
    connect: &KafkaConnect,
) -> Result<(), AssemblyError> {
    let namespace = connect.namespace().unwrap_or_default();
    let name = connect.name_any();

    info!(identity = %recon, "Reconciling KafkaConnect: {}/{}", namespace, name);

    let endpoint = rest_endpoint(connect, &namespace, &name);
    let api = (ctx.connect_factory)(&endpoint);
    let store = KubeStatusStore::new(ctx.client.clone());

    let connectors = match list_cluster_connectors(&ctx, &namespace, &name).await {
        Ok(connectors) => connectors,
        Err(e) => {
            // Surface the failure on the cluster status before bailing
            let status = KafkaConnectStatus {
                conditions: vec![create_condition(
                    "Ready",
                    "False",
                    REASON_LIST_FAILED,
                    &format!("Failed to list connectors: {e}"),
                )],
                observed_generation: connect.metadata.generation,
                url: Some(endpoint.clone()),
                ..KafkaConnectStatus::default()
            };
            publish_connect_status(&store, &namespace, &name, &status).await?;
            return Err(e);
        }
    };

    let summary =
        reconcile_cluster_connectors(recon, &namespace, connectors, api.as_ref(), &store).await;

    let status = calculate_connect_status(connect, &endpoint, summary);
    publish_connect_status(&store, &namespace, &name, &status).await?;

    if summary.failed > 0 {
        return Err(AssemblyError::PartialFailure {
            cluster: name,
            failed: summary.failed,
            total: summary.total,
        });
    }

    Ok(())
}

/// The Connect REST endpoint for a cluster: the explicit `spec.restEndpoint`
/// override, or the conventional in-cluster service address.
#[must_use]
pub fn rest_endpoint(connect: &KafkaConnect, namespace: &str, name: &str) -> String {
    connect.spec.rest_endpoint.clone().unwrap_or_else(|| {
        format!("http://{name}-connect-api.{namespace}.svc:{CONNECT_REST_PORT}")
    })
}

/// List all `KafkaConnector` resources labelled as owned by a cluster.
async fn list_cluster_connectors(
    ctx: &Context,
    namespace: &str,
    name: &str,
) -> Result<Vec<KafkaConnector>, AssemblyError> {
    let api: Api<KafkaConnector> = Api::namespaced(ctx.client.clone(), namespace);
    let params = ListParams::default().labels(&cluster_selector(name));

    debug!(namespace = %namespace, cluster = %name, "Listing KafkaConnector resources");

    let list = retry_api_call(
        || async { api.list(&params).await },
        "list cluster connectors",
    )
    .await
    .map_err(|e| AssemblyError::ListFailed {
        cluster: name.to_string(),
        reason: e.to_string(),
    })?;

    debug!(
        connectors = list.items.len(),
        cluster = %name,
        "Listed KafkaConnector resources"
    );
    Ok(list.items)
}

/// Reconcile every connector of a cluster, isolating failures, and delete
/// runtime orphans.
///
/// Each connector's status is written regardless of its outcome; a failed
/// status write counts the connector as failed, because an unobservable
/// failure is still a failure.
pub async fn reconcile_cluster_connectors(
    recon: &Reconciliation,
    namespace: &str,
    connectors: Vec<KafkaConnector>,
    api: &dyn ConnectApi,
    store: &dyn ResourceStatusStore<KafkaConnector>,
) -> ConnectSummary {
    let mut summary = ConnectSummary {
        total: connectors.len(),
        ..ConnectSummary::default()
    };

    let mut desired_names = BTreeSet::new();

    for connector in &connectors {
        let connector_name = connector.name_any();
        desired_names.insert(connector_name.clone());

        let connector_recon = Reconciliation::new(
            KIND_KAFKA_CONNECTOR,
            namespace,
            connector_name.clone(),
            recon.trigger,
        );

        let result =
            reconcile_connector(&connector_recon, &connector_name, &connector.spec, api).await;

        let (status, succeeded) = match result {
            Ok(mut status) => {
                status.observed_generation = connector.metadata.generation;
                (status, true)
            }
            Err(e) => {
                warn!(
                    connector = %connector_name,
                    error = %e,
                    "Connector reconciliation failed, continuing with siblings"
                );
                (connector_failure_status(&e), false)
            }
        };

        let is_ready = status
            .conditions
            .first()
            .is_some_and(|condition| condition.r#type == "Ready" && condition.status == "True");

        match publish_connector_status(store, namespace, &connector_name, &status).await {
            Ok(()) => {
                if succeeded {
                    if is_ready {
                        summary.ready += 1;
                    }
                } else {
                    summary.failed += 1;
                }
            }
            Err(e) => {
                error!(
                    connector = %connector_name,
                    error = %e,
                    "Failed to write connector status"
                );
                summary.failed += 1;
            }
        }
    }

    // Connectors running on the cluster whose resource is gone get deleted;
    // resource deletion needs no finalizer because the next assembly pass
    // sweeps the runtime
    match api.list_connectors().await {
        Ok(live_names) => {
            for orphan in live_names
                .into_iter()
                .filter(|live| !desired_names.contains(live))
            {
                match api.delete_connector(&orphan).await {
                    Ok(()) => {
                        info!(connector = %orphan, "Deleted connector with no backing resource");
                        summary.orphans_deleted += 1;
                    }
                    Err(e) => {
                        warn!(
                            connector = %orphan,
                            error = %e,
                            "Failed to delete orphaned connector"
                        );
                    }
                }
            }
        }
        Err(e) => {
            warn!(error = %e, "Failed to list live connectors for orphan cleanup");
        }
    }

    summary
}

/// Aggregate a pass summary into the cluster-level status.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn calculate_connect_status(
    connect: &KafkaConnect,
    endpoint: &str,
    summary: ConnectSummary,
) -> KafkaConnectStatus {
    let ready_condition: Condition = if summary.total == 0 {
        create_condition(
            "Ready",
            "True",
            REASON_NO_CONNECTORS,
            "No connectors declared for this cluster",
        )
    } else if summary.ready == summary.total {
        create_condition(
            "Ready",
            "True",
            REASON_ALL_CONNECTORS_READY,
            &format!("All {} connectors are ready", summary.total),
        )
    } else if summary.ready > 0 || summary.failed < summary.total {
        create_condition(
            "Ready",
            "False",
            REASON_PARTIALLY_READY,
            &format!(
                "{}/{} connectors are ready, {} failed",
                summary.ready, summary.total, summary.failed
            ),
        )
    } else {
        create_condition(
            "Ready",
            "False",
            REASON_NONE_READY,
            "No connectors are ready",
        )
    };

    KafkaConnectStatus {
        conditions: vec![ready_condition],
        observed_generation: connect.metadata.generation,
        url: Some(endpoint.to_string()),
        connector_count: Some(summary.total as i32),
        connectors_ready: Some(summary.ready as i32),
        connectors_failed: Some(summary.failed as i32),
    }
}

#[cfg(test)]
#[path = "connect_tests.rs"]
mod connect_tests;
