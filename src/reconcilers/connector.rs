// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-connector convergence: diff, mutate, observe, report.
//!
//! One invocation drives a single connector toward its declared spec:
//!
//! 1. Validate the spec (invalid specs can never converge and are not retried)
//! 2. Fetch the live configuration; absence means "must create"
//! 3. Diff desired against live, key by key, ignoring the server-injected
//!    `name`; equal configs skip the mutation entirely
//! 4. Apply the full desired config in one atomic PUT when they differ
//! 5. Poll connector and task status once (no wait-until-converged loop)
//! 6. Pause or resume when the polled state disagrees with `spec.pause`
//! 7. Restart FAILED tasks, bounded per task per pass
//! 8. Project the polled document verbatim into status and derive the Ready
//!    condition from it

use crate::connect::{configs_equal, effective_config, ConnectApi, ConnectorState};
use crate::constants::{MAX_TASK_RESTARTS_PER_PASS, TRACE_MESSAGE_MAX_LEN};
use crate::crd::{KafkaConnectorSpec, KafkaConnectorStatus};
use crate::errors::{ConnectError, ConnectorError};
use crate::reconcilers::driver::Reconciliation;
use crate::reconcilers::status::create_condition;
use crate::status_reasons::{
    REASON_CONNECTOR_NOT_FOUND, REASON_CONNECTOR_NOT_READY, REASON_CONNECTOR_PAUSED,
    REASON_CONNECTOR_READY, REASON_TASK_FAILED,
};
use tracing::{debug, info, warn};

/// Reconcile one connector against the Connect cluster.
///
/// Returns the status to publish for the connector. The caller owns
/// `observedGeneration` (it reflects the resource generation the spec was
/// read at) and the status write itself.
///
/// # Errors
///
/// * [`ConnectorError::InvalidSpec`] - the spec can never converge; not retried
/// * [`ConnectorError::ConnectUnavailable`] - the Connect cluster refused or
///   dropped the conversation; retried on the next trigger, not within this pass
pub async fn reconcile_connector(
    recon: &Reconciliation,
    name: &str,
    spec: &KafkaConnectorSpec,
    api: &dyn ConnectApi,
) -> Result<KafkaConnectorStatus, ConnectorError> {
    debug!(identity = %recon, connector = %name, "Reconciling connector");

    validate_spec(name, spec)?;

    let desired = effective_config(spec);

    // Absence is not an error - it means "must create"
    let live = api
        .connector_config(name)
        .await
        .map_err(|e| connect_unavailable(name, e))?;

    let needs_apply = match &live {
        None => {
            info!(connector = %name, "Connector not present, creating");
            true
        }
        Some(live_config) => {
            let differs = !configs_equal(&desired, live_config);
            if differs {
                info!(connector = %name, "Connector configuration drifted, updating");
            } else {
                debug!(connector = %name, "Connector configuration up to date");
            }
            differs
        }
    };

    if needs_apply {
        api.create_or_update_connector(name, &desired)
            .await
            .map_err(|e| match e {
                // Connect validates the whole config on PUT; a 400 means the
                // spec itself is bad, which only a spec edit can fix
                ConnectError::Api {
                    status: 400,
                    message,
                } => ConnectorError::InvalidSpec {
                    connector: name.to_string(),
                    reason: message,
                },
                other => connect_unavailable(name, other),
            })?;
    }

    // Single status poll for this pass; feeds the pause delta, the restart
    // candidates and the projected status alike
    let Some(status_doc) = api
        .connector_status(name)
        .await
        .map_err(|e| connect_unavailable(name, e))?
    else {
        warn!(connector = %name, "Connector has no status yet after apply");
        return Ok(KafkaConnectorStatus {
            conditions: vec![create_condition(
                "Ready",
                "False",
                REASON_CONNECTOR_NOT_FOUND,
                "Connector not yet visible on the Connect cluster",
            )],
            observed_generation: None,
            connector_status: None,
        });
    };

    let state = status_doc.connector_state();
    let desired_pause = spec.pause.unwrap_or(false);

    if desired_pause && state != ConnectorState::Paused {
        info!(connector = %name, "Pausing connector");
        api.pause_connector(name)
            .await
            .map_err(|e| connect_unavailable(name, e))?;
    } else if !desired_pause && state == ConnectorState::Paused {
        info!(connector = %name, "Resuming connector");
        api.resume_connector(name)
            .await
            .map_err(|e| connect_unavailable(name, e))?;
    }

    let failed_tasks = status_doc.failed_tasks();
    for task in &failed_tasks {
        for attempt in 0..MAX_TASK_RESTARTS_PER_PASS {
            match api.restart_task(name, task.id).await {
                Ok(()) => {
                    info!(connector = %name, task = task.id, "Restarted FAILED task");
                    break;
                }
                // A failed restart is not a reconciliation error; the task
                // stays FAILED in status and the next pass tries again
                Err(e) => {
                    warn!(
                        connector = %name,
                        task = task.id,
                        attempt = attempt + 1,
                        error = %e,
                        "Task restart failed"
                    );
                }
            }
        }
    }

    let ready = ready_condition(&state, desired_pause, &failed_tasks, status_doc.tasks().len());

    Ok(KafkaConnectorStatus {
        conditions: vec![ready],
        observed_generation: None,
        connector_status: Some(status_doc.into_map()),
    })
}

/// Status to publish when a reconciliation pass failed.
///
/// `observedGeneration` and `connectorStatus` are left unset; the status
/// writer carries the previously observed values forward so a transient
/// failure does not erase the last known runtime state.
#[must_use]
pub fn connector_failure_status(error: &ConnectorError) -> KafkaConnectorStatus {
    KafkaConnectorStatus {
        conditions: vec![create_condition(
            "Ready",
            "False",
            error.reason(),
            &truncate_trace(&error.to_string()),
        )],
        observed_generation: None,
        connector_status: None,
    }
}

fn validate_spec(name: &str, spec: &KafkaConnectorSpec) -> Result<(), ConnectorError> {
    if spec.class_name.trim().is_empty() {
        return Err(ConnectorError::InvalidSpec {
            connector: name.to_string(),
            reason: "className must not be empty".to_string(),
        });
    }

    if spec.tasks_max < 1 {
        return Err(ConnectorError::InvalidSpec {
            connector: name.to_string(),
            reason: format!("tasksMax must be a positive integer, got {}", spec.tasks_max),
        });
    }

    Ok(())
}

fn connect_unavailable(name: &str, error: ConnectError) -> ConnectorError {
    ConnectorError::ConnectUnavailable {
        connector: name.to_string(),
        status: error.status(),
        reason: error.to_string(),
    }
}

/// Derive the Ready condition from the polled runtime state.
///
/// `Ready=True` iff the connector is RUNNING and no task is FAILED; a failing
/// task carries its trace (bounded) into the message.
fn ready_condition(
    state: &ConnectorState,
    desired_pause: bool,
    failed_tasks: &[crate::connect::TaskStatus],
    task_count: usize,
) -> crate::crd::Condition {
    if let Some(first_failed) = failed_tasks.first() {
        let trace = first_failed.trace.as_deref().unwrap_or("no trace reported");
        return create_condition(
            "Ready",
            "False",
            REASON_TASK_FAILED,
            &format!(
                "Task {} is FAILED: {}",
                first_failed.id,
                truncate_trace(trace)
            ),
        );
    }

    match state {
        ConnectorState::Running => create_condition(
            "Ready",
            "True",
            REASON_CONNECTOR_READY,
            &format!("Connector is RUNNING with {task_count} task(s)"),
        ),
        ConnectorState::Paused if desired_pause => create_condition(
            "Ready",
            "False",
            REASON_CONNECTOR_PAUSED,
            "Connector is paused as requested",
        ),
        other => create_condition(
            "Ready",
            "False",
            REASON_CONNECTOR_NOT_READY,
            &format!("Connector state is {}", other.as_str()),
        ),
    }
}

/// Bound a task trace to [`TRACE_MESSAGE_MAX_LEN`] bytes on a char boundary.
fn truncate_trace(trace: &str) -> String {
    if trace.len() <= TRACE_MESSAGE_MAX_LEN {
        return trace.to_string();
    }

    let mut end = TRACE_MESSAGE_MAX_LEN;
    while !trace.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trace[..end])
}

#[cfg(test)]
#[path = "connector_tests.rs"]
mod connector_tests;
