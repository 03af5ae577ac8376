// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use futures::StreamExt;
use konnekt::{
    constants::{KIND_KAFKA_CONNECT, REQUEUE_NOT_READY_SECS, REQUEUE_READY_SECS},
    context::Context,
    crd::{KafkaConnect, KafkaConnector},
    metrics::{record_reconciliation, render},
    reconcilers::{
        driver::{Reconciliation, TriggerReason},
        reconcile_connect,
    },
};
use kube::{
    runtime::{controller::Action, reflector::ObjectRef, watcher::Config, Controller},
    Api, Client, ResourceExt,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
struct ReconcileError(#[from] anyhow::Error);

fn main() -> Result<()> {
    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .thread_name("konnekt-controller")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    // Initialize logging with custom format
    // Format: timestamp file:line LEVEL message
    //
    // Respects RUST_LOG environment variable if set, otherwise defaults to INFO level
    // Example: RUST_LOG=debug cargo run
    //
    // Respects RUST_LOG_FORMAT environment variable for output format
    // Example: RUST_LOG_FORMAT=json cargo run
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    info!("Starting Kafka Connect Controller");

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    let ctx = Arc::new(Context::new(client));

    info!("Starting all controllers");

    // Controllers should never exit - if one fails, we log it and exit the main process
    tokio::select! {
        result = run_connect_controller(ctx.clone()) => {
            error!("CRITICAL: KafkaConnect controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("KafkaConnect controller exited unexpectedly without error")
        }
        result = run_metrics_server() => {
            error!("CRITICAL: metrics server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Metrics server exited unexpectedly without error")
        }
    }
}

/// Run the `KafkaConnect` controller.
///
/// Connector changes are funneled into their owning cluster's reconciliation
/// through a watch mapping on the `kafka.konnekt.io/cluster` label, so a
/// single controller drives both resource kinds.
async fn run_connect_controller(ctx: Arc<Context>) -> Result<()> {
    info!("Starting KafkaConnect controller");

    let connects = Api::<KafkaConnect>::all(ctx.client.clone());
    let connectors = Api::<KafkaConnector>::all(ctx.client.clone());

    Controller::new(connects, Config::default())
        .watches(connectors, Config::default(), |connector: KafkaConnector| {
            let namespace = connector.namespace().unwrap_or_default();
            connector
                .cluster_name()
                .map(|cluster| ObjectRef::<KafkaConnect>::new(cluster).within(&namespace))
        })
        .run(reconcile_connect_wrapper, error_policy, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Reconcile wrapper for `KafkaConnect`
async fn reconcile_connect_wrapper(
    connect: Arc<KafkaConnect>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let namespace = connect.namespace().unwrap_or_default();
    let name = connect.name_any();

    let trigger = if connect.metadata.deletion_timestamp.is_some() {
        TriggerReason::Deleted
    } else if connect.status.is_none() {
        TriggerReason::Created
    } else {
        TriggerReason::Updated
    };
    let recon = Reconciliation::new(KIND_KAFKA_CONNECT, namespace, name, trigger);

    debug!(identity = %recon, "Reconcile wrapper called for KafkaConnect");

    let start = Instant::now();
    let driver = ctx.driver.clone();
    let outcome = driver
        .run(recon.clone(), |current| {
            let ctx = ctx.clone();
            let connect = connect.clone();
            async move { reconcile_connect(ctx, &current, &connect).await }
        })
        .await;

    match outcome {
        None => {
            // Folded into the in-flight pass; its follow-up covers this trigger
            debug!(identity = %recon, "Trigger coalesced into running reconciliation");
            Ok(Action::requeue(Duration::from_secs(REQUEUE_NOT_READY_SECS)))
        }
        Some(Ok(())) => {
            record_reconciliation(KIND_KAFKA_CONNECT, "success", start.elapsed());
            info!("Successfully reconciled KafkaConnect: {}", connect.name_any());

            // Check if the cluster is ready to determine the requeue interval
            let is_ready = connect
                .status
                .as_ref()
                .and_then(|status| status.conditions.first())
                .is_some_and(|condition| condition.r#type == "Ready" && condition.status == "True");

            if is_ready {
                Ok(Action::requeue(Duration::from_secs(REQUEUE_READY_SECS)))
            } else {
                Ok(Action::requeue(Duration::from_secs(REQUEUE_NOT_READY_SECS)))
            }
        }
        Some(Err(e)) => {
            record_reconciliation(KIND_KAFKA_CONNECT, "error", start.elapsed());
            error!("Failed to reconcile KafkaConnect: {}", e);
            Err(ReconcileError(e.into()))
        }
    }
}

/// Error policy for the controller
fn error_policy(
    _resource: Arc<impl std::fmt::Debug>,
    _err: &ReconcileError,
    _ctx: Arc<Context>,
) -> Action {
    Action::requeue(Duration::from_secs(REQUEUE_NOT_READY_SECS))
}

/// Serve Prometheus metrics and a liveness probe.
async fn run_metrics_server() -> Result<()> {
    let addr =
        std::env::var("KONNEKT_METRICS_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let app = axum::Router::new()
        .route("/metrics", axum::routing::get(|| async { render() }))
        .route("/healthz", axum::routing::get(|| async { "ok" }));

    info!("Serving metrics on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
