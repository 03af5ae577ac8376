// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes reconciliation controllers for Kafka Connect resources.
//!
//! This module contains the reconciliation engine for the Konnekt Custom
//! Resources: the per-connector convergence algorithm, the per-cluster
//! orchestration, the optimistic-concurrency status writer and the driver
//! that serializes reconciliations per resource identity.
//!
//! # Reconciliation Architecture
//!
//! Konnekt follows the standard Kubernetes controller pattern:
//!
//! 1. **Watch** - Monitor resource changes via the Kubernetes API
//! 2. **Reconcile** - Diff desired state (CRD spec) against the live state
//!    reported by the Connect REST API
//! 3. **Update** - Issue the minimal create/update/delete/pause/resume/restart
//!    calls needed to converge
//! 4. **Status** - Project the resulting runtime state back into the resource
//!    status, safely against concurrent writers
//!
//! # Modules
//!
//! - [`connect`] - `KafkaConnect` assembly reconciliation with partial-failure
//!   isolation and runtime orphan cleanup
//! - [`connector`] - per-connector diff / mutate / observe / report
//! - [`driver`] - at-most-one in-flight reconciliation per identity with
//!   trigger coalescing
//! - [`status`] - condition helpers and bounded compare-and-swap status writes
//! - [`retry`] - exponential backoff for Kubernetes and Connect REST calls
//!
//! # Example: Reconciling a Cluster
//!
//! ```rust,no_run
//! use konnekt::context::Context;
//! use konnekt::crd::KafkaConnect;
//! use konnekt::reconcilers::driver::{Reconciliation, TriggerReason};
//! use konnekt::reconcilers::reconcile_connect;
//! use std::sync::Arc;
//!
//! async fn reconcile(ctx: Arc<Context>, connect: KafkaConnect) -> anyhow::Result<()> {
//!     let recon = Reconciliation::new("KafkaConnect", "kafka", "my-connect", TriggerReason::Updated);
//!     reconcile_connect(ctx, &recon, &connect).await?;
//!     Ok(())
//! }
//! ```

pub mod connect;
pub mod connector;
pub mod driver;
pub mod retry;
pub mod status;

pub use connect::{calculate_connect_status, reconcile_connect, ConnectSummary};
pub use connector::{connector_failure_status, reconcile_connector};
pub use driver::{Admission, ReconcileDriver, Reconciliation, TriggerReason};
pub use status::{publish_connect_status, publish_connector_status};
