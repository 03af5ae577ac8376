// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#![allow(unexpected_cfgs)]

//! # Konnekt - Kafka Connect Operator for Kubernetes
//!
//! Konnekt is a Kubernetes operator written in Rust that keeps running Kafka
//! Connect clusters and their connectors in sync with declarative Custom
//! Resources.
//!
//! ## Overview
//!
//! This library provides the core functionality for the Konnekt operator,
//! including:
//!
//! - Custom Resource Definitions (CRDs) for Connect clusters and connectors
//! - The reconciliation engine: diff declared connector configuration against
//!   live runtime state, drive the Connect REST API toward the desired state,
//!   and project runtime state back into resource status
//! - Optimistic-concurrency status writes (no lost updates, no locks)
//! - Trigger coalescing: at most one in-flight reconciliation per resource
//!
//! ## Modules
//!
//! - [`crd`] - Custom Resource Definition types
//! - [`reconcilers`] - Reconciliation logic for each resource type
//! - [`connect`] - Kafka Connect REST API client abstraction
//! - [`store`] - Resource status store with compare-and-swap semantics
//! - [`context`] - Shared context for the controllers
//!
//! ## Example
//!
//! ```rust,no_run
//! use konnekt::crd::KafkaConnectorSpec;
//! use std::collections::BTreeMap;
//!
//! let mut config = BTreeMap::new();
//! config.insert("topic".to_string(), serde_json::json!("my-topic"));
//!
//! let spec = KafkaConnectorSpec {
//!     class_name: "org.apache.kafka.connect.file.FileStreamSourceConnector".to_string(),
//!     tasks_max: 1,
//!     config: Some(config),
//!     pause: None,
//! };
//! ```
//!
//! ## Features
//!
//! - **Minimal mutation** - an unchanged spec issues zero write calls
//! - **Partial-failure isolation** - one bad connector never blocks its siblings
//! - **Verbatim status passthrough** - the Connect `/status` payload is
//!   projected into `status.connectorStatus` exactly as received
//! - **Bounded task restarts** - one restart per FAILED task per pass

pub mod connect;
pub mod constants;
pub mod context;
pub mod crd;
pub mod errors;
pub mod http_errors;
pub mod labels;
pub mod metrics;
pub mod reconcilers;
pub mod status_reasons;
pub mod store;
