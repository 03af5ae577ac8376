// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kafka Connect REST API client abstraction.
//!
//! This module contains everything the reconcilers need to talk to a Kafka
//! Connect cluster:
//!
//! - [`ConnectApi`] - the capability set consumed by the reconcilers
//! - [`ConnectRestClient`] - the HTTP implementation with retry/backoff
//! - [`ConnectorStatusDoc`] - an opaque view over the foreign `/status` payload
//! - [`effective_config`] / [`configs_equal`] - desired-vs-live config diffing
//!
//! The REST payloads are foreign and evolving, so they are handled as opaque
//! JSON documents with typed accessors for the few fields the reconciler
//! inspects (`connector.state`, the task list) and verbatim passthrough for
//! everything else.

pub mod client;
pub mod types;

#[cfg(test)]
pub mod mock;

pub use client::{ConnectApi, ConnectRestClient};
pub use types::{
    configs_equal, effective_config, ConnectorConfig, ConnectorState, ConnectorStatusDoc,
    TaskStatus,
};
