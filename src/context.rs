// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for the controllers.
//!
//! All controllers receive an `Arc<Context>` carrying:
//! - the Kubernetes client
//! - a shared HTTP client (connection pooling for every Connect cluster)
//! - a factory producing a [`ConnectApi`] per Connect REST endpoint
//! - the [`ReconcileDriver`] serializing reconciliations per resource identity
//!
//! The factory indirection is what makes the reconcilers testable: production
//! wires [`ConnectRestClient`], tests substitute an in-memory cluster.

use crate::connect::{ConnectApi, ConnectRestClient};
use crate::reconcilers::driver::ReconcileDriver;
use kube::Client;
use std::sync::Arc;

/// Builds a [`ConnectApi`] for a Connect REST endpoint address.
pub type ConnectApiFactory = Arc<dyn Fn(&str) -> Arc<dyn ConnectApi> + Send + Sync>;

/// Shared context passed to all controllers.
#[derive(Clone)]
pub struct Context {
    /// Kubernetes client for API operations
    pub client: Client,

    /// HTTP client shared by every Connect REST client
    pub http_client: reqwest::Client,

    /// Factory producing a Connect API client per cluster endpoint
    pub connect_factory: ConnectApiFactory,

    /// Per-identity reconciliation serialization and trigger coalescing
    pub driver: Arc<ReconcileDriver>,
}

impl Context {
    /// Create a production context wiring [`ConnectRestClient`] as the
    /// Connect API implementation.
    #[must_use]
    pub fn new(client: Client) -> Self {
        let http_client = reqwest::Client::new();
        let http = http_client.clone();

        Self {
            client,
            http_client,
            connect_factory: Arc::new(move |endpoint: &str| {
                Arc::new(ConnectRestClient::new(http.clone(), endpoint)) as Arc<dyn ConnectApi>
            }),
            driver: Arc::new(ReconcileDriver::new()),
        }
    }
}
