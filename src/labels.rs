// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common label constants used across the reconcilers.
//!
//! This module defines the Konnekt-specific labels that link resources
//! together, to ensure consistency across the controller and the watch
//! mappers.

// ============================================================================
// Konnekt-Specific Labels
// ============================================================================

/// Label linking a `KafkaConnector` resource to the `KafkaConnect` cluster
/// that runs it. The assembly reconciler enumerates its connectors by this
/// label, and the connector watch maps changes back to the owning cluster.
pub const CLUSTER_LABEL: &str = "kafka.konnekt.io/cluster";

/// Build the label selector string matching connectors owned by `cluster`.
#[must_use]
pub fn cluster_selector(cluster: &str) -> String {
    format!("{CLUSTER_LABEL}={cluster}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_selector_format() {
        assert_eq!(
            cluster_selector("my-connect"),
            "kafka.konnekt.io/cluster=my-connect"
        );
    }
}
