// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Resource status store abstraction with optimistic concurrency.
//!
//! The reconcilers never mutate specs; they read resources and write status.
//! [`ResourceStatusStore`] is the capability set they depend on, and
//! [`KubeStatusStore`] implements it against the Kubernetes API:
//!
//! - `get_async` returns the current resource including its
//!   `metadata.resourceVersion`, which acts as the compare-and-swap token.
//! - `update_status_async` replaces the status subresource conditioned on
//!   that token; a concurrent writer makes the API server reject the write
//!   with 409, surfaced as [`StoreError::Conflict`] so the caller can re-read
//!   and retry. No write based on a stale read is ever persisted.

use crate::errors::StoreError;
use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use kube::api::PostParams;
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use tracing::debug;

/// Capability set of the declarative-resource backing store.
#[async_trait]
pub trait ResourceStatusStore<K>: Send + Sync {
    /// Fetch the current resource, or `None` if it no longer exists.
    async fn get_async(&self, namespace: &str, name: &str) -> Result<Option<K>, StoreError>;

    /// Write the resource's status subresource.
    ///
    /// The write is conditional on the `resourceVersion` carried by
    /// `resource`; [`StoreError::Conflict`] means the stored version changed
    /// since that read and the caller must re-read before retrying.
    async fn update_status_async(&self, resource: &K) -> Result<K, StoreError>;
}

/// Kubernetes-backed [`ResourceStatusStore`] for any namespaced CRD.
#[derive(Clone)]
pub struct KubeStatusStore {
    client: Client,
}

impl KubeStatusStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api<K>(&self, namespace: &str) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        K::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl<K> ResourceStatusStore<K> for KubeStatusStore
where
    K: Resource<Scope = NamespaceResourceScope>
        + Clone
        + DeserializeOwned
        + Serialize
        + Debug
        + Send
        + Sync,
    K::DynamicType: Default,
{
    async fn get_async(&self, namespace: &str, name: &str) -> Result<Option<K>, StoreError> {
        let api: Api<K> = self.api(namespace);
        Ok(api.get_opt(name).await?)
    }

    async fn update_status_async(&self, resource: &K) -> Result<K, StoreError> {
        let meta = resource.meta();
        let namespace = meta.namespace.clone().unwrap_or_default();
        let name = meta.name.clone().unwrap_or_default();

        let api: Api<K> = self.api(&namespace);

        match api
            .replace_status(&name, &PostParams::default(), resource)
            .await
        {
            Ok(updated) => {
                debug!(
                    namespace = %namespace,
                    name = %name,
                    "Replaced status subresource"
                );
                Ok(updated)
            }
            Err(kube::Error::Api(api_err)) if api_err.code == 409 => {
                Err(StoreError::Conflict { namespace, name })
            }
            Err(kube::Error::Api(api_err)) if api_err.code == 404 => {
                Err(StoreError::NotFound { namespace, name })
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory [`ResourceStatusStore`] with real compare-and-swap semantics,
/// used by the reconciler tests to exercise conflict handling.
#[cfg(test)]
pub mod mock {
    use super::{async_trait, Debug, ResourceStatusStore, StoreError};
    use kube::{Resource, ResourceExt};
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    struct Inner<K> {
        resources: BTreeMap<(String, String), K>,
        version_counter: u64,
        update_calls: u32,
        injected_conflicts: u32,
    }

    /// In-memory store keyed by (namespace, name).
    ///
    /// `update_status_async` enforces the same resourceVersion CAS the API
    /// server does: a write carrying a stale version is rejected with
    /// [`StoreError::Conflict`]. Tests can simulate a concurrent writer with
    /// [`MockStatusStore::bump_version`] or [`MockStatusStore::inject_conflicts`].
    pub struct MockStatusStore<K> {
        state: Mutex<Inner<K>>,
    }

    impl<K> Default for MockStatusStore<K> {
        fn default() -> Self {
            Self {
                state: Mutex::new(Inner {
                    resources: BTreeMap::new(),
                    version_counter: 1,
                    update_calls: 0,
                    injected_conflicts: 0,
                }),
            }
        }
    }

    impl<K> MockStatusStore<K>
    where
        K: Resource + Clone,
        K::DynamicType: Default,
    {
        pub fn new() -> Self {
            Self::default()
        }

        /// Seed the store with a resource, assigning it a resourceVersion.
        pub fn insert(&self, mut resource: K) {
            let mut state = self.state.lock().unwrap();
            state.version_counter += 1;
            resource.meta_mut().resource_version = Some(state.version_counter.to_string());
            let key = (
                resource.namespace().unwrap_or_default(),
                resource.name_any(),
            );
            state.resources.insert(key, resource);
        }

        /// Simulate a concurrent writer: bump the stored resourceVersion so
        /// the next CAS write based on an older read fails.
        pub fn bump_version(&self, namespace: &str, name: &str) {
            let mut state = self.state.lock().unwrap();
            state.version_counter += 1;
            let version = state.version_counter.to_string();
            if let Some(resource) = state
                .resources
                .get_mut(&(namespace.to_string(), name.to_string()))
            {
                resource.meta_mut().resource_version = Some(version);
            }
        }

        /// Make the next `n` status writes conflict, bumping the stored
        /// version each time so a retry against a fresh read succeeds.
        pub fn inject_conflicts(&self, n: u32) {
            self.state.lock().unwrap().injected_conflicts = n;
        }

        /// Number of `update_status_async` calls so far (conflicts included).
        pub fn update_calls(&self) -> u32 {
            self.state.lock().unwrap().update_calls
        }

        /// Current stored copy of a resource.
        pub fn get(&self, namespace: &str, name: &str) -> Option<K> {
            self.state
                .lock()
                .unwrap()
                .resources
                .get(&(namespace.to_string(), name.to_string()))
                .cloned()
        }
    }

    #[async_trait]
    impl<K> ResourceStatusStore<K> for MockStatusStore<K>
    where
        K: Resource + Clone + Debug + Send + Sync,
        K::DynamicType: Default,
    {
        async fn get_async(&self, namespace: &str, name: &str) -> Result<Option<K>, StoreError> {
            Ok(self.get(namespace, name))
        }

        async fn update_status_async(&self, resource: &K) -> Result<K, StoreError> {
            let namespace = resource.namespace().unwrap_or_default();
            let name = resource.name_any();
            let key = (namespace.clone(), name.clone());

            let mut state = self.state.lock().unwrap();
            state.update_calls += 1;

            let Some(stored) = state.resources.get(&key).cloned() else {
                return Err(StoreError::NotFound { namespace, name });
            };

            if state.injected_conflicts > 0 {
                state.injected_conflicts -= 1;
                state.version_counter += 1;
                let version = state.version_counter.to_string();
                if let Some(entry) = state.resources.get_mut(&key) {
                    entry.meta_mut().resource_version = Some(version);
                }
                return Err(StoreError::Conflict { namespace, name });
            }

            if stored.meta().resource_version != resource.meta().resource_version {
                return Err(StoreError::Conflict { namespace, name });
            }

            let mut updated = resource.clone();
            state.version_counter += 1;
            updated.meta_mut().resource_version = Some(state.version_counter.to_string());
            state.resources.insert(key, updated.clone());
            Ok(updated)
        }
    }
}
