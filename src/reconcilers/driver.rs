// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-resource reconciliation driver.
//!
//! Every trigger (watch event, timer, dependency change) is identified by a
//! [`Reconciliation`]: kind, namespace, name and the trigger cause. The
//! [`ReconcileDriver`] guarantees that at most one reconciliation is in
//! flight per resource identity; a trigger arriving while one is running is
//! coalesced into a single follow-up scheduled right after the current pass
//! completes - never dropped, never run concurrently.
//!
//! State machine per identity: `Idle -> Running -> {Succeeded, Failed} -> Idle`.
//! Terminal states transition straight back to Idle; there is no persistent
//! failed state - failures are retried on the next trigger.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Mutex;
use tracing::debug;

/// Why a reconciliation was triggered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TriggerReason {
    /// The resource was created
    Created,
    /// The resource spec or metadata changed
    Updated,
    /// The resource was deleted
    Deleted,
    /// Periodic re-sync
    Timer,
    /// A dependent resource changed (e.g., a connector triggering its cluster),
    /// or a coalesced follow-up
    Dependency,
}

impl fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            TriggerReason::Created => "Created",
            TriggerReason::Updated => "Updated",
            TriggerReason::Deleted => "Deleted",
            TriggerReason::Timer => "Timer",
            TriggerReason::Dependency => "Dependency",
        };
        f.write_str(reason)
    }
}

/// Identity of one reconciliation pass.
///
/// The serialization key is `{kind, namespace, name}`; the trigger reason is
/// carried for logging and never used for ordering.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Reconciliation {
    /// Resource kind (e.g., "KafkaConnect")
    pub kind: String,
    /// Resource namespace
    pub namespace: String,
    /// Resource name
    pub name: String,
    /// What caused this pass
    pub trigger: TriggerReason,
}

impl Reconciliation {
    #[must_use]
    pub fn new(
        kind: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
        trigger: TriggerReason,
    ) -> Self {
        Self {
            kind: kind.into(),
            namespace: namespace.into(),
            name: name.into(),
            trigger,
        }
    }

    /// The same identity with a different trigger cause.
    #[must_use]
    pub fn with_trigger(&self, trigger: TriggerReason) -> Self {
        Self {
            trigger,
            ..self.clone()
        }
    }

    fn key(&self) -> ResourceKey {
        (
            self.kind.clone(),
            self.namespace.clone(),
            self.name.clone(),
        )
    }
}

impl fmt::Display for Reconciliation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Reconciliation({}, {}/{}, trigger={})",
            self.kind, self.namespace, self.name, self.trigger
        )
    }
}

type ResourceKey = (String, String, String);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SlotState {
    /// A reconciliation is in flight for this identity
    Running,
    /// In flight, plus one coalesced follow-up queued behind it
    RunningPending,
}

/// Outcome of admitting a trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    /// The identity was idle; the caller owns the pass and must run it.
    Started,
    /// A pass is already running; the trigger was folded into its follow-up.
    Coalesced,
}

/// Serializes reconciliations per resource identity.
///
/// The slot map is the only mutable shared state in the engine; it is updated
/// atomically under a plain mutex that is never held across an await point.
#[derive(Default)]
pub struct ReconcileDriver {
    slots: Mutex<HashMap<ResourceKey, SlotState>>,
}

impl ReconcileDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a trigger for an identity.
    ///
    /// Idle identities transition to Running and the caller runs the pass.
    /// Running identities absorb the trigger into at most one pending
    /// follow-up.
    pub fn try_start(&self, recon: &Reconciliation) -> Admission {
        let mut slots = self.slots.lock().unwrap();
        match slots.get_mut(&recon.key()) {
            None => {
                slots.insert(recon.key(), SlotState::Running);
                Admission::Started
            }
            Some(slot) => {
                // Any number of triggers during a run collapse into one follow-up
                *slot = SlotState::RunningPending;
                debug!(identity = %recon, "Coalesced trigger into pending follow-up");
                Admission::Coalesced
            }
        }
    }

    /// Mark the in-flight pass for an identity as finished.
    ///
    /// Returns `true` when a coalesced follow-up is pending; the slot stays
    /// Running and the caller must execute the follow-up. Returns `false`
    /// when the identity is back to Idle.
    pub fn complete(&self, recon: &Reconciliation) -> bool {
        let mut slots = self.slots.lock().unwrap();
        match slots.remove(&recon.key()) {
            Some(SlotState::RunningPending) => {
                slots.insert(recon.key(), SlotState::Running);
                true
            }
            _ => false,
        }
    }

    /// Number of identities currently Running (test and introspection hook).
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.slots.lock().unwrap().len()
    }

    /// Run a reconciliation for `recon`, honoring serialization and coalescing.
    ///
    /// Returns `None` when the trigger was coalesced into an already-running
    /// pass. Otherwise runs `f` to completion, re-running it once per
    /// coalesced follow-up (with `TriggerReason::Dependency`), and returns
    /// the final pass's result. A failed pass still drains its follow-up: the
    /// next trigger must never find a stuck Running slot.
    pub async fn run<F, Fut, T, E>(&self, recon: Reconciliation, mut f: F) -> Option<Result<T, E>>
    where
        F: FnMut(Reconciliation) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if self.try_start(&recon) == Admission::Coalesced {
            return None;
        }

        let mut current = recon;
        loop {
            let result = f(current.clone()).await;

            if self.complete(&current) {
                debug!(identity = %current, "Running coalesced follow-up reconciliation");
                current = current.with_trigger(TriggerReason::Dependency);
            } else {
                return Some(result);
            }
        }
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod driver_tests;
