//! Broadcast echo groups
//!
//! An [`EchoGroup`] is the live membership set of one acknowledged-echo
//! endpoint. Membership changes and broadcast snapshots take the same lock,
//! so a session that left before a broadcast started is never part of it.
//! Delivery happens after the lock is released.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tracing::{debug, warn};

use crate::session::{Acknowledgement, Outbound, SessionId, Transport};

/// Outcome of one broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Members the frame was handed to
    pub delivered: usize,
    /// Members whose transport refused the frame
    pub failed: usize,
}

/// Live set of open sessions on one echo endpoint
pub struct EchoGroup {
    endpoint: String,
    members: Mutex<BTreeMap<SessionId, Arc<dyn Transport>>>,
}

impl EchoGroup {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            members: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Add a session; returns `false` if it was already a member
    pub fn join(&self, session_id: &str, transport: Arc<dyn Transport>) -> bool {
        self.lock()
            .insert(session_id.to_string(), transport)
            .is_none()
    }

    /// Remove a session; returns `false` if it was not a member
    pub fn leave(&self, session_id: &str) -> bool {
        self.lock().remove(session_id).is_some()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.lock().contains_key(session_id)
    }

    /// Ids of the current members
    pub fn members(&self) -> Vec<SessionId> {
        self.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Emit `event` with `payload` to every member, then complete `ack`
    ///
    /// Members are snapshotted when the call starts. A member whose transport
    /// fails is logged and skipped; the acknowledgement still fires exactly
    /// once, after every member has been attempted.
    pub fn broadcast_and_ack(
        &self,
        event: &str,
        payload: &Value,
        ack: Option<Acknowledgement>,
    ) -> BroadcastReport {
        let snapshot: Vec<(SessionId, Arc<dyn Transport>)> = self
            .lock()
            .iter()
            .map(|(id, transport)| (id.clone(), Arc::clone(transport)))
            .collect();

        let mut report = BroadcastReport::default();
        for (session_id, transport) in snapshot {
            let frame = Outbound::Event {
                name: event.to_string(),
                data: payload.clone(),
            };
            match transport.deliver(frame) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        endpoint = %self.endpoint,
                        session = %session_id,
                        "echo delivery failed: {}",
                        e
                    );
                }
            }
        }

        debug!(
            endpoint = %self.endpoint,
            delivered = report.delivered,
            failed = report.failed,
            "broadcast {}",
            event
        );

        if let Some(ack) = ack {
            ack.complete();
        }

        report
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<SessionId, Arc<dyn Transport>>> {
        self.members.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for EchoGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EchoGroup")
            .field("endpoint", &self.endpoint)
            .field("members", &self.members())
            .finish()
    }
}

/// One [`EchoGroup`] per echo endpoint path
#[derive(Default)]
pub struct EchoGroups {
    groups: Mutex<HashMap<String, Arc<EchoGroup>>>,
}

impl EchoGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group for an endpoint path, created on first use
    pub fn group(&self, endpoint: &str) -> Arc<EchoGroup> {
        let mut groups = self.groups.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            groups
                .entry(endpoint.to_string())
                .or_insert_with(|| Arc::new(EchoGroup::new(endpoint))),
        )
    }

    /// Total members across all groups
    pub fn member_count(&self) -> usize {
        self.groups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|group| group.len())
            .sum()
    }
}
