//! # Event Journal
//!
//! Append-only log of successful mutations, one entry per operation.
//! Rejected operations never reach the journal.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use idreg_core::{BlockHeight, DocumentHash, IdentityId, KycLevel, Principal, SnapshotError};

use crate::store::RecordStore;

/// A successful registry mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// An identity was created.
    Created {
        id: IdentityId,
        owner: Principal,
        hash: DocumentHash,
        height: BlockHeight,
    },
    /// The owner replaced the document hash.
    HashUpdated {
        id: IdentityId,
        previous: DocumentHash,
        current: DocumentHash,
        height: BlockHeight,
    },
    /// The verifier verified or re-verified the identity.
    Verified {
        id: IdentityId,
        /// Whether the record was already verified before this call.
        was_verified: bool,
        previous_level: KycLevel,
        level: KycLevel,
        height: BlockHeight,
    },
}

impl RegistryEvent {
    /// The identity the event concerns.
    pub fn identity(&self) -> IdentityId {
        match self {
            Self::Created { id, .. } | Self::HashUpdated { id, .. } | Self::Verified { id, .. } => {
                *id
            }
        }
    }

    /// The clock height at which the event happened.
    pub fn height(&self) -> BlockHeight {
        match self {
            Self::Created { height, .. }
            | Self::HashUpdated { height, .. }
            | Self::Verified { height, .. } => *height,
        }
    }

    /// Short event name for logs and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Created { .. } => "CREATED",
            Self::HashUpdated { .. } => "HASH_UPDATED",
            Self::Verified { .. } => "VERIFIED",
        }
    }
}

/// Ordered journal of registry events.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    events: Vec<RegistryEvent>,
}

impl Journal {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_events(events: Vec<RegistryEvent>) -> Self {
        Self { events }
    }

    pub(crate) fn append(&mut self, event: RegistryEvent) {
        self.events.push(event);
    }

    /// All events in the order they happened.
    pub fn events(&self) -> &[RegistryEvent] {
        &self.events
    }

    /// Check the journal against the records in `store`.
    ///
    /// Every event must name an existing identity and every identity must
    /// have exactly one `Created` event.
    pub(crate) fn check_against(&self, store: &RecordStore) -> Result<(), SnapshotError> {
        let mut created: BTreeMap<IdentityId, usize> = store.iter().map(|r| (r.id, 0)).collect();
        for (position, event) in self.events.iter().enumerate() {
            let id = event.identity();
            let count = created
                .get_mut(&id)
                .ok_or(SnapshotError::OrphanEvent { position, id })?;
            if matches!(event, RegistryEvent::Created { .. }) {
                *count += 1;
            }
        }
        match created.into_iter().find(|&(_, found)| found != 1) {
            Some((id, found)) => Err(SnapshotError::CreationEventCount { id, found }),
            None => Ok(()),
        }
    }

    /// Events concerning one identity, oldest first.
    pub fn history(&self, id: IdentityId) -> Vec<RegistryEvent> {
        self.events
            .iter()
            .filter(|e| e.identity() == id)
            .cloned()
            .collect()
    }
}
