//! # Registry Snapshots
//!
//! Host-neutral interchange shape of a registry's full state. How and where
//! a host persists it is the host's business; restoring one goes through
//! [`Registry::restore()`](crate::Registry::restore), which re-checks every
//! invariant before accepting it.

use serde::{Deserialize, Serialize};

use idreg_core::{BlockHeight, IdentityId, SnapshotError};

use crate::config::RegistryConfig;
use crate::journal::RegistryEvent;
use crate::record::Identity;

/// Snapshot format this build writes and reads.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Complete registry state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub format_version: u32,
    pub config: RegistryConfig,
    pub next_id: IdentityId,
    #[serde(default)]
    pub last_height: Option<BlockHeight>,
    pub records: Vec<Identity>,
    #[serde(default)]
    pub events: Vec<RegistryEvent>,
}

impl RegistrySnapshot {
    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON. Invariants are checked on restore, not here.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}
