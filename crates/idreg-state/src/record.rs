//! # Identity Records
//!
//! The sole entity of the registry and its read projections.

use serde::{Deserialize, Serialize};

use idreg_core::{BlockHeight, DocumentHash, IdentityId, KycLevel, Principal};

/// An identity record.
///
/// `id`, `owner` and `timestamp` never change after creation. `verified`
/// only ever moves from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Sequential identifier, assigned at creation.
    pub id: IdentityId,
    /// The principal that created the record.
    pub owner: Principal,
    /// Hash of the off-chain identity documents.
    pub hash: DocumentHash,
    /// Whether the verifier has verified the record.
    pub verified: bool,
    /// Trust tier set by the verifier; 0 until verified.
    pub kyc_level: KycLevel,
    /// Logical clock height at creation.
    pub timestamp: BlockHeight,
}

impl Identity {
    /// The record's position in the per-record state machine.
    pub fn status(&self) -> IdentityStatus {
        if self.verified {
            IdentityStatus::Verified(self.kyc_level)
        } else {
            IdentityStatus::Unverified
        }
    }

    /// The read projection returned by `get-identity-data`.
    pub fn data(&self) -> IdentityData {
        IdentityData {
            owner: self.owner.clone(),
            verified: self.verified,
            hash: self.hash.clone(),
            kyc_level: self.kyc_level,
            timestamp: self.timestamp,
        }
    }
}

/// Full-record projection: everything except the id, which the caller
/// already holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityData {
    pub owner: Principal,
    pub verified: bool,
    pub hash: DocumentHash,
    #[serde(rename = "kyc-level")]
    pub kyc_level: KycLevel,
    pub timestamp: BlockHeight,
}

/// Lifecycle state of an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "kyc_level", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentityStatus {
    /// Created, not yet verified; level is 0.
    Unverified,
    /// Verified at the given level.
    Verified(KycLevel),
}

impl IdentityStatus {
    /// Whether the record has been verified.
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified(_))
    }
}

impl std::fmt::Display for IdentityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unverified => f.write_str("UNVERIFIED"),
            Self::Verified(level) => write!(f, "VERIFIED(L{level})"),
        }
    }
}
