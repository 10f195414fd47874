//! # Error Hierarchy
//!
//! Structured error types for the identity registry, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! [`RegistryError`] is the operation-level taxonomy. Every mutating
//! operation validates all of its preconditions before touching state, so
//! any `RegistryError` returned to a caller implies the registry is unchanged.

use thiserror::Error;

use crate::identity::{IdentityId, Principal};

/// The role a caller needed to hold for a rejected operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The principal recorded as the identity's owner.
    Owner,
    /// The single verifier principal fixed at registry initialization.
    Verifier,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Owner => f.write_str("owner"),
            Self::Verifier => f.write_str("verifier"),
        }
    }
}

/// Failure kinds of the registry operations.
///
/// The kinds are stable: hosts match on the variant or on [`code()`](Self::code).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Creation attempted by a principal that already owns an identity.
    #[error("principal {owner} already owns identity {existing}")]
    DuplicateOwner {
        /// The principal that attempted the creation.
        owner: Principal,
        /// The identity the principal already owns.
        existing: IdentityId,
    },

    /// The supplied document hash fails format validation.
    #[error("invalid hash format: {0}")]
    InvalidHashFormat(#[source] ValidationError),

    /// The referenced identity id has no record.
    #[error("identity {id} not found")]
    NotFound {
        /// The id that was looked up.
        id: IdentityId,
    },

    /// The caller lacks the role the operation requires.
    #[error("principal {caller} is not the {required}")]
    NotAuthorized {
        /// The principal that made the call.
        caller: Principal,
        /// The role that was required.
        required: Role,
    },
}

impl RegistryError {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateOwner { .. } => "DUPLICATE_OWNER",
            Self::InvalidHashFormat(_) => "INVALID_HASH_FORMAT",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::NotAuthorized { .. } => "NOT_AUTHORIZED",
        }
    }

    /// Numeric error code in the ledger's `(err uN)` convention.
    ///
    /// The ledger distinguishes the missing role: `u100` for a caller that
    /// is not the verifier, `u101` for a caller that is not the owner.
    pub fn numeric_code(&self) -> u32 {
        match self {
            Self::NotAuthorized {
                required: Role::Verifier,
                ..
            } => 100,
            Self::NotAuthorized {
                required: Role::Owner,
                ..
            } => 101,
            Self::DuplicateOwner { .. } => 102,
            Self::NotFound { .. } => 103,
            Self::InvalidHashFormat(_) => 104,
        }
    }
}

/// Validation errors for domain primitive newtypes.
///
/// These errors carry the invalid input and the expected format so that
/// operators can diagnose misconfiguration without guesswork.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Principal is empty, too long, or contains disallowed characters.
    #[error("invalid principal: \"{0}\" (expected 1-128 characters of [A-Za-z0-9._-])")]
    InvalidPrincipal(String),

    /// Document hash does not match the configured format.
    #[error("invalid document hash: \"{value}\" (expected {expected})")]
    InvalidHashFormat {
        /// The rejected hash string.
        value: String,
        /// Description of the configured format.
        expected: String,
    },

    /// Identity ids start at 1.
    #[error("invalid identity id: {0} (ids start at 1)")]
    InvalidIdentityId(u64),
}

/// Errors restoring a persisted registry snapshot.
///
/// A snapshot is only accepted if it satisfies the same invariants the live
/// registry maintains; anything else is rejected wholesale.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The snapshot was written by an unknown format version.
    #[error("unsupported snapshot format version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the snapshot.
        found: u32,
        /// Version this build understands.
        expected: u32,
    },

    /// Record ids are not exactly 1..=N in order.
    #[error("record at position {position} has id {found}, expected {expected}")]
    NonSequentialId {
        /// Zero-based position in the record list.
        position: usize,
        /// The id found at that position.
        found: IdentityId,
        /// The id required at that position.
        expected: IdentityId,
    },

    /// The stored next-id counter disagrees with the record count.
    #[error("next id is {found} but {records} records imply {expected}")]
    CounterMismatch {
        /// The counter value in the snapshot.
        found: IdentityId,
        /// The counter value the records imply.
        expected: IdentityId,
        /// Number of records in the snapshot.
        records: usize,
    },

    /// Two records share an owner.
    #[error("principal {owner} owns both identity {first} and identity {second}")]
    OwnerIndexMismatch {
        /// The principal owning more than one record.
        owner: Principal,
        /// The first record owned.
        first: IdentityId,
        /// The second record owned.
        second: IdentityId,
    },

    /// A record's hash fails the snapshot's own configured format.
    #[error("record {id} holds a hash rejected by the configured format: {source}")]
    InvalidRecordHash {
        /// The offending record.
        id: IdentityId,
        /// Why the hash was rejected.
        #[source]
        source: ValidationError,
    },

    /// A journal event names an identity that has no record.
    #[error("journal event {position} refers to identity {id}, which has no record")]
    OrphanEvent {
        /// Zero-based position in the journal.
        position: usize,
        /// The identity the event names.
        id: IdentityId,
    },

    /// A record does not have exactly one creation event in the journal.
    #[error("identity {id} has {found} creation events in the journal, expected 1")]
    CreationEventCount {
        /// The record concerned.
        id: IdentityId,
        /// Creation events found for it.
        found: usize,
    },

    /// The snapshot could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
