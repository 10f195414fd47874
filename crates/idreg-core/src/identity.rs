//! # Identity Newtypes
//!
//! Domain-primitive newtypes for the registry. Each is a distinct type:
//! you cannot pass a [`BlockHeight`] where an [`IdentityId`] is expected.
//!
//! ## Validation
//!
//! [`Principal`] and [`IdentityId`] validate at construction time.
//! [`BlockHeight`] and [`KycLevel`] accept every value of their range.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Maximum length of a principal identifier.
pub const MAX_PRINCIPAL_LEN: usize = 128;

// ---------------------------------------------------------------------------
// Principal
// ---------------------------------------------------------------------------

/// The identifier of a calling actor (account or user).
///
/// Supplied by the host environment for every operation. The registry
/// compares principals for equality and never interprets them further.
///
/// # Validation
///
/// - 1 to [`MAX_PRINCIPAL_LEN`] characters
/// - ASCII alphanumerics plus `.`, `-` and `_` (covers ledger addresses
///   such as `ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM` and contract
///   principals such as `ST1PQ...GZGM.digital-identity`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    /// Create a principal, validating its format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPrincipal`] if the string is empty,
    /// too long, or contains a character outside `[A-Za-z0-9._-]`.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        let valid = !s.is_empty()
            && s.len() <= MAX_PRINCIPAL_LEN
            && s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        if !valid {
            return Err(ValidationError::InvalidPrincipal(s));
        }
        Ok(Self(s))
    }

    /// Access the principal string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Principal {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Principal> for String {
    fn from(p: Principal) -> Self {
        p.0
    }
}

impl std::str::FromStr for Principal {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// IdentityId
// ---------------------------------------------------------------------------

/// Sequential identifier of an identity record.
///
/// Ids are assigned starting at 1 in creation order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct IdentityId(u64);

impl IdentityId {
    /// The id assigned to the first identity ever created.
    pub const FIRST: IdentityId = IdentityId(1);

    /// Create an identity id from its integer value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidIdentityId`] for 0.
    pub fn new(value: u64) -> Result<Self, ValidationError> {
        if value == 0 {
            return Err(ValidationError::InvalidIdentityId(value));
        }
        Ok(Self(value))
    }

    /// The integer value.
    pub fn get(&self) -> u64 {
        self.0
    }

    /// The id that follows this one.
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl TryFrom<u64> for IdentityId {
    type Error = ValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IdentityId> for u64 {
    fn from(id: IdentityId) -> Self {
        id.0
    }
}

impl std::fmt::Display for IdentityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// BlockHeight
// ---------------------------------------------------------------------------

/// Logical clock reading supplied by the host for each operation.
///
/// Monotonically non-decreasing across operations. The registry uses it
/// only to timestamp creation and journal entries.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BlockHeight(pub u64);

impl BlockHeight {
    /// The height that follows this one.
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// The integer value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// KycLevel
// ---------------------------------------------------------------------------

/// Trust tier attached to an identity by the verifier.
///
/// 0 at creation. No upper bound is imposed beyond the integer range.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct KycLevel(pub u32);

impl KycLevel {
    /// Level of a record that has never been verified.
    pub const NONE: KycLevel = KycLevel(0);

    /// The integer value.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for KycLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
