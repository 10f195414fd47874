//! # Document Hashes — Evidence Commitments
//!
//! The registry never stores identity documents, only a hash of them.
//! [`DocumentHash`] is that hash, and [`HashFormat`] is the configured rule
//! a hash string must satisfy before the registry accepts it.
//!
//! ## Formats
//!
//! - [`HashFormat::Hex`] — exactly `length` hex digits (default 64, the
//!   SHA-256 rendering). Either case is accepted; the string is stored as
//!   supplied.
//! - [`HashFormat::Ascii`] — 1 to `max_length` printable ASCII characters,
//!   for hosts that commit to something other than a hex digest.
//!
//! [`sha256_document()`] computes the default-format hash of raw document
//! bytes, so hosts and tools can derive the evidence hash locally.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::ValidationError;

/// Hex length of a SHA-256 digest.
pub const DEFAULT_HASH_LENGTH: usize = 64;

/// The format a document hash must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HashFormat {
    /// Exactly `length` ASCII hex digits.
    Hex {
        /// Required number of hex digits.
        length: usize,
    },
    /// Between 1 and `max_length` printable ASCII characters.
    Ascii {
        /// Maximum number of characters.
        max_length: usize,
    },
}

impl Default for HashFormat {
    fn default() -> Self {
        Self::Hex {
            length: DEFAULT_HASH_LENGTH,
        }
    }
}

impl HashFormat {
    /// Validate a hash string against this format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidHashFormat`] naming the expected
    /// format when the string does not match.
    pub fn validate(&self, value: &str) -> Result<DocumentHash, ValidationError> {
        let ok = match *self {
            Self::Hex { length } => {
                value.len() == length && value.chars().all(|c| c.is_ascii_hexdigit())
            }
            Self::Ascii { max_length } => {
                !value.is_empty()
                    && value.len() <= max_length
                    && value.chars().all(|c| c.is_ascii_graphic() || c == ' ')
            }
        };
        if !ok {
            return Err(ValidationError::InvalidHashFormat {
                value: value.to_string(),
                expected: self.to_string(),
            });
        }
        Ok(DocumentHash(value.to_string()))
    }

    /// Re-check an already constructed hash, e.g. one loaded from storage.
    pub fn check(&self, hash: &DocumentHash) -> Result<(), ValidationError> {
        self.validate(hash.as_str()).map(|_| ())
    }
}

impl std::fmt::Display for HashFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hex { length } => write!(f, "{length} hex characters"),
            Self::Ascii { max_length } => {
                write!(f, "1-{max_length} printable ASCII characters")
            }
        }
    }
}

/// A document hash that passed format validation.
///
/// Obtained from [`HashFormat::validate()`] or [`sha256_document()`].
/// Deserialization does not re-validate; callers loading persisted data
/// re-check with [`HashFormat::check()`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentHash(String);

impl DocumentHash {
    /// Access the hash string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the lowercase hex SHA-256 of raw document bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Compute the SHA-256 evidence hash of a document.
///
/// The result always satisfies the default [`HashFormat`].
pub fn sha256_document(data: &[u8]) -> DocumentHash {
    DocumentHash(sha256_hex(data))
}
