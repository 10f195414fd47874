//! # idreg-core — Foundational Types for the Identity Registry
//!
//! This crate is the leaf of the workspace. It defines the domain primitives
//! every other `idreg-*` crate builds on, and depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `Principal`, `IdentityId`,
//!    `BlockHeight`, `KycLevel` are distinct types. You cannot pass a height
//!    where an identity id is expected.
//!
//! 2. **Validated document hashes.** A `DocumentHash` only exists after it has
//!    passed a [`HashFormat`] check. The registry stores hashes, never the
//!    documents they commit to.
//!
//! 3. **One error taxonomy.** [`RegistryError`] carries the four stable,
//!    caller-distinguishable failure kinds. Hosts branch on
//!    [`RegistryError::code()`], never on message text.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `idreg-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod digest;
pub mod error;
pub mod identity;

pub use digest::{sha256_document, sha256_hex, DocumentHash, HashFormat, DEFAULT_HASH_LENGTH};
pub use error::{RegistryError, Role, SnapshotError, ValidationError};
pub use identity::{BlockHeight, IdentityId, KycLevel, Principal, MAX_PRINCIPAL_LEN};
