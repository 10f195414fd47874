//! # idreg-state — Identity Registry State Machine
//!
//! A deterministic, single-writer registry in which each principal may claim
//! exactly one identity record, evidenced by a document hash, and a single
//! verifier principal may attach a KYC level to it.
//!
//! ## Components (leaf first)
//!
//! - **RecordStore** (`store.rs`): identity records plus the principal → id
//!   ownership index. Both maps change together or not at all.
//! - **AccessController** (`access.rs`): stateless owner/verifier predicates.
//! - **IdentityLifecycle** (`lifecycle.rs`): create, update and verify. Every
//!   precondition is checked before the first effect is applied.
//! - **QueryService** (`query.rs`): side-effect-free projections with no
//!   authorization gate.
//! - **Registry** (`registry.rs`): owns the state, the configuration and the
//!   event journal. It is the only entry point for mutations and hands out
//!   the query service for reads.
//!
//! ## Per-Record State Machine
//!
//! ```text
//! Unregistered ──create──▶ Unverified(level 0) ──verify(L)──▶ Verified(L)
//!                               │  ▲                          │  ▲
//!                               └──┘ update(hash)             └──┘ update(hash), verify(L')
//! ```
//!
//! There is no transition back to `Unregistered` and none from `Verified`
//! to `Unverified`.
//!
//! ## Host Contract
//!
//! The host environment serializes operations, and supplies the calling
//! principal and the current logical clock height with every mutating call
//! (see [`CallContext`]).

pub mod access;
pub mod config;
pub mod journal;
pub mod lifecycle;
pub mod query;
pub mod record;
pub mod registry;
pub mod snapshot;
pub mod store;

pub use access::AccessController;
pub use config::{ConfigError, RegistryConfig};
pub use journal::{Journal, RegistryEvent};
pub use lifecycle::{CallContext, IdentityLifecycle};
pub use query::QueryService;
pub use record::{Identity, IdentityData, IdentityStatus};
pub use registry::Registry;
pub use snapshot::{RegistrySnapshot, SNAPSHOT_FORMAT_VERSION};
pub use store::RecordStore;
