//! # Identity Lifecycle
//!
//! The three externally invoked mutations: create, update and verify.
//!
//! ## Atomicity
//!
//! Each operation checks every precondition before applying its first
//! effect. On failure the specific [`RegistryError`] is returned and the
//! store and journal are exactly as they were. Precondition order:
//!
//! | Operation | Checks, in order |
//! |-----------|------------------|
//! | create    | hash format, caller owns nothing |
//! | update    | hash format, record exists, caller is owner |
//! | verify    | record exists, caller is verifier |

use idreg_core::{BlockHeight, IdentityId, KycLevel, Principal, RegistryError};

use crate::access::AccessController;
use crate::config::RegistryConfig;
use crate::journal::{Journal, RegistryEvent};
use crate::store::RecordStore;

/// Per-call facts supplied by the host environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    /// The invoking principal.
    pub caller: Principal,
    /// Logical clock height at which the call executes.
    pub height: BlockHeight,
}

impl CallContext {
    pub fn new(caller: Principal, height: BlockHeight) -> Self {
        Self { caller, height }
    }
}

/// Mutating operations over a registry's store and journal.
///
/// Driven by the [`Registry`](crate::Registry) mutation methods, which also
/// record the clock height of every success.
#[derive(Debug)]
pub struct IdentityLifecycle<'a> {
    store: &'a mut RecordStore,
    journal: &'a mut Journal,
    config: &'a RegistryConfig,
}

impl<'a> IdentityLifecycle<'a> {
    pub(crate) fn new(
        store: &'a mut RecordStore,
        journal: &'a mut Journal,
        config: &'a RegistryConfig,
    ) -> Self {
        Self {
            store,
            journal,
            config,
        }
    }

    /// `create-identity`: claim the caller's one identity.
    ///
    /// Returns the new id. The record starts unverified at level 0 with
    /// `timestamp = ctx.height`.
    pub fn create_identity(
        &mut self,
        ctx: &CallContext,
        hash: &str,
    ) -> Result<IdentityId, RegistryError> {
        let hash = self
            .config
            .hash_format
            .validate(hash)
            .map_err(|e| reject(ctx, "create", RegistryError::InvalidHashFormat(e)))?;

        if let Some(existing) = self.store.identity_of(&ctx.caller) {
            return Err(reject(
                ctx,
                "create",
                RegistryError::DuplicateOwner {
                    owner: ctx.caller.clone(),
                    existing,
                },
            ));
        }

        let id = self.store.next_id();
        let record = match self
            .store
            .insert(id, ctx.caller.clone(), hash, ctx.height)
        {
            Ok(record) => record,
            Err(e) => {
                self.store.release(id);
                return Err(reject(ctx, "create", e));
            }
        };

        self.journal.append(RegistryEvent::Created {
            id,
            owner: record.owner.clone(),
            hash: record.hash.clone(),
            height: ctx.height,
        });
        tracing::info!(
            identity = %id,
            owner = %record.owner,
            height = %ctx.height,
            "identity created"
        );
        Ok(id)
    }

    /// `update-identity-data`: the owner replaces the document hash.
    pub fn update_identity_data(
        &mut self,
        ctx: &CallContext,
        id: IdentityId,
        new_hash: &str,
    ) -> Result<bool, RegistryError> {
        let hash = self
            .config
            .hash_format
            .validate(new_hash)
            .map_err(|e| reject(ctx, "update", RegistryError::InvalidHashFormat(e)))?;

        let record = self
            .store
            .get(id)
            .ok_or_else(|| reject(ctx, "update", RegistryError::NotFound { id }))?;
        AccessController::require_owner(&ctx.caller, record)
            .map_err(|e| reject(ctx, "update", e))?;
        let previous = record.hash.clone();

        let updated = self
            .store
            .set_hash(id, hash)
            .map_err(|e| reject(ctx, "update", e))?;

        self.journal.append(RegistryEvent::HashUpdated {
            id,
            previous,
            current: updated.hash,
            height: ctx.height,
        });
        tracing::info!(identity = %id, height = %ctx.height, "identity hash updated");
        Ok(true)
    }

    /// `verify-identity`: the verifier sets `verified` and the KYC level.
    ///
    /// Re-verification is allowed and overwrites the level, including with
    /// a lower one. The journal keeps the previous level.
    pub fn verify_identity(
        &mut self,
        ctx: &CallContext,
        id: IdentityId,
        level: KycLevel,
    ) -> Result<bool, RegistryError> {
        let record = self
            .store
            .get(id)
            .ok_or_else(|| reject(ctx, "verify", RegistryError::NotFound { id }))?;
        AccessController::require_verifier(&ctx.caller, &self.config.verifier)
            .map_err(|e| reject(ctx, "verify", e))?;
        let was_verified = record.verified;
        let previous_level = record.kyc_level;

        self.store
            .set_verification(id, level)
            .map_err(|e| reject(ctx, "verify", e))?;

        self.journal.append(RegistryEvent::Verified {
            id,
            was_verified,
            previous_level,
            level,
            height: ctx.height,
        });
        if was_verified && level < previous_level {
            tracing::warn!(
                identity = %id,
                previous = %previous_level,
                level = %level,
                "kyc level lowered by re-verification"
            );
        }
        tracing::info!(identity = %id, level = %level, height = %ctx.height, "identity verified");
        Ok(true)
    }
}

/// Log a rejected operation and pass the error through.
fn reject(ctx: &CallContext, operation: &str, err: RegistryError) -> RegistryError {
    tracing::warn!(
        operation,
        caller = %ctx.caller,
        code = err.code(),
        "{err}"
    );
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use idreg_core::{HashFormat, Role};

    const H1: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";
    const H2: &str = "fedcba9876543210fedcba9876543210fedcba9876543210fedcba9876543210";

    fn p(s: &str) -> Principal {
        Principal::new(s).unwrap()
    }

    fn ctx(caller: &str, height: u64) -> CallContext {
        CallContext::new(p(caller), BlockHeight(height))
    }

    struct Fixture {
        store: RecordStore,
        journal: Journal,
        config: RegistryConfig,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                store: RecordStore::new(),
                journal: Journal::new(),
                config: RegistryConfig::new(p("deployer")),
            }
        }

        fn lifecycle(&mut self) -> IdentityLifecycle<'_> {
            IdentityLifecycle::new(&mut self.store, &mut self.journal, &self.config)
        }
    }

    #[test]
    fn test_create_assigns_id_and_timestamp() {
        let mut f = Fixture::new();
        let id = f.lifecycle().create_identity(&ctx("wallet_1", 3), H1).unwrap();
        assert_eq!(id, IdentityId::FIRST);
        let record = f.store.get(id).unwrap();
        assert_eq!(record.owner, p("wallet_1"));
        assert_eq!(record.hash.as_str(), H1);
        assert_eq!(record.timestamp, BlockHeight(3));
        assert!(!record.verified);
        assert_eq!(record.kyc_level, KycLevel::NONE);
        assert_eq!(f.journal.events().len(), 1);
    }

    #[test]
    fn test_create_rejects_malformed_hash() {
        let mut f = Fixture::new();
        let err = f
            .lifecycle()
            .create_identity(&ctx("wallet_1", 1), "not-a-hash")
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_HASH_FORMAT");
        assert!(f.store.is_empty());
        assert!(f.journal.events().is_empty());
    }

    #[test]
    fn test_second_create_is_duplicate_owner() {
        let mut f = Fixture::new();
        f.lifecycle().create_identity(&ctx("wallet_1", 1), H1).unwrap();
        let err = f
            .lifecycle()
            .create_identity(&ctx("wallet_1", 2), H2)
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateOwner {
                owner: p("wallet_1"),
                existing: IdentityId::FIRST,
            }
        );
        assert_eq!(f.store.peek_next_id().get(), 2);
        assert_eq!(f.journal.events().len(), 1);
    }

    #[test]
    fn test_malformed_hash_checked_before_duplicate() {
        let mut f = Fixture::new();
        f.lifecycle().create_identity(&ctx("wallet_1", 1), H1).unwrap();
        let err = f
            .lifecycle()
            .create_identity(&ctx("wallet_1", 2), "xyz")
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_HASH_FORMAT");
    }

    #[test]
    fn test_owner_updates_hash() {
        let mut f = Fixture::new();
        let id = f.lifecycle().create_identity(&ctx("wallet_1", 1), H1).unwrap();
        assert!(f
            .lifecycle()
            .update_identity_data(&ctx("wallet_1", 2), id, H2)
            .unwrap());
        let record = f.store.get(id).unwrap();
        assert_eq!(record.hash.as_str(), H2);
        assert_eq!(record.timestamp, BlockHeight(1));
    }

    #[test]
    fn test_non_owner_update_rejected() {
        let mut f = Fixture::new();
        let id = f.lifecycle().create_identity(&ctx("wallet_1", 1), H1).unwrap();
        let err = f
            .lifecycle()
            .update_identity_data(&ctx("wallet_2", 2), id, H2)
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::NotAuthorized {
                caller: p("wallet_2"),
                required: Role::Owner,
            }
        );
        assert_eq!(f.store.get(id).unwrap().hash.as_str(), H1);
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let mut f = Fixture::new();
        let id = IdentityId::new(4).unwrap();
        let err = f
            .lifecycle()
            .update_identity_data(&ctx("wallet_1", 1), id, H2)
            .unwrap_err();
        assert_eq!(err, RegistryError::NotFound { id });
    }

    #[test]
    fn test_update_with_malformed_hash_rejected() {
        let mut f = Fixture::new();
        let id = f.lifecycle().create_identity(&ctx("wallet_1", 1), H1).unwrap();
        let err = f
            .lifecycle()
            .update_identity_data(&ctx("wallet_1", 2), id, &H2[..10])
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_HASH_FORMAT");
        assert_eq!(f.store.get(id).unwrap().hash.as_str(), H1);
    }

    #[test]
    fn test_verifier_verifies() {
        let mut f = Fixture::new();
        let id = f.lifecycle().create_identity(&ctx("wallet_1", 1), H1).unwrap();
        assert!(f
            .lifecycle()
            .verify_identity(&ctx("deployer", 2), id, KycLevel(2))
            .unwrap());
        let record = f.store.get(id).unwrap();
        assert!(record.verified);
        assert_eq!(record.kyc_level, KycLevel(2));
    }

    #[test]
    fn test_non_verifier_rejected() {
        let mut f = Fixture::new();
        let id = f.lifecycle().create_identity(&ctx("wallet_1", 1), H1).unwrap();
        for caller in ["wallet_1", "wallet_2"] {
            let err = f
                .lifecycle()
                .verify_identity(&ctx(caller, 2), id, KycLevel(2))
                .unwrap_err();
            assert_eq!(
                err,
                RegistryError::NotAuthorized {
                    caller: p(caller),
                    required: Role::Verifier,
                }
            );
        }
        let record = f.store.get(id).unwrap();
        assert!(!record.verified);
        assert_eq!(record.kyc_level, KycLevel::NONE);
    }

    #[test]
    fn test_verify_unknown_id_is_not_found_even_for_non_verifier() {
        let mut f = Fixture::new();
        let id = IdentityId::new(2).unwrap();
        let err = f
            .lifecycle()
            .verify_identity(&ctx("wallet_2", 1), id, KycLevel(1))
            .unwrap_err();
        assert_eq!(err, RegistryError::NotFound { id });
    }

    #[test]
    fn test_reverification_overwrites_level_and_journals_previous() {
        let mut f = Fixture::new();
        let id = f.lifecycle().create_identity(&ctx("wallet_1", 1), H1).unwrap();
        f.lifecycle()
            .verify_identity(&ctx("deployer", 2), id, KycLevel(3))
            .unwrap();
        f.lifecycle()
            .verify_identity(&ctx("deployer", 3), id, KycLevel(1))
            .unwrap();
        assert_eq!(f.store.get(id).unwrap().kyc_level, KycLevel(1));
        match f.journal.events().last().unwrap() {
            RegistryEvent::Verified {
                was_verified,
                previous_level,
                level,
                ..
            } => {
                assert!(*was_verified);
                assert_eq!(*previous_level, KycLevel(3));
                assert_eq!(*level, KycLevel(1));
            }
            other => panic!("expected Verified, got {other:?}"),
        }
    }

    #[test]
    fn test_update_keeps_verification() {
        let mut f = Fixture::new();
        let id = f.lifecycle().create_identity(&ctx("wallet_1", 1), H1).unwrap();
        f.lifecycle()
            .verify_identity(&ctx("deployer", 2), id, KycLevel(2))
            .unwrap();
        f.lifecycle()
            .update_identity_data(&ctx("wallet_1", 3), id, H2)
            .unwrap();
        let record = f.store.get(id).unwrap();
        assert!(record.verified);
        assert_eq!(record.kyc_level, KycLevel(2));
    }

    #[test]
    fn test_ascii_format_config() {
        let mut f = Fixture::new();
        f.config = f
            .config
            .clone()
            .with_hash_format(HashFormat::Ascii { max_length: 64 });
        let id = f
            .lifecycle()
            .create_identity(&ctx("wallet_1", 1), "ipfs://bafy-document")
            .unwrap();
        assert_eq!(f.store.get(id).unwrap().hash.as_str(), "ipfs://bafy-document");
    }
}
