//! # Registry
//!
//! Owns a registry instance's configuration, record store and journal.
//! Mutations go through the `Registry` methods only, which drive
//! [`IdentityLifecycle`] and record the clock height of each success.
//! Reads go through [`QueryService`].

use idreg_core::{
    BlockHeight, IdentityId, KycLevel, Principal, RegistryError, SnapshotError,
};

use crate::config::RegistryConfig;
use crate::journal::{Journal, RegistryEvent};
use crate::lifecycle::{CallContext, IdentityLifecycle};
use crate::query::QueryService;
use crate::record::IdentityData;
use crate::snapshot::{RegistrySnapshot, SNAPSHOT_FORMAT_VERSION};
use crate::store::RecordStore;

/// A single-writer identity registry.
#[derive(Debug, Clone)]
pub struct Registry {
    config: RegistryConfig,
    store: RecordStore,
    journal: Journal,
    last_height: Option<BlockHeight>,
}

impl Registry {
    /// Initialize an empty registry.
    pub fn new(config: RegistryConfig) -> Self {
        tracing::info!(
            verifier = %config.verifier,
            hash_format = %config.hash_format,
            "identity registry initialized"
        );
        Self {
            config,
            store: RecordStore::new(),
            journal: Journal::new(),
            last_height: None,
        }
    }

    /// The configuration fixed at initialization.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The verifier principal.
    pub fn verifier(&self) -> &Principal {
        &self.config.verifier
    }

    /// Highest clock height of any successful mutation so far.
    pub fn last_height(&self) -> Option<BlockHeight> {
        self.last_height
    }

    /// Mutating operations, without clock tracking.
    pub(crate) fn lifecycle(&mut self) -> IdentityLifecycle<'_> {
        IdentityLifecycle::new(&mut self.store, &mut self.journal, &self.config)
    }

    /// Read-only operations.
    pub fn query(&self) -> QueryService<'_> {
        QueryService::new(&self.store, &self.journal)
    }

    /// Direct read access to the store.
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// The whole journal.
    pub fn events(&self) -> &[RegistryEvent] {
        self.journal.events()
    }

    // -- operation surface ----------------------------------------------

    /// `create-identity`.
    pub fn create_identity(
        &mut self,
        ctx: &CallContext,
        hash: &str,
    ) -> Result<IdentityId, RegistryError> {
        let id = self.lifecycle().create_identity(ctx, hash)?;
        self.observe(ctx.height);
        Ok(id)
    }

    /// `update-identity-data`.
    pub fn update_identity_data(
        &mut self,
        ctx: &CallContext,
        id: IdentityId,
        new_hash: &str,
    ) -> Result<bool, RegistryError> {
        let ok = self.lifecycle().update_identity_data(ctx, id, new_hash)?;
        self.observe(ctx.height);
        Ok(ok)
    }

    /// `verify-identity`.
    pub fn verify_identity(
        &mut self,
        ctx: &CallContext,
        id: IdentityId,
        level: KycLevel,
    ) -> Result<bool, RegistryError> {
        let ok = self.lifecycle().verify_identity(ctx, id, level)?;
        self.observe(ctx.height);
        Ok(ok)
    }

    /// `get-identity-data`.
    pub fn get_identity_data(&self, id: IdentityId) -> Option<IdentityData> {
        self.query().get_identity_data(id)
    }

    /// `is-identity-verified`.
    pub fn is_identity_verified(&self, id: IdentityId) -> Result<bool, RegistryError> {
        self.query().is_identity_verified(id)
    }

    /// `get-kyc-level`.
    pub fn get_kyc_level(&self, id: IdentityId) -> Result<KycLevel, RegistryError> {
        self.query().get_kyc_level(id)
    }

    // -- persistence ----------------------------------------------------

    /// Capture the full state.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            config: self.config.clone(),
            next_id: self.store.peek_next_id(),
            last_height: self.last_height,
            records: self.store.iter().cloned().collect(),
            events: self.journal.events().to_vec(),
        }
    }

    /// Rebuild a registry from a snapshot.
    ///
    /// Rejects the snapshot if its version is unknown, its ids are not
    /// exactly `1..=N`, its counter disagrees with its records, two records
    /// share an owner, or a stored hash fails the configured format. The
    /// journal must name only existing identities and hold exactly one
    /// `Created` event per record.
    pub fn restore(snapshot: RegistrySnapshot) -> Result<Self, SnapshotError> {
        if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.format_version,
                expected: SNAPSHOT_FORMAT_VERSION,
            });
        }
        for record in &snapshot.records {
            snapshot
                .config
                .hash_format
                .check(&record.hash)
                .map_err(|source| SnapshotError::InvalidRecordHash {
                    id: record.id,
                    source,
                })?;
        }
        let store = RecordStore::from_records(snapshot.records, snapshot.next_id)?;
        let journal = Journal::from_events(snapshot.events);
        journal.check_against(&store)?;
        tracing::debug!(records = store.len(), "registry restored from snapshot");
        Ok(Self {
            config: snapshot.config,
            store,
            journal,
            last_height: snapshot.last_height,
        })
    }

    fn observe(&mut self, height: BlockHeight) {
        self.last_height = Some(self.last_height.map_or(height, |h| h.max(height)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Identity;
    use idreg_core::HashFormat;

    const H1: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";
    const H2: &str = "fedcba9876543210fedcba9876543210fedcba9876543210fedcba9876543210";

    fn p(s: &str) -> Principal {
        Principal::new(s).unwrap()
    }

    fn ctx(caller: &str, height: u64) -> CallContext {
        CallContext::new(p(caller), BlockHeight(height))
    }

    fn registry() -> Registry {
        Registry::new(RegistryConfig::new(p("deployer")))
    }

    #[test]
    fn test_last_height_tracks_successes_only() {
        let mut reg = registry();
        assert_eq!(reg.last_height(), None);
        reg.create_identity(&ctx("wallet_1", 4), H1).unwrap();
        assert_eq!(reg.last_height(), Some(BlockHeight(4)));
        reg.create_identity(&ctx("wallet_1", 9), H2).unwrap_err();
        assert_eq!(reg.last_height(), Some(BlockHeight(4)));
    }

    #[test]
    fn test_last_height_tracks_every_mutation() {
        let mut reg = registry();
        let id = reg.create_identity(&ctx("wallet_1", 2), H1).unwrap();
        reg.update_identity_data(&ctx("wallet_1", 6), id, H2).unwrap();
        assert_eq!(reg.last_height(), Some(BlockHeight(6)));
        reg.verify_identity(&ctx("deployer", 8), id, KycLevel(1)).unwrap();
        assert_eq!(reg.last_height(), Some(BlockHeight(8)));
        // Heights supplied out of order never move it backwards.
        reg.update_identity_data(&ctx("wallet_1", 7), id, H1).unwrap();
        assert_eq!(reg.last_height(), Some(BlockHeight(8)));
        assert_eq!(Registry::restore(reg.snapshot()).unwrap().last_height(), Some(BlockHeight(8)));
    }

    #[test]
    fn test_snapshot_restore_preserves_state() {
        let mut reg = registry();
        let id = reg.create_identity(&ctx("wallet_1", 1), H1).unwrap();
        reg.create_identity(&ctx("wallet_2", 2), H2).unwrap();
        reg.verify_identity(&ctx("deployer", 3), id, KycLevel(2)).unwrap();

        let json = reg.snapshot().to_json().unwrap();
        let restored = Registry::restore(RegistrySnapshot::from_json(&json).unwrap()).unwrap();

        assert_eq!(restored.snapshot(), reg.snapshot());
        assert_eq!(restored.get_kyc_level(id), Ok(KycLevel(2)));
        assert_eq!(restored.query().identity_of(&p("wallet_2")).map(|i| i.get()), Some(2));
        assert_eq!(restored.last_height(), Some(BlockHeight(3)));
    }

    #[test]
    fn test_restored_registry_keeps_enforcing_uniqueness() {
        let mut reg = registry();
        reg.create_identity(&ctx("wallet_1", 1), H1).unwrap();
        let mut restored = Registry::restore(reg.snapshot()).unwrap();
        let err = restored
            .create_identity(&ctx("wallet_1", 2), H2)
            .unwrap_err();
        assert_eq!(err.code(), "DUPLICATE_OWNER");
        assert_eq!(
            restored.create_identity(&ctx("wallet_2", 2), H2).unwrap().get(),
            2
        );
    }

    #[test]
    fn test_restore_rejects_unknown_version() {
        let mut snapshot = registry().snapshot();
        snapshot.format_version = 99;
        assert!(matches!(
            Registry::restore(snapshot),
            Err(SnapshotError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_restore_rejects_hash_outside_format() {
        let mut reg = registry();
        reg.create_identity(&ctx("wallet_1", 1), H1).unwrap();
        let mut snapshot = reg.snapshot();
        snapshot.config.hash_format = HashFormat::Hex { length: 40 };
        assert!(matches!(
            Registry::restore(snapshot),
            Err(SnapshotError::InvalidRecordHash { .. })
        ));
    }

    #[test]
    fn test_restore_rejects_event_for_missing_identity() {
        let mut reg = registry();
        let id = reg.create_identity(&ctx("wallet_1", 1), H1).unwrap();
        reg.verify_identity(&ctx("deployer", 2), id, KycLevel(1)).unwrap();
        let mut snapshot = reg.snapshot();
        snapshot.events.push(RegistryEvent::Verified {
            id: IdentityId::new(4).unwrap(),
            was_verified: false,
            previous_level: KycLevel::NONE,
            level: KycLevel(2),
            height: BlockHeight(3),
        });
        assert!(matches!(
            Registry::restore(snapshot),
            Err(SnapshotError::OrphanEvent { position: 2, .. })
        ));
    }

    #[test]
    fn test_restore_requires_one_creation_event_per_record() {
        let mut reg = registry();
        reg.create_identity(&ctx("wallet_1", 1), H1).unwrap();
        reg.create_identity(&ctx("wallet_2", 2), H2).unwrap();

        let mut missing = reg.snapshot();
        missing.events.remove(1);
        assert!(matches!(
            Registry::restore(missing),
            Err(SnapshotError::CreationEventCount { found: 0, .. })
        ));

        let mut doubled = reg.snapshot();
        let first = doubled.events[0].clone();
        doubled.events.push(first);
        assert!(matches!(
            Registry::restore(doubled),
            Err(SnapshotError::CreationEventCount { found: 2, .. })
        ));
    }

    #[test]
    fn test_restore_rejects_forged_counter() {
        let mut reg = registry();
        reg.create_identity(&ctx("wallet_1", 1), H1).unwrap();
        let mut snapshot = reg.snapshot();
        snapshot.records.push(Identity {
            id: IdentityId::new(3).unwrap(),
            ..snapshot.records[0].clone()
        });
        assert!(Registry::restore(snapshot).is_err());
    }
}
