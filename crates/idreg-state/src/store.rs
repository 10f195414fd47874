//! # Record Store
//!
//! The authoritative map from identity id to record, plus the secondary
//! ownership index from principal to id.
//!
//! ## Invariants
//!
//! - Ids are `1..next_id`, with no gaps: `next_id == records.len() + 1`
//!   whenever no reservation is outstanding.
//! - Every record's owner appears in the ownership index pointing at that
//!   record, and the index holds nothing else.
//!
//! The store never decides authorization. Its mutators are crate-private so
//! the only way to change state is through
//! [`IdentityLifecycle`](crate::IdentityLifecycle), and the two maps are
//! only ever written together by [`RecordStore::insert()`].

use std::collections::BTreeMap;

use idreg_core::{
    BlockHeight, DocumentHash, IdentityId, KycLevel, Principal, RegistryError, SnapshotError,
};

use crate::record::Identity;

/// Identity records and the ownership index.
#[derive(Debug, Clone)]
pub struct RecordStore {
    records: BTreeMap<IdentityId, Identity>,
    owners: BTreeMap<Principal, IdentityId>,
    next_id: IdentityId,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
            owners: BTreeMap::new(),
            next_id: IdentityId::FIRST,
        }
    }

    /// Rebuild a store from persisted records, re-checking every invariant.
    pub(crate) fn from_records(
        records: Vec<Identity>,
        next_id: IdentityId,
    ) -> Result<Self, SnapshotError> {
        let mut store = Self::new();
        for (position, record) in records.into_iter().enumerate() {
            let expected = store.next_id;
            if record.id != expected {
                return Err(SnapshotError::NonSequentialId {
                    position,
                    found: record.id,
                    expected,
                });
            }
            if let Some(first) = store.owners.get(&record.owner) {
                return Err(SnapshotError::OwnerIndexMismatch {
                    owner: record.owner.clone(),
                    first: *first,
                    second: record.id,
                });
            }
            store.owners.insert(record.owner.clone(), record.id);
            store.records.insert(record.id, record);
            store.next_id = expected.next();
        }
        if store.next_id != next_id {
            return Err(SnapshotError::CounterMismatch {
                found: next_id,
                expected: store.next_id,
                records: store.records.len(),
            });
        }
        Ok(store)
    }

    /// Reserve and return the next unused sequential id.
    ///
    /// The reservation must be followed by [`insert()`](Self::insert) with
    /// the same id, or undone with [`release()`](Self::release).
    pub(crate) fn next_id(&mut self) -> IdentityId {
        let id = self.next_id;
        self.next_id = id.next();
        id
    }

    /// Undo the most recent reservation if it was never filled.
    pub(crate) fn release(&mut self, id: IdentityId) {
        if id.next() == self.next_id && !self.records.contains_key(&id) {
            self.next_id = id;
        }
    }

    /// The id the next creation will receive.
    pub fn peek_next_id(&self) -> IdentityId {
        self.next_id
    }

    /// Insert a fresh record under a reserved id, updating both maps.
    ///
    /// Fails with [`RegistryError::DuplicateOwner`] if `owner` is already in
    /// the ownership index; in that case neither map is touched.
    pub(crate) fn insert(
        &mut self,
        id: IdentityId,
        owner: Principal,
        hash: DocumentHash,
        timestamp: BlockHeight,
    ) -> Result<Identity, RegistryError> {
        if let Some(existing) = self.owners.get(&owner) {
            return Err(RegistryError::DuplicateOwner {
                owner,
                existing: *existing,
            });
        }
        let record = Identity {
            id,
            owner: owner.clone(),
            hash,
            verified: false,
            kyc_level: KycLevel::NONE,
            timestamp,
        };
        self.owners.insert(owner, id);
        self.records.insert(id, record.clone());
        Ok(record)
    }

    /// Look up a record. Absence is not an error.
    pub fn get(&self, id: IdentityId) -> Option<&Identity> {
        self.records.get(&id)
    }

    /// Replace a record's hash, leaving every other field untouched.
    pub(crate) fn set_hash(
        &mut self,
        id: IdentityId,
        hash: DocumentHash,
    ) -> Result<Identity, RegistryError> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or(RegistryError::NotFound { id })?;
        record.hash = hash;
        Ok(record.clone())
    }

    /// Mark a record verified at the given level.
    pub(crate) fn set_verification(
        &mut self,
        id: IdentityId,
        level: KycLevel,
    ) -> Result<Identity, RegistryError> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or(RegistryError::NotFound { id })?;
        record.verified = true;
        record.kyc_level = level;
        Ok(record.clone())
    }

    /// The owner of a record, if it exists.
    pub fn owner_of(&self, id: IdentityId) -> Option<&Principal> {
        self.records.get(&id).map(|r| &r.owner)
    }

    /// The identity owned by a principal, if any.
    pub fn identity_of(&self, owner: &Principal) -> Option<IdentityId> {
        self.owners.get(owner).copied()
    }

    /// Number of records ever created.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record has been created yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Identity> {
        self.records.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idreg_core::HashFormat;

    fn principal(s: &str) -> Principal {
        Principal::new(s).unwrap()
    }

    fn hash(c: char) -> DocumentHash {
        HashFormat::default()
            .validate(&c.to_string().repeat(64))
            .unwrap()
    }

    fn create(store: &mut RecordStore, owner: &str) -> Result<Identity, RegistryError> {
        let id = store.next_id();
        let result = store.insert(id, principal(owner), hash('a'), BlockHeight(1));
        if result.is_err() {
            store.release(id);
        }
        result
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = RecordStore::new();
        assert!(store.is_empty());
        assert_eq!(store.peek_next_id(), IdentityId::FIRST);
        assert!(store.get(IdentityId::FIRST).is_none());
    }

    #[test]
    fn test_insert_populates_both_maps() {
        let mut store = RecordStore::new();
        let record = create(&mut store, "alice").unwrap();
        assert_eq!(record.id, IdentityId::FIRST);
        assert!(!record.verified);
        assert_eq!(record.kyc_level, KycLevel::NONE);
        assert_eq!(store.get(record.id), Some(&record));
        assert_eq!(store.identity_of(&principal("alice")), Some(record.id));
        assert_eq!(store.owner_of(record.id), Some(&principal("alice")));
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut store = RecordStore::new();
        let ids: Vec<u64> = ["a", "b", "c"]
            .iter()
            .map(|o| create(&mut store, o).unwrap().id.get())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(store.peek_next_id().get(), 4);
    }

    #[test]
    fn test_duplicate_owner_rejected_without_burning_id() {
        let mut store = RecordStore::new();
        create(&mut store, "alice").unwrap();
        let err = create(&mut store, "alice").unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateOwner {
                owner: principal("alice"),
                existing: IdentityId::FIRST,
            }
        );
        assert_eq!(store.len(), 1);
        assert_eq!(store.peek_next_id().get(), 2);
        assert_eq!(create(&mut store, "bob").unwrap().id.get(), 2);
    }

    #[test]
    fn test_set_hash_touches_only_hash() {
        let mut store = RecordStore::new();
        let before = create(&mut store, "alice").unwrap();
        let after = store.set_hash(before.id, hash('b')).unwrap();
        assert_eq!(after.hash, hash('b'));
        assert_eq!(after.owner, before.owner);
        assert_eq!(after.timestamp, before.timestamp);
        assert_eq!(after.verified, before.verified);
        assert_eq!(after.kyc_level, before.kyc_level);
    }

    #[test]
    fn test_set_verification_overwrites_level() {
        let mut store = RecordStore::new();
        let id = create(&mut store, "alice").unwrap().id;
        let first = store.set_verification(id, KycLevel(3)).unwrap();
        assert!(first.verified);
        assert_eq!(first.kyc_level, KycLevel(3));
        let second = store.set_verification(id, KycLevel(1)).unwrap();
        assert!(second.verified);
        assert_eq!(second.kyc_level, KycLevel(1));
    }

    #[test]
    fn test_mutating_unknown_id_is_not_found() {
        let mut store = RecordStore::new();
        let id = IdentityId::new(9).unwrap();
        assert_eq!(
            store.set_hash(id, hash('a')).unwrap_err(),
            RegistryError::NotFound { id }
        );
        assert_eq!(
            store.set_verification(id, KycLevel(1)).unwrap_err(),
            RegistryError::NotFound { id }
        );
    }

    #[test]
    fn test_release_only_undoes_unfilled_tail() {
        let mut store = RecordStore::new();
        let id = create(&mut store, "alice").unwrap().id;
        store.release(id);
        assert_eq!(store.peek_next_id().get(), 2);
    }

    #[test]
    fn test_from_records_rejects_gaps() {
        let mut store = RecordStore::new();
        create(&mut store, "alice").unwrap();
        create(&mut store, "bob").unwrap();
        let mut records: Vec<Identity> = store.iter().cloned().collect();
        records.remove(0);
        let err = RecordStore::from_records(records, IdentityId::new(3).unwrap()).unwrap_err();
        assert!(matches!(err, SnapshotError::NonSequentialId { position: 0, .. }));
    }

    #[test]
    fn test_from_records_rejects_shared_owner() {
        let mut store = RecordStore::new();
        create(&mut store, "alice").unwrap();
        create(&mut store, "bob").unwrap();
        let mut records: Vec<Identity> = store.iter().cloned().collect();
        records[1].owner = principal("alice");
        let err = RecordStore::from_records(records, IdentityId::new(3).unwrap()).unwrap_err();
        assert!(matches!(err, SnapshotError::OwnerIndexMismatch { .. }));
    }

    #[test]
    fn test_from_records_rejects_counter_mismatch() {
        let mut store = RecordStore::new();
        create(&mut store, "alice").unwrap();
        let records: Vec<Identity> = store.iter().cloned().collect();
        let err = RecordStore::from_records(records, IdentityId::new(5).unwrap()).unwrap_err();
        assert!(matches!(err, SnapshotError::CounterMismatch { records: 1, .. }));
    }
}
