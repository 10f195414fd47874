//! # Query Service
//!
//! Side-effect-free reads. No authorization gate: any caller may read any
//! record.
//!
//! `get_identity_data` returns `Option`, because absence is a normal answer
//! to "does this identity exist?". The two scalar getters return `Result`
//! and fail with [`RegistryError::NotFound`], because a flag or level of a
//! record that does not exist has no meaningful value.

use idreg_core::{IdentityId, KycLevel, Principal, RegistryError};

use crate::journal::{Journal, RegistryEvent};
use crate::record::{IdentityData, IdentityStatus};
use crate::store::RecordStore;

/// Read projections over a registry.
///
/// Obtained from [`Registry::query()`](crate::Registry::query).
#[derive(Debug, Clone, Copy)]
pub struct QueryService<'a> {
    store: &'a RecordStore,
    journal: &'a Journal,
}

impl<'a> QueryService<'a> {
    pub(crate) fn new(store: &'a RecordStore, journal: &'a Journal) -> Self {
        Self { store, journal }
    }

    /// `get-identity-data`: the full record, or `None`.
    pub fn get_identity_data(&self, id: IdentityId) -> Option<IdentityData> {
        let data = self.store.get(id).map(|r| r.data());
        tracing::debug!(identity = %id, found = data.is_some(), "get-identity-data");
        data
    }

    /// `is-identity-verified`.
    pub fn is_identity_verified(&self, id: IdentityId) -> Result<bool, RegistryError> {
        self.store
            .get(id)
            .map(|r| r.verified)
            .ok_or(RegistryError::NotFound { id })
    }

    /// `get-kyc-level`.
    pub fn get_kyc_level(&self, id: IdentityId) -> Result<KycLevel, RegistryError> {
        self.store
            .get(id)
            .map(|r| r.kyc_level)
            .ok_or(RegistryError::NotFound { id })
    }

    /// Lifecycle state of a record.
    pub fn status(&self, id: IdentityId) -> Result<IdentityStatus, RegistryError> {
        self.store
            .get(id)
            .map(|r| r.status())
            .ok_or(RegistryError::NotFound { id })
    }

    /// The identity owned by `owner`, if any.
    pub fn identity_of(&self, owner: &Principal) -> Option<IdentityId> {
        self.store.identity_of(owner)
    }

    /// Journal entries for one identity, oldest first. Empty for unknown ids.
    pub fn history(&self, id: IdentityId) -> Vec<RegistryEvent> {
        self.journal.history(id)
    }

    /// Number of identities ever created.
    pub fn count(&self) -> usize {
        self.store.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryConfig;
    use crate::lifecycle::{CallContext, IdentityLifecycle};
    use idreg_core::BlockHeight;

    const H1: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn p(s: &str) -> Principal {
        Principal::new(s).unwrap()
    }

    #[test]
    fn reads_on_missing_id() {
        let store = RecordStore::new();
        let journal = Journal::new();
        let q = QueryService::new(&store, &journal);
        let id = IdentityId::FIRST;
        assert_eq!(q.get_identity_data(id), None);
        assert_eq!(q.is_identity_verified(id), Err(RegistryError::NotFound { id }));
        assert_eq!(q.get_kyc_level(id), Err(RegistryError::NotFound { id }));
        assert_eq!(q.status(id), Err(RegistryError::NotFound { id }));
        assert!(q.history(id).is_empty());
        assert_eq!(q.count(), 0);
    }

    #[test]
    fn reads_on_existing_id() {
        let mut store = RecordStore::new();
        let mut journal = Journal::new();
        let config = RegistryConfig::new(p("deployer"));
        let id = IdentityLifecycle::new(&mut store, &mut journal, &config)
            .create_identity(&CallContext::new(p("wallet_1"), BlockHeight(5)), H1)
            .unwrap();

        let q = QueryService::new(&store, &journal);
        let data = q.get_identity_data(id).unwrap();
        assert_eq!(data.owner, p("wallet_1"));
        assert_eq!(data.timestamp, BlockHeight(5));
        assert_eq!(q.is_identity_verified(id), Ok(false));
        assert_eq!(q.get_kyc_level(id), Ok(KycLevel::NONE));
        assert_eq!(q.status(id), Ok(IdentityStatus::Unverified));
        assert_eq!(q.identity_of(&p("wallet_1")), Some(id));
        assert_eq!(q.identity_of(&p("wallet_2")), None);
        assert_eq!(q.history(id).len(), 1);
    }
}
