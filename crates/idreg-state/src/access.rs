//! # Access Control
//!
//! Pure predicates deciding whether a caller may mutate a record. No state:
//! the verifier principal is passed in from the registry configuration.

use idreg_core::{Principal, RegistryError, Role};

use crate::record::Identity;

/// Owner and verifier checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessController;

impl AccessController {
    /// True iff `caller` owns `record`.
    pub fn is_owner(caller: &Principal, record: &Identity) -> bool {
        *caller == record.owner
    }

    /// True iff `caller` is the registry's verifier.
    pub fn is_verifier(caller: &Principal, verifier: &Principal) -> bool {
        caller == verifier
    }

    /// Require that `caller` owns `record`.
    pub fn require_owner(caller: &Principal, record: &Identity) -> Result<(), RegistryError> {
        if Self::is_owner(caller, record) {
            Ok(())
        } else {
            Err(RegistryError::NotAuthorized {
                caller: caller.clone(),
                required: Role::Owner,
            })
        }
    }

    /// Require that `caller` is the verifier.
    pub fn require_verifier(
        caller: &Principal,
        verifier: &Principal,
    ) -> Result<(), RegistryError> {
        if Self::is_verifier(caller, verifier) {
            Ok(())
        } else {
            Err(RegistryError::NotAuthorized {
                caller: caller.clone(),
                required: Role::Verifier,
            })
        }
    }
}
