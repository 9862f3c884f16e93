//! In-memory ownership and access lists.
//!
//! Every operation takes the table lock for its whole duration. Callers only
//! ever see a boolean; the specific [`AccessError`] cause is logged at debug.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::debug;

/// Why an access-control operation did not go through.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("owner '{owner}' has no registered data")]
    OwnerNotFound { owner: String },

    #[error("data '{data_hash}' is not registered to owner '{owner}'")]
    NotRegistered { owner: String, data_hash: String },

    #[error("recipient '{recipient}' does not hold access to '{data_hash}'")]
    RecipientNotGranted { recipient: String, data_hash: String },

    #[error("requester '{requester}' has not been granted access to '{data_hash}'")]
    AccessNotGranted { requester: String, data_hash: String },
}

#[derive(Debug, Default)]
struct Tables {
    /// owner -> registered data hashes, in registration order, duplicates kept
    owner_data: HashMap<String, Vec<String>>,
    /// data hash -> granted recipients, in grant order, duplicates kept
    access_list: HashMap<String, Vec<String>>,
}

impl Tables {
    fn check_owns(&self, owner: &str, data_hash: &str) -> Result<(), AccessError> {
        let items = self
            .owner_data
            .get(owner)
            .ok_or_else(|| AccessError::OwnerNotFound {
                owner: owner.to_string(),
            })?;
        if !items.iter().any(|h| h == data_hash) {
            return Err(AccessError::NotRegistered {
                owner: owner.to_string(),
                data_hash: data_hash.to_string(),
            });
        }
        Ok(())
    }
}

/// Data ownership and per-item recipient lists, shared across connections.
#[derive(Debug, Default)]
pub struct AccessControlTable {
    inner: Mutex<Tables>,
}

impl AccessControlTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `data_hash` as owned by `owner`. Always succeeds.
    pub fn register_data(&self, owner: &str, data_hash: &str, _metadata: &str) -> bool {
        let mut t = self.lock();
        t.owner_data
            .entry(owner.to_string())
            .or_default()
            .push(data_hash.to_string());
        true
    }

    /// Give `recipient` access to one of `owner`'s registered items.
    pub fn grant_access(&self, owner: &str, data_hash: &str, recipient: &str) -> bool {
        report(self.try_grant(owner, data_hash, recipient))
    }

    /// Remove the first grant of `data_hash` to `recipient`.
    pub fn revoke_access(&self, owner: &str, data_hash: &str, recipient: &str) -> bool {
        report(self.try_revoke(owner, data_hash, recipient))
    }

    /// True iff `requester` currently appears in the access list of `data_hash`.
    pub fn request_access(&self, requester: &str, data_hash: &str) -> bool {
        report(self.try_request(requester, data_hash))
    }

    /// Data hashes registered by `owner`, in registration order.
    pub fn owned_by(&self, owner: &str) -> Vec<String> {
        self.lock().owner_data.get(owner).cloned().unwrap_or_default()
    }

    /// Recipients currently granted access to `data_hash`, in grant order.
    pub fn recipients_of(&self, data_hash: &str) -> Vec<String> {
        self.lock()
            .access_list
            .get(data_hash)
            .cloned()
            .unwrap_or_default()
    }

    fn try_grant(&self, owner: &str, data_hash: &str, recipient: &str) -> Result<(), AccessError> {
        let mut t = self.lock();
        t.check_owns(owner, data_hash)?;
        t.access_list
            .entry(data_hash.to_string())
            .or_default()
            .push(recipient.to_string());
        Ok(())
    }

    fn try_revoke(&self, owner: &str, data_hash: &str, recipient: &str) -> Result<(), AccessError> {
        let mut t = self.lock();
        t.check_owns(owner, data_hash)?;
        let not_granted = || AccessError::RecipientNotGranted {
            recipient: recipient.to_string(),
            data_hash: data_hash.to_string(),
        };
        let granted = t.access_list.get_mut(data_hash).ok_or_else(not_granted)?;
        let pos = granted
            .iter()
            .position(|r| r == recipient)
            .ok_or_else(not_granted)?;
        granted.remove(pos);
        Ok(())
    }

    fn try_request(&self, requester: &str, data_hash: &str) -> Result<(), AccessError> {
        let t = self.lock();
        let granted = t
            .access_list
            .get(data_hash)
            .is_some_and(|list| list.iter().any(|r| r == requester));
        if !granted {
            return Err(AccessError::AccessNotGranted {
                requester: requester.to_string(),
                data_hash: data_hash.to_string(),
            });
        }
        Ok(())
    }
}

fn report(result: Result<(), AccessError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            debug!(cause = %e, "access-control operation refused");
            false
        }
    }
}
