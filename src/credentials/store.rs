//! In-memory credential store backend.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use tracing::debug;

use super::{Credential, CredentialRecord, CredentialStore, SaveError};

/// DashMap-backed store keyed by identity. Single-key operations are
/// atomic, which is all the concurrency the one-record-per-identity rule
/// needs in-process.
#[derive(Clone)]
pub struct MemoryCredentialStore {
    records: Arc<DashMap<String, CredentialRecord>>,
    ttl: Duration,
}

impl MemoryCredentialStore {
    /// Create a store whose records expire `ttl` after their last write.
    pub fn new(ttl: Duration) -> Self {
        Self {
            records: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Number of records currently held, live or not yet swept.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Lazy expiry: drops the identity's record when it has aged out.
    /// Returns whether an eviction happened.
    fn evict_if_expired(&self, identity: &str) -> bool {
        let now = Utc::now();
        let removed = self
            .records
            .remove_if(identity, |_, record| record.is_expired_at(now, self.ttl));
        if removed.is_some() {
            debug!(identity = %identity, "Evicted expired credential record");
            true
        } else {
            false
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn begin_authorization(&self, identity: &str, client_id: &str) {
        self.records.insert(
            identity.to_string(),
            CredentialRecord {
                client_id: client_id.to_string(),
                access_token: None,
                issued_at: Utc::now(),
            },
        );
    }

    async fn save_credential(&self, identity: &str, access_token: &str) -> Result<(), SaveError> {
        self.evict_if_expired(identity);
        match self.records.get_mut(identity) {
            Some(mut record) => {
                record.access_token = Some(access_token.to_string());
                record.issued_at = Utc::now();
                Ok(())
            }
            None => Err(SaveError::NotInitiated),
        }
    }

    async fn resolve_credential(&self, identity: &str) -> Option<Credential> {
        if self.evict_if_expired(identity) {
            return None;
        }
        let record = self.records.get(identity)?;
        let access_token = record.access_token.clone()?;
        Some(Credential { access_token })
    }

    async fn end_session(&self, identity: &str) -> bool {
        if self.evict_if_expired(identity) {
            return false;
        }
        self.records.remove(identity).is_some()
    }

    async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.records.len();
        self.records
            .retain(|_, record| !record.is_expired_at(now, self.ttl));
        before.saturating_sub(self.records.len())
    }
}
