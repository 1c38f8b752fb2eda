//! Credential storage for the upload flow.
//!
//! Maps a caller-supplied identity (an email address) to the OAuth bearer
//! token granted through the consent flow. Records live for a bounded TTL
//! measured from their last write; expiry is enforced on read, with a
//! background sweep to bound memory for identities that never return.
//!
//! A record moves through two states: transitional (authorization begun,
//! no token yet) and active (token saved). Only an active, unexpired
//! record can authorize an upload.
//!
//! # Usage
//!
//! ```
//! use ferry::credentials::{CredentialStore, MemoryCredentialStore};
//! use chrono::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = MemoryCredentialStore::new(Duration::minutes(45));
//!
//! store.begin_authorization("user@example.com", "client-1").await;
//! store.save_credential("user@example.com", "ya29.token").await.unwrap();
//!
//! let credential = store.resolve_credential("user@example.com").await;
//! assert!(credential.is_some());
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

mod store;

pub use store::MemoryCredentialStore;

/// One identity's entry in the store.
#[derive(Clone, Debug)]
pub struct CredentialRecord {
    /// OAuth client id the authorization flow was started under
    pub client_id: String,
    /// Bearer token granted by the provider; `None` until the caller
    /// completes the consent flow and submits the token
    pub access_token: Option<String>,
    /// Last write to this record; expiry is measured from here
    pub issued_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// Whether this record has outlived `ttl` as of `now`. Exactly `ttl`
    /// elapsed is still valid.
    pub fn is_expired_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.issued_at > ttl
    }
}

/// A resolved, usable credential handed to the upload path.
#[derive(Clone, Debug)]
pub struct Credential {
    pub access_token: String,
}

/// Why a token submission was rejected.
#[derive(Debug, PartialEq)]
pub enum SaveError {
    /// No authorization was begun for the identity, or it has expired
    NotInitiated,
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::NotInitiated => {
                write!(f, "no authorization initiated for this identity")
            }
        }
    }
}

impl std::error::Error for SaveError {}

/// Lifecycle operations over credential records.
///
/// Implementations own the records exclusively; everything else reads
/// through `resolve_credential`, the only path that may observe a token.
/// Kept behind a trait so an external key-value backend can replace the
/// in-memory map without touching the handlers or the orchestrator.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Create or replace the record for `identity` as a fresh transitional
    /// record under `client_id`. Any previously saved token is discarded.
    async fn begin_authorization(&self, identity: &str, client_id: &str);

    /// Attach a bearer token to the identity's record and restart its
    /// lifetime. Fails when no unexpired record exists.
    async fn save_credential(&self, identity: &str, access_token: &str) -> Result<(), SaveError>;

    /// Look up a usable credential. Returns `None` for unknown identities,
    /// transitional records, and expired records; expired records are
    /// evicted on the way out.
    async fn resolve_credential(&self, identity: &str) -> Option<Credential>;

    /// Drop the identity's record. Returns whether a live record was
    /// cleared; an expired leftover is evicted but reported as absent.
    async fn end_session(&self, identity: &str) -> bool;

    /// Drop every expired record and return how many were removed.
    async fn purge_expired(&self) -> usize;
}

/// Periodically sweeps expired records out of the store. Correctness never
/// depends on this; expiry is already enforced on every read.
pub async fn run_session_sweep(store: Arc<dyn CredentialStore>, interval_seconds: u64) {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_seconds));
    loop {
        interval.tick().await;
        let removed = store.purge_expired().await;
        if removed > 0 {
            debug!(removed = removed, "Swept expired credential records");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_boundary() {
        let ttl = Duration::minutes(45);
        let issued_at = Utc::now();
        let record = CredentialRecord {
            client_id: "c1".to_string(),
            access_token: Some("tok".to_string()),
            issued_at,
        };

        // Exactly TTL elapsed is still valid; one second past is not
        assert!(!record.is_expired_at(issued_at + ttl, ttl));
        assert!(record.is_expired_at(issued_at + ttl + Duration::seconds(1), ttl));
    }

    #[test]
    fn test_save_error_display() {
        assert_eq!(
            SaveError::NotInitiated.to_string(),
            "no authorization initiated for this identity"
        );
    }
}
