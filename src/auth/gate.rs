/// Card authentication: normalize, hash, check membership.
use log::{info, warn};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use time::OffsetDateTime;

use crate::models::{AuthRecord, AuthResult, LogRecord};
use crate::storage::PersistenceLog;

/// Outcome exposed to the caller. Rejection sub-cases are recorded in
/// the audit log only, so an almost-valid card looks no different from
/// garbage input at the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Accepted,
    Rejected,
}

/// Immutable set of authorized credential hashes, built from
/// configuration at startup. Pure lookup; no runtime mutation.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    hashes: HashSet<String>,
}

impl CredentialStore {
    pub fn new(hashes: HashSet<String>) -> Self {
        CredentialStore { hashes }
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.hashes.contains(hash)
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }
}

/// Validates presented credentials against the store and emits an audit
/// record per attempt. The raw card ID is discarded after hashing.
pub struct AuthGate {
    store: CredentialStore,
}

impl AuthGate {
    pub fn new(store: CredentialStore) -> Self {
        AuthGate { store }
    }

    /// Check one presented credential. Malformed and unknown cards both
    /// come back `Rejected`; only the audit log tells them apart.
    pub async fn authenticate(&self, raw: &str, log: &mut PersistenceLog) -> AuthOutcome {
        let normalized = normalize_credential(raw);
        let hash = hash_credential(&normalized);

        let result = if normalized.is_empty() || !normalized.chars().all(|c| c.is_ascii_hexdigit())
        {
            warn!("Malformed credential presented");
            AuthResult::RejectedMalformed
        } else if self.store.contains(&hash) {
            info!("Card authentication successful: {}...", &hash[..8]);
            AuthResult::Accepted
        } else {
            warn!("Card authentication failed: {}...", &hash[..8]);
            AuthResult::RejectedUnknown
        };

        let record = LogRecord::Auth(AuthRecord {
            credential_hash: hash,
            outcome: result,
            timestamp: OffsetDateTime::now_utc(),
        });
        if let Err(e) = log.append(&record).await {
            warn!("Could not persist auth event: {}", e);
        }

        match result {
            AuthResult::Accepted => AuthOutcome::Accepted,
            _ => AuthOutcome::Rejected,
        }
    }
}

/// Canonical form a card ID is hashed in: trimmed, uppercase hex.
fn normalize_credential(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// SHA-256 of a normalized credential, lowercase hex. This is the only
/// form ever stored or compared.
pub fn hash_credential(normalized: &str) -> String {
    let digest = Sha256::digest(normalized.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
