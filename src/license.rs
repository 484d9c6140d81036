//! Organizational access codes backed by the external license store.
//!
//! Codes are checked against the store by one-way hash: the raw code is
//! normalized, hashed, and immediately discarded — it is never stored or
//! logged. The store itself is an external collaborator; provisioning and
//! revocation of records happen elsewhere and this module only reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::clock::Clock;
use crate::PaygateError;

/// Lifecycle status of a license record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    /// License is live.
    Active,
    /// Administratively revoked.
    Revoked,
    /// Marked expired by the provisioning flow.
    Expired,
}

/// A license record as held in the external store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchoolLicenseRecord {
    /// One-way hash of the normalized access code.
    pub code_hash: String,
    /// Current status.
    pub status: LicenseStatus,
    /// Absolute expiry of the license.
    pub expires_at: DateTime<Utc>,
}

/// Read access to the external license store.
pub trait LicenseStore: Send + Sync {
    /// Look up a record by code hash. `Ok(None)` means no such code.
    fn lookup(&self, code_hash: &str) -> Result<Option<SchoolLicenseRecord>, PaygateError>;
}

/// Normalize an access code before hashing: trim, uppercase, and drop
/// internal whitespace so transcription variants hash identically.
pub fn normalize_access_code(code: &str) -> String {
    code.trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Compute the SHA-256 hash of a normalized access code, hex-encoded.
pub fn hash_access_code(code: &str) -> String {
    let normalized = normalize_access_code(code);
    hex::encode(Sha256::digest(normalized.as_bytes()))
}

/// Check an access code against the store.
///
/// Valid iff a record exists for the hashed code, its status is active, and
/// its expiry is in the future. A store error, unknown code, or empty input
/// is invalid — fail closed, logged server-side only.
pub fn verify_access_code(store: &dyn LicenseStore, clock: &dyn Clock, code: &str) -> bool {
    let normalized = normalize_access_code(code);
    if normalized.is_empty() {
        return false;
    }

    let code_hash = hash_access_code(&normalized);
    let record = match store.lookup(&code_hash) {
        Ok(Some(record)) => record,
        Ok(None) => return false,
        Err(e) => {
            tracing::warn!(error = %e, "license store lookup failed; treating code as invalid");
            return false;
        }
    };

    record.status == LicenseStatus::Active && clock.now_utc() < record.expires_at
}
