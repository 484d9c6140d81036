//! Revocation-aware credential confirmation.
//!
//! This is the stronger, network-checked validity path: it re-confirms a
//! locally valid credential against the payment provider's live ledger. It is
//! deliberately decoupled from the per-request gate — querying the provider
//! on every request is too slow for the hot path — and exists for out-of-band
//! re-verification: status polling, refund detection, revocation pickup.
//!
//! Every branch fails closed. A credential that cannot be fully verified —
//! locally invalid, missing or unrecognizable session id, ledger error — is
//! simply not confirmed; nothing here returns an error to the caller.

use serde::Serialize;

use crate::clock::Clock;
use crate::credential::signer::TagSigner;
use crate::credential::verify_token;
use crate::provider::models::is_provider_session_id;
use crate::provider::PaymentLedger;

/// Result of a confirmation check.
///
/// Serializes to the status endpoint's JSON body
/// (`{"confirmed": bool, "expiresAt": number|null}`); serve it with caching
/// disabled so a stale confirmation is never replayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    /// Whether the credential is currently confirmed against the ledger.
    pub confirmed: bool,
    /// Credential expiry (epoch milliseconds) when confirmed.
    pub expires_at: Option<i64>,
}

impl Confirmation {
    fn denied() -> Self {
        Self {
            confirmed: false,
            expires_at: None,
        }
    }
}

/// Confirm a raw credential token against the provider ledger.
///
/// Order matters: local validity is established first so that no remote call
/// is made for credentials that are already invalid (bad signature, expired,
/// not paid).
pub fn confirm_token(
    token: &str,
    signer: &TagSigner,
    clock: &dyn Clock,
    ledger: &dyn PaymentLedger,
) -> Confirmation {
    let Some(credential) = verify_token(token, signer, clock) else {
        return Confirmation::denied();
    };

    // No session id means the credential can never be remotely re-confirmed
    let Some(session_id) = credential.session_id.as_deref() else {
        tracing::debug!("credential has no session id; cannot confirm");
        return Confirmation::denied();
    };
    if !is_provider_session_id(session_id) {
        tracing::debug!("credential session id is not a provider session id");
        return Confirmation::denied();
    }

    let record = match ledger.fetch_session(session_id) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(error = %e, "ledger lookup failed; treating as not confirmed");
            return Confirmation::denied();
        }
    };

    if !record.is_settled() {
        tracing::debug!(
            paid = record.paid,
            total_refunded = record.total_refunded,
            revoked = record.revoked,
            "session not settled"
        );
        return Confirmation::denied();
    }

    Confirmation {
        confirmed: true,
        expires_at: Some(credential.expires_at),
    }
}
