//! Signed access credentials: payload model, codec, signer, and the
//! local-validity pipeline.
//!
//! A credential is *locally valid* iff the tag verifies over the exact
//! encoded payload bytes, `paid` is true, and it has not expired. Local
//! validity is what the request gate checks on the hot path; the stronger
//! ledger-backed check lives in [`crate::validator`].

pub mod codec;
pub mod signer;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::credential::signer::TagSigner;
use crate::PaygateError;

/// The signed credential payload.
///
/// `paid` is true in every minted credential — a "not paid" credential is
/// never issued; absence of a credential is the negative case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessCredential {
    /// Whether the underlying purchase completed. Always true when minted.
    pub paid: bool,

    /// Absolute expiry as epoch milliseconds; void past this instant
    /// regardless of signature validity.
    pub expires_at: i64,

    /// Payment-provider session that authorized this credential. Required
    /// for remote revocation/refund checks; without it the credential can
    /// only ever be locally validated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl AccessCredential {
    /// Build a paid credential expiring at the given instant.
    pub fn paid_until(expires_at_ms: i64, session_id: Option<String>) -> Self {
        Self {
            paid: true,
            expires_at: expires_at_ms,
            session_id,
        }
    }

    /// Whether the credential has expired at the clock's current instant.
    pub fn is_expired(&self, clock: &dyn Clock) -> bool {
        clock.now_ms() >= self.expires_at
    }

    /// Payload-level validity: paid and unexpired. Signature validity is
    /// established separately by [`parse_token`].
    pub fn is_live(&self, clock: &dyn Clock) -> bool {
        self.paid && !self.is_expired(clock)
    }
}

/// Encode and sign a credential into a transportable token.
pub fn issue_token(
    credential: &AccessCredential,
    signer: &TagSigner,
) -> Result<String, PaygateError> {
    let encoded = codec::encode_payload(credential)?;
    let tag = signer.sign(&encoded);
    Ok(codec::join_token(&encoded, &tag))
}

/// Decode a token, checking only the signature.
///
/// Total: malformed shape, bad encoding, or a failed tag check all yield
/// `None`. Expiry and the paid flag are *not* checked here; use
/// [`verify_token`] for full local validity.
pub fn parse_token(token: &str, signer: &TagSigner) -> Option<AccessCredential> {
    let (encoded, tag) = codec::split_token(token)?;
    if !signer.verify(encoded, tag) {
        return None;
    }
    codec::decode_payload(encoded)
}

/// Full local-validity pipeline: signature, paid flag, expiry.
pub fn verify_token(
    token: &str,
    signer: &TagSigner,
    clock: &dyn Clock,
) -> Option<AccessCredential> {
    let credential = parse_token(token, signer)?;
    if !credential.is_live(clock) {
        return None;
    }
    Some(credential)
}
