//! HMAC-SHA256 tag computation and constant-time verification.
//!
//! The tag is a keyed hash over the encoded payload segment exactly as it
//! appears in the token, so any byte change to either segment invalidates it.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::PaygateError;

type HmacSha256 = Hmac<Sha256>;

/// Tag length in bytes (SHA-256 output).
pub const TAG_LEN: usize = 32;

/// Keyed signer/verifier over encoded payload bytes.
///
/// Holds the process-wide signing secret; constructed once at startup and
/// shared read-only afterwards. A missing or undersized secret is a fatal
/// construction error, never a silent bypass.
#[derive(Clone)]
pub struct TagSigner {
    mac: HmacSha256,
}

impl TagSigner {
    /// Build a signer from a hex-encoded secret of at least 32 bytes.
    pub fn from_hex(secret_hex: &str) -> Result<Self, PaygateError> {
        if secret_hex.is_empty() {
            return Err(PaygateError::ConfigError(
                "signing secret is not configured".to_string(),
            ));
        }
        let key = hex::decode(secret_hex).map_err(|e| {
            PaygateError::ConfigError(format!("signing secret is not valid hex: {}", e))
        })?;
        if key.len() < 32 {
            return Err(PaygateError::ConfigError(format!(
                "signing secret must be at least 32 bytes, got {}",
                key.len()
            )));
        }
        let mac = HmacSha256::new_from_slice(&key)
            .map_err(|e| PaygateError::ConfigError(format!("invalid HMAC key: {}", e)))?;
        Ok(Self { mac })
    }

    /// Compute the tag for an encoded payload, base64url-encoded without padding.
    pub fn sign(&self, encoded_payload: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(encoded_payload.as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }

    /// Verify a provided tag against the recomputed one.
    ///
    /// Total: malformed base64 and wrong-length tags return `false`. The
    /// length check happens before the value comparison; the value comparison
    /// itself is constant-time, never a short-circuiting byte compare.
    pub fn verify(&self, encoded_payload: &str, tag_b64: &str) -> bool {
        let Ok(provided) = URL_SAFE_NO_PAD.decode(tag_b64) else {
            return false;
        };
        if provided.len() != TAG_LEN {
            return false;
        }

        let mut mac = self.mac.clone();
        mac.update(encoded_payload.as_bytes());
        let expected = mac.finalize().into_bytes();

        expected.as_slice().ct_eq(provided.as_slice()).into()
    }
}

impl std::fmt::Debug for TagSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose key material
        f.debug_struct("TagSigner").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_signer() -> TagSigner {
        TagSigner::from_hex(&"ab".repeat(32)).unwrap()
    }

    #[test]
    fn sign_verify_roundtrip() {
        let signer = test_signer();
        let tag = signer.sign("eyJwYWlkIjp0cnVlfQ");
        assert!(signer.verify("eyJwYWlkIjp0cnVlfQ", &tag));
    }

    #[test]
    fn sign_is_deterministic() {
        let signer = test_signer();
        assert_eq!(signer.sign("payload"), signer.sign("payload"));
    }

    #[test]
    fn different_payloads_different_tags() {
        let signer = test_signer();
        assert_ne!(signer.sign("payload-a"), signer.sign("payload-b"));
    }

    #[test]
    fn different_keys_different_tags() {
        let a = TagSigner::from_hex(&"ab".repeat(32)).unwrap();
        let b = TagSigner::from_hex(&"cd".repeat(32)).unwrap();
        assert_ne!(a.sign("payload"), b.sign("payload"));
    }

    #[test]
    fn verify_rejects_tampered_payload() {
        let signer = test_signer();
        let tag = signer.sign("payload");
        assert!(!signer.verify("payloae", &tag));
    }

    #[test]
    fn verify_rejects_tampered_tag_every_byte() {
        let signer = test_signer();
        let tag = signer.sign("payload");
        let raw = URL_SAFE_NO_PAD.decode(&tag).unwrap();

        for i in 0..raw.len() {
            let mut flipped = raw.clone();
            flipped[i] ^= 0x01;
            let bad = URL_SAFE_NO_PAD.encode(&flipped);
            assert!(!signer.verify("payload", &bad), "byte {} accepted", i);
        }
    }

    #[test]
    fn verify_rejects_wrong_length_tag() {
        let signer = test_signer();
        let short = URL_SAFE_NO_PAD.encode([0u8; 16]);
        let long = URL_SAFE_NO_PAD.encode([0u8; 48]);
        assert!(!signer.verify("payload", &short));
        assert!(!signer.verify("payload", &long));
    }

    #[test]
    fn verify_rejects_malformed_base64() {
        let signer = test_signer();
        assert!(!signer.verify("payload", "not//valid==base64!!"));
    }

    #[test]
    fn rejects_empty_secret() {
        assert!(matches!(
            TagSigner::from_hex(""),
            Err(PaygateError::ConfigError(_))
        ));
    }

    #[test]
    fn rejects_short_secret() {
        assert!(matches!(
            TagSigner::from_hex(&"ab".repeat(16)),
            Err(PaygateError::ConfigError(_))
        ));
    }

    #[test]
    fn rejects_non_hex_secret() {
        assert!(matches!(
            TagSigner::from_hex("zz-not-hex"),
            Err(PaygateError::ConfigError(_))
        ));
    }
}
