//! Credential payload codec.
//!
//! Tokens are two dot-joined segments: `base64url(payload).base64url(tag)`,
//! no padding, alphabet safe for cookie and header transport. Decoding is
//! total — malformed input of any kind yields `None`, never an error — so
//! callers treat "no credential" and "bad credential" identically.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use crate::credential::AccessCredential;
use crate::PaygateError;

/// Serialize a payload to its canonical encoded segment.
///
/// The canonical byte sequence is compact JSON with fields in declaration
/// order; the tag is computed over exactly these encoded bytes.
pub fn encode_payload(credential: &AccessCredential) -> Result<String, PaygateError> {
    let bytes = serde_json::to_vec(credential)
        .map_err(|e| PaygateError::ProtocolError(format!("Failed to serialize payload: {}", e)))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Decode an encoded payload segment. Total: malformed base64 or JSON ⇒ `None`.
pub fn decode_payload(encoded: &str) -> Option<AccessCredential> {
    let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Join payload and tag segments into a token.
pub fn join_token(encoded_payload: &str, tag: &str) -> String {
    format!("{}.{}", encoded_payload, tag)
}

/// Split a token into `(encoded_payload, tag)`.
///
/// Exactly one separator and two non-empty segments; anything else ⇒ `None`.
pub fn split_token(token: &str) -> Option<(&str, &str)> {
    let mut parts = token.split('.');
    let payload = parts.next()?;
    let tag = parts.next()?;
    if parts.next().is_some() || payload.is_empty() || tag.is_empty() {
        return None;
    }
    Some((payload, tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_credential() -> AccessCredential {
        AccessCredential {
            paid: true,
            expires_at: 1_737_000_000_000,
            session_id: Some("cs_test_abc123".to_string()),
        }
    }

    #[test]
    fn payload_roundtrip() {
        let credential = test_credential();
        let encoded = encode_payload(&credential).unwrap();
        let decoded = decode_payload(&encoded).unwrap();
        assert_eq!(decoded, credential);
    }

    #[test]
    fn payload_roundtrip_without_session_id() {
        let credential = AccessCredential {
            paid: true,
            expires_at: 1_737_000_000_000,
            session_id: None,
        };
        let encoded = encode_payload(&credential).unwrap();
        let decoded = decode_payload(&encoded).unwrap();
        assert_eq!(decoded, credential);
    }

    #[test]
    fn encoded_segment_is_url_safe() {
        let encoded = encode_payload(&test_credential()).unwrap();
        assert!(encoded
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn decode_rejects_malformed_base64() {
        assert!(decode_payload("not%valid%base64").is_none());
    }

    #[test]
    fn decode_rejects_non_json_payload() {
        let encoded = URL_SAFE_NO_PAD.encode(b"not json at all");
        assert!(decode_payload(&encoded).is_none());
    }

    #[test]
    fn decode_rejects_wrong_shape_json() {
        let encoded = URL_SAFE_NO_PAD.encode(br#"{"something":"else"}"#);
        assert!(decode_payload(&encoded).is_none());
    }

    #[test]
    fn split_accepts_two_segments() {
        assert_eq!(split_token("abc.def"), Some(("abc", "def")));
    }

    #[test]
    fn split_rejects_wrong_segment_count() {
        assert!(split_token("abc").is_none());
        assert!(split_token("abc.def.ghi").is_none());
        assert!(split_token("").is_none());
    }

    #[test]
    fn split_rejects_empty_segments() {
        assert!(split_token(".def").is_none());
        assert!(split_token("abc.").is_none());
        assert!(split_token(".").is_none());
    }

    #[test]
    fn join_then_split() {
        let token = join_token("abc", "def");
        assert_eq!(split_token(&token), Some(("abc", "def")));
    }
}
