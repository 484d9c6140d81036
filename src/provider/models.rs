//! Payment-provider response structs and normalized session state.

use std::collections::HashMap;

use serde::Deserialize;

use crate::PaygateError;

/// Metadata key marking a session administratively revoked.
pub const REVOKED_METADATA_KEY: &str = "revoked";

/// Raw checkout-session response from the provider, with the payment and its
/// charge list expanded.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSessionResponse {
    /// Provider session id.
    pub id: String,
    /// Payment status reported by the provider ("paid", "unpaid", ...).
    pub payment_status: String,
    /// Free-form annotations; revocation is recorded here.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// The underlying payment, if expanded.
    #[serde(default)]
    pub payment_intent: Option<PaymentIntentData>,
}

/// Expanded payment data.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntentData {
    /// Provider payment id.
    pub id: String,
    /// Charges associated with this payment.
    #[serde(default)]
    pub charges: Option<ChargeList>,
}

/// Paginated charge container.
#[derive(Debug, Clone, Deserialize)]
pub struct ChargeList {
    /// The charges themselves.
    #[serde(default)]
    pub data: Vec<ChargeData>,
}

/// A single charge.
#[derive(Debug, Clone, Deserialize)]
pub struct ChargeData {
    /// Amount refunded on this charge, in minor units.
    #[serde(default)]
    pub amount_refunded: i64,
    /// Whether the charge was fully refunded.
    #[serde(default)]
    pub refunded: bool,
}

/// Normalized session state extracted from the raw response.
///
/// This is the single refund predicate used everywhere: a session is settled
/// iff the provider reports it paid, the aggregate refunded amount across the
/// payment's charges is exactly zero, and it has not been administratively
/// revoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    /// Provider session id.
    pub session_id: String,
    /// Provider reported status == "paid".
    pub paid: bool,
    /// Aggregate refunded amount across all associated charges.
    pub total_refunded: i64,
    /// Administratively revoked ahead of natural expiry.
    pub revoked: bool,
}

impl SessionRecord {
    /// Extract normalized state from a raw provider response.
    pub fn from_provider_response(response: &CheckoutSessionResponse) -> Self {
        let total_refunded = response
            .payment_intent
            .as_ref()
            .and_then(|pi| pi.charges.as_ref())
            .map(|charges| charges.data.iter().map(|c| c.amount_refunded).sum())
            .unwrap_or(0);

        let revoked = response
            .metadata
            .get(REVOKED_METADATA_KEY)
            .is_some_and(|v| v == "true");

        Self {
            session_id: response.id.clone(),
            paid: response.payment_status == "paid",
            total_refunded,
            revoked,
        }
    }

    /// The confirmation predicate over provider-side state.
    pub fn is_settled(&self) -> bool {
        self.paid && self.total_refunded == 0 && !self.revoked
    }
}

/// Whether a string is recognizable as a provider checkout-session id.
///
/// Anything else is unverifiable against the ledger and fails closed.
pub fn is_provider_session_id(id: &str) -> bool {
    match id.strip_prefix("cs_") {
        Some(rest) if !rest.is_empty() => {
            rest.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
        }
        _ => false,
    }
}

/// Parse a raw JSON body into a checkout-session response.
pub fn parse_session_response(body: &[u8]) -> Result<CheckoutSessionResponse, PaygateError> {
    serde_json::from_slice(body).map_err(|e| {
        PaygateError::ProtocolError(format!("Failed to parse provider response: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAID_RESPONSE: &str = r#"{
        "id": "cs_test_abc123",
        "payment_status": "paid",
        "metadata": {},
        "payment_intent": {
            "id": "pi_123",
            "charges": {
                "data": [
                    { "amount_refunded": 0, "refunded": false }
                ]
            }
        }
    }"#;

    const REFUNDED_RESPONSE: &str = r#"{
        "id": "cs_test_abc123",
        "payment_status": "paid",
        "metadata": {},
        "payment_intent": {
            "id": "pi_123",
            "charges": {
                "data": [
                    { "amount_refunded": 0, "refunded": false },
                    { "amount_refunded": 2900, "refunded": true }
                ]
            }
        }
    }"#;

    const REVOKED_RESPONSE: &str = r#"{
        "id": "cs_test_abc123",
        "payment_status": "paid",
        "metadata": { "revoked": "true" }
    }"#;

    const MINIMAL_RESPONSE: &str = r#"{
        "id": "cs_test_abc123",
        "payment_status": "unpaid"
    }"#;

    #[test]
    fn parse_paid_response() {
        let response = parse_session_response(PAID_RESPONSE.as_bytes()).unwrap();
        assert_eq!(response.id, "cs_test_abc123");
        assert_eq!(response.payment_status, "paid");
        assert!(response.payment_intent.is_some());
    }

    #[test]
    fn parse_minimal_response() {
        let response = parse_session_response(MINIMAL_RESPONSE.as_bytes()).unwrap();
        assert!(response.metadata.is_empty());
        assert!(response.payment_intent.is_none());
    }

    #[test]
    fn parse_malformed_json() {
        let result = parse_session_response(b"not json");
        assert!(matches!(result, Err(PaygateError::ProtocolError(_))));
    }

    #[test]
    fn settled_session() {
        let response = parse_session_response(PAID_RESPONSE.as_bytes()).unwrap();
        let record = SessionRecord::from_provider_response(&response);
        assert!(record.paid);
        assert_eq!(record.total_refunded, 0);
        assert!(!record.revoked);
        assert!(record.is_settled());
    }

    #[test]
    fn refund_aggregates_across_charges() {
        let response = parse_session_response(REFUNDED_RESPONSE.as_bytes()).unwrap();
        let record = SessionRecord::from_provider_response(&response);
        assert_eq!(record.total_refunded, 2900);
        assert!(!record.is_settled());
    }

    #[test]
    fn revoked_session_not_settled() {
        let response = parse_session_response(REVOKED_RESPONSE.as_bytes()).unwrap();
        let record = SessionRecord::from_provider_response(&response);
        assert!(record.revoked);
        assert!(!record.is_settled());
    }

    #[test]
    fn unpaid_session_not_settled() {
        let response = parse_session_response(MINIMAL_RESPONSE.as_bytes()).unwrap();
        let record = SessionRecord::from_provider_response(&response);
        assert!(!record.paid);
        assert!(!record.is_settled());
    }

    #[test]
    fn missing_expansion_counts_as_zero_refunded() {
        let response = parse_session_response(REVOKED_RESPONSE.as_bytes()).unwrap();
        let record = SessionRecord::from_provider_response(&response);
        assert_eq!(record.total_refunded, 0);
    }

    #[test]
    fn session_id_recognition() {
        assert!(is_provider_session_id("cs_test_abc123"));
        assert!(is_provider_session_id("cs_live_XYZ"));
        assert!(!is_provider_session_id("cs_"));
        assert!(!is_provider_session_id("pi_123"));
        assert!(!is_provider_session_id(""));
        assert!(!is_provider_session_id("cs_abc/../etc"));
    }
}
