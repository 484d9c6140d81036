//! Reqwest-based client for the payment provider's ledger API.
//!
//! The only two operations the gate needs: fetch a checkout session with the
//! payment and charges expanded, and annotate a session as revoked. Both are
//! bounded by the configured timeout.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::provider::models::{parse_session_response, SessionRecord, REVOKED_METADATA_KEY};
use crate::provider::PaymentLedger;
use crate::PaygateError;

const DEFAULT_HOST: &str = "api.stripe.com";

/// Blocking ledger client authenticated with the provider secret key.
pub struct ProviderClient {
    client: Client,
    secret_key: String,
    host: String,
}

impl ProviderClient {
    /// Create a client. The secret key must be present; a missing key is a
    /// configuration error, never a silently unauthenticated client.
    pub fn new(secret_key: &str, timeout: Duration) -> Result<Self, PaygateError> {
        if secret_key.is_empty() {
            return Err(PaygateError::ConfigError(
                "provider secret key is not configured".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                PaygateError::ProviderTransport(format!("Failed to create client: {}", e))
            })?;

        Ok(Self {
            client,
            secret_key: secret_key.to_string(),
            host: DEFAULT_HOST.to_string(),
        })
    }

    /// Create a client with a custom host (for testing).
    #[cfg(test)]
    pub fn with_host(secret_key: &str, timeout: Duration, host: String) -> Result<Self, PaygateError> {
        let mut client = Self::new(secret_key, timeout)?;
        client.host = host;
        Ok(client)
    }

    /// Get the configured host.
    pub fn host(&self) -> &str {
        &self.host
    }
}

impl PaymentLedger for ProviderClient {
    fn fetch_session(&self, session_id: &str) -> Result<SessionRecord, PaygateError> {
        let url = format!(
            "https://{}/v1/checkout/sessions/{}?expand[]=payment_intent.charges",
            self.host, session_id
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.secret_key)
            .send()
            .map_err(|e| PaygateError::ProviderTransport(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .map_err(|e| PaygateError::ProviderTransport(format!("Failed to read body: {}", e)))?;

        if !status.is_success() {
            return Err(PaygateError::ProviderTransport(format!(
                "Provider returned status {}",
                status.as_u16()
            )));
        }

        let parsed = parse_session_response(&body)?;
        Ok(SessionRecord::from_provider_response(&parsed))
    }

    fn revoke_session(&self, session_id: &str) -> Result<(), PaygateError> {
        let url = format!("https://{}/v1/checkout/sessions/{}", self.host, session_id);
        let field = format!("metadata[{}]", REVOKED_METADATA_KEY);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&[(field.as_str(), "true")])
            .send()
            .map_err(|e| PaygateError::ProviderTransport(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PaygateError::ProviderTransport(format!(
                "Provider returned status {}",
                status.as_u16()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client = ProviderClient::new("sk_test_123", Duration::from_secs(10));
        assert!(client.is_ok());
    }

    #[test]
    fn client_rejects_missing_key() {
        let result = ProviderClient::new("", Duration::from_secs(10));
        assert!(matches!(result, Err(PaygateError::ConfigError(_))));
    }

    #[test]
    fn client_default_host() {
        let client = ProviderClient::new("sk_test_123", Duration::from_secs(10)).unwrap();
        assert_eq!(client.host(), "api.stripe.com");
    }

    #[test]
    fn client_custom_host() {
        let client = ProviderClient::with_host(
            "sk_test_123",
            Duration::from_secs(10),
            "localhost:9099".to_string(),
        )
        .unwrap();
        assert_eq!(client.host(), "localhost:9099");
    }

    #[test]
    fn fetch_against_unreachable_host_is_transport_error() {
        // Nothing listens here; the call must resolve to an error, not hang
        let client = ProviderClient::with_host(
            "sk_test_123",
            Duration::from_millis(200),
            "127.0.0.1:1".to_string(),
        )
        .unwrap();
        let result = client.fetch_session("cs_test_abc");
        assert!(matches!(result, Err(PaygateError::ProviderTransport(_))));
    }
}
