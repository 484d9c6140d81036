//! Paywall Manager - the main public API for paygate.
//!
//! The `PaywallManager` owns the process-wide secret state (signing key,
//! admin token, provider key) loaded once at startup, and exposes the
//! credential lifecycle and the per-request gate:
//! - `issue` after a provider-confirmed payment
//! - `status` for ledger-backed re-confirmation
//! - `revoke` for admin-forced invalidation ahead of natural expiry
//! - `logout` to clear the client-held credential
//! - `gate` for the fast, local-only request decision

use std::sync::Arc;

use serde::Serialize;
use subtle::ConstantTimeEq;

use crate::clock::{Clock, SystemClock};
use crate::config::PaygateConfig;
use crate::cookie::{clear_credential_cookie, set_credential_cookie};
use crate::credential::signer::TagSigner;
use crate::credential::{issue_token, AccessCredential};
use crate::gate::{GateDecision, RequestGate};
use crate::provider::client::ProviderClient;
use crate::provider::models::is_provider_session_id;
use crate::provider::PaymentLedger;
use crate::validator::{confirm_token, Confirmation};
use crate::PaygateError;

/// Result of issuing a credential.
///
/// Serializes to the issue endpoint's confirmation body; the token travels
/// only in the `Set-Cookie` header, never in a script-readable response body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueReceipt {
    /// The signed credential token.
    #[serde(skip)]
    pub token: String,
    /// `Set-Cookie` value installing the token on the client.
    #[serde(skip)]
    pub cookie: String,
    /// Credential expiry, epoch milliseconds.
    pub expires_at: i64,
    /// The provider session that authorized this credential.
    pub session_id: String,
}

/// Result of revoking a session.
///
/// Serializes to the revoke endpoint's JSON body
/// (`{"revoked": bool, "sessionId": string}`).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeReceipt {
    /// Whether the provider record was marked revoked.
    pub revoked: bool,
    /// The session that was revoked.
    pub session_id: String,
    /// `Set-Cookie` value clearing the local credential.
    #[serde(skip)]
    pub cookie: String,
}

/// Main paywall manager.
///
/// Create one instance at startup and share it across requests; all
/// operations are stateless and single-request-scoped, so `&self` access
/// from concurrent requests is safe.
pub struct PaywallManager {
    config: PaygateConfig,
    clock: Arc<dyn Clock>,
    signer: TagSigner,
    gate: RequestGate,
    ledger: Box<dyn PaymentLedger>,
}

impl PaywallManager {
    /// Create a manager backed by the real provider ledger client.
    ///
    /// # Errors
    /// Fails fast on invalid configuration, a missing/undersized signing
    /// secret, or a missing provider key — the system refuses to start
    /// rather than operate insecurely.
    pub fn new(config: PaygateConfig) -> Result<Self, PaygateError> {
        let key = config.provider_secret_key.clone().ok_or_else(|| {
            PaygateError::ConfigError("provider secret key is not configured".to_string())
        })?;
        let ledger = ProviderClient::new(&key, config.provider_timeout)?;
        Self::with_ledger(config, Box::new(ledger))
    }

    /// Create a manager over a custom ledger implementation.
    pub fn with_ledger(
        config: PaygateConfig,
        ledger: Box<dyn PaymentLedger>,
    ) -> Result<Self, PaygateError> {
        Self::with_parts(config, ledger, Arc::new(SystemClock))
    }

    /// Create a manager with a custom clock (for testing).
    #[cfg(any(test, feature = "test-seams"))]
    pub fn with_ledger_and_clock(
        config: PaygateConfig,
        ledger: Box<dyn PaymentLedger>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, PaygateError> {
        Self::with_parts(config, ledger, clock)
    }

    fn with_parts(
        config: PaygateConfig,
        ledger: Box<dyn PaymentLedger>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, PaygateError> {
        config.validate()?;
        let signer = TagSigner::from_hex(&config.signing_secret_hex)?;
        let gate = RequestGate::new(
            &config.public_paths,
            &config.protected_paths,
            &config.pricing_path,
        );

        Ok(Self {
            config,
            clock,
            signer,
            gate,
            ledger,
        })
    }

    /// Issue a credential for a provider-confirmed payment session.
    ///
    /// The session is re-fetched and must satisfy the settled predicate
    /// (paid, zero refunded, not revoked) before anything is minted; an
    /// out-of-order call cannot obtain a credential.
    ///
    /// # Errors
    /// - `MissingSessionId` - no session id supplied
    /// - `ProtocolError` - the id is not a recognizable provider session id
    /// - `SessionUnpaid` - the session is not in a settled, paid state
    /// - `ProviderTransport` - the ledger could not be queried
    pub fn issue(&self, session_id: &str) -> Result<IssueReceipt, PaygateError> {
        if session_id.is_empty() {
            return Err(PaygateError::MissingSessionId);
        }
        if !is_provider_session_id(session_id) {
            return Err(PaygateError::ProtocolError(
                "not a recognizable provider session id".to_string(),
            ));
        }

        let record = self.ledger.fetch_session(session_id)?;
        if !record.is_settled() {
            tracing::warn!(session_id, "refusing to issue for unsettled session");
            return Err(PaygateError::SessionUnpaid);
        }

        let expires_at = self.clock.now_ms() + self.config.validity_window.as_millis() as i64;
        let credential = AccessCredential::paid_until(expires_at, Some(session_id.to_string()));
        let token = issue_token(&credential, &self.signer)?;
        let cookie = set_credential_cookie(
            &self.config.cookie_name,
            &token,
            expires_at,
            self.config.secure_cookies,
            self.clock.as_ref(),
        );

        tracing::debug!(session_id, expires_at, "credential issued");
        Ok(IssueReceipt {
            token,
            cookie,
            expires_at,
            session_id: session_id.to_string(),
        })
    }

    /// Report whether the presented credential is currently confirmed
    /// against the provider ledger.
    ///
    /// Always answers; internal failures degrade to `confirmed: false`.
    pub fn status(&self, token: Option<&str>) -> Confirmation {
        match token {
            Some(token) => confirm_token(token, &self.signer, self.clock.as_ref(), &*self.ledger),
            None => Confirmation {
                confirmed: false,
                expires_at: None,
            },
        }
    }

    /// Revoke a session ahead of natural expiry. Privileged.
    ///
    /// # Errors
    /// - `ConfigError` - no admin token configured (500-class)
    /// - `Unauthorized` - missing or wrong admin secret (401)
    /// - `MissingSessionId` - no session id supplied (400)
    /// - `ProviderTransport` - the ledger update failed
    pub fn revoke(
        &self,
        session_id: Option<&str>,
        admin_secret: Option<&str>,
    ) -> Result<RevokeReceipt, PaygateError> {
        let expected = self.config.admin_token.as_deref().ok_or_else(|| {
            PaygateError::ConfigError("admin token is not configured".to_string())
        })?;

        if !admin_secret.is_some_and(|given| secrets_match(given, expected)) {
            return Err(PaygateError::Unauthorized);
        }

        let session_id = match session_id {
            Some(id) if !id.is_empty() => id,
            _ => return Err(PaygateError::MissingSessionId),
        };

        self.ledger.revoke_session(session_id)?;
        tracing::warn!(session_id, "session revoked by admin");

        Ok(RevokeReceipt {
            revoked: true,
            session_id: session_id.to_string(),
            cookie: clear_credential_cookie(&self.config.cookie_name, self.config.secure_cookies),
        })
    }

    /// Clear the client-held credential. Idempotent, no server-side effect.
    pub fn logout(&self) -> String {
        clear_credential_cookie(&self.config.cookie_name, self.config.secure_cookies)
    }

    /// Evaluate the request gate for a path and optional credential token.
    pub fn gate(&self, path: &str, token: Option<&str>) -> GateDecision {
        self.gate
            .decide(path, token, &self.signer, self.clock.as_ref())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &PaygateConfig {
        &self.config
    }
}

/// Constant-time secret comparison; a length mismatch rejects without a
/// value comparison.
fn secrets_match(given: &str, expected: &str) -> bool {
    let (given, expected) = (given.as_bytes(), expected.as_bytes());
    if given.len() != expected.len() {
        return false;
    }
    given.ct_eq(expected).into()
}
