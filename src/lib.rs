//! # Paygate
//!
//! **Fail-closed paywall access credentials for Rust web backends.**
//!
//! Paygate mints signed, expiring access credentials after a confirmed
//! payment, carries them in hardened cookies, gates protected routes with a
//! purely local check, and re-confirms credentials against the payment
//! provider's live ledger to pick up refunds and revocations.
//!
//! ## Features
//!
//! - **HMAC-SHA256 signed credentials** — forged or tampered tokens verify false
//! - **Constant-time verification** — tag comparison leaks no timing signal
//! - **Local-only request gate** — longest-prefix route rules, no network on the hot path
//! - **Ledger-backed confirmation** — refunds and admin revocation cut access off
//! - **Fail-closed everywhere** — malformed input, missing keys, or provider
//!   outages deny access, never grant it
//!
//! ## Quickstart
//!
//! ```no_run
//! use paygate::{PaygateConfig, PaywallManager};
//! use std::time::Duration;
//!
//! fn main() -> Result<(), paygate::PaygateError> {
//!     let config = PaygateConfig {
//!         signing_secret_hex: std::env::var("PAYGATE_SIGNING_SECRET").unwrap_or_default(),
//!         admin_token: std::env::var("PAYGATE_ADMIN_TOKEN").ok(),
//!         provider_secret_key: std::env::var("PROVIDER_SECRET_KEY").ok(),
//!         cookie_name: "paygate_access".to_string(),
//!         validity_window: Duration::from_secs(30 * 24 * 60 * 60), // 30 days
//!         provider_timeout: Duration::from_secs(10),
//!         secure_cookies: true,
//!         pricing_path: "/pricing".to_string(),
//!         public_paths: vec!["/".to_string(), "/pricing".to_string()],
//!         protected_paths: vec!["/cv".to_string(), "/api/generate-cv".to_string()],
//!     };
//!
//!     let manager = PaywallManager::new(config)?;
//!
//!     // After the provider confirms payment for a checkout session:
//!     let receipt = manager.issue("cs_live_abc123")?;
//!     println!("Set-Cookie: {}", receipt.cookie);
//!
//!     // On every request to a protected route:
//!     let decision = manager.gate("/cv", Some(&receipt.token));
//!     assert!(decision.is_allowed());
//!     Ok(())
//! }
//! ```
//!
//! ## Threat Model
//!
//! Paygate protects against:
//! - **Credential forgery** — tokens are HMAC-signed with a server-held key
//! - **Payload tampering** — any bit flip in payload or tag fails verification
//! - **Refund abuse** — confirmation re-checks the live ledger; any refund
//!   amount denies
//! - **Stale revoked access** — admin revocation is recorded at the provider
//!   and picked up by the next confirmation
//!
//! Paygate does **not** re-confirm the ledger on the per-request gate; a
//! revoked credential keeps passing the local gate until it expires or the
//! cookie is cleared. Pair the gate with periodic [`PaywallManager::status`]
//! checks where that window matters.
//!
//! ## Configuration
//!
//! - `signing_secret_hex` — hex-encoded HMAC key, 32 bytes minimum
//! - `provider_secret_key` — payment provider API key (server-side only)
//! - `admin_token` — shared secret authorizing revocation
//! - `validity_window` — credential lifetime from issue
//!
//! See [`PaygateConfig`] for full documentation.

#![deny(warnings)]
#![deny(missing_docs)]
#![doc(html_root_url = "https://docs.rs/paygate/0.1.0")]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;

// Credential layer
pub mod cookie;
pub mod credential;

// Gate layer
pub mod gate;

// Provider layer
pub mod provider;
pub mod validator;

// License layer
pub mod license;

// Manager (main public API)
pub mod manager;

// Re-exports for public API
pub use clock::{Clock, SystemClock};
pub use config::PaygateConfig;
pub use credential::AccessCredential;
pub use errors::PaygateError;
pub use gate::rules::RouteClass;
pub use gate::{Denial, GateDecision, RequestGate};
pub use manager::{IssueReceipt, PaywallManager, RevokeReceipt};
pub use provider::PaymentLedger;
pub use validator::Confirmation;

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;
