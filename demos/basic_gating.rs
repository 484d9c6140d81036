//! Basic paywall gating example.
//!
//! This example demonstrates the core workflow: issue a credential for a
//! settled checkout session, gate requests with it, and re-confirm it against
//! the provider ledger.
//!
//! # Running
//!
//! ```bash
//! export PAYGATE_SIGNING_SECRET="$(openssl rand -hex 32)"
//! export PROVIDER_SECRET_KEY="sk_test_your_key"
//! cargo run --example basic_gating -- cs_test_your_session
//! ```
//!
//! # Note
//!
//! The signing secret is process-wide secret state. Load it from the
//! deployment environment at startup and never ship a default; the manager
//! refuses to construct without a valid one.

use paygate::{PaygateConfig, PaygateError, PaywallManager};
use std::time::Duration;

fn main() {
    // The checkout session id comes from the provider's payment-success
    // callback in a real deployment.
    let session_id = std::env::args()
        .nth(1)
        .expect("Pass a provider checkout session id (cs_...)");

    let config = PaygateConfig {
        signing_secret_hex: std::env::var("PAYGATE_SIGNING_SECRET")
            .expect("Set PAYGATE_SIGNING_SECRET (hex, 32 bytes minimum)"),
        admin_token: std::env::var("PAYGATE_ADMIN_TOKEN").ok(),
        provider_secret_key: std::env::var("PROVIDER_SECRET_KEY").ok(),
        cookie_name: "paygate_access".to_string(),
        validity_window: Duration::from_secs(30 * 24 * 60 * 60), // 30 days
        provider_timeout: Duration::from_secs(10),
        secure_cookies: false, // local demo over plain http
        pricing_path: "/pricing".to_string(),
        public_paths: vec!["/".to_string(), "/pricing".to_string()],
        protected_paths: vec!["/cv".to_string(), "/api/generate-cv".to_string()],
    };

    let manager = match PaywallManager::new(config) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Issue re-checks the session against the ledger before minting:
    // it must be paid, with zero refunded, and not revoked.
    match manager.issue(&session_id) {
        Ok(receipt) => {
            println!("✓ Credential issued for {}", receipt.session_id);
            println!("  Set-Cookie: {}", receipt.cookie);
            println!("  Expires at: {} (epoch ms)", receipt.expires_at);

            for path in ["/pricing", "/cv", "/api/generate-cv"] {
                let with = manager.gate(path, Some(&receipt.token));
                let without = manager.gate(path, None);
                println!(
                    "  {:20} with credential: {:5}  without: {}",
                    path,
                    with.is_allowed(),
                    without.is_allowed()
                );
            }

            // The stronger, ledger-backed check the gate deliberately skips
            let status = manager.status(Some(&receipt.token));
            println!("  Ledger-confirmed: {}", status.confirmed);
        }
        Err(e) => {
            match &e {
                PaygateError::SessionUnpaid => {
                    eprintln!("Session is not in a settled, paid state");
                }
                PaygateError::ProviderTransport(_) => {
                    eprintln!("Could not reach the payment provider: {}", e);
                }
                PaygateError::ProtocolError(_) => {
                    eprintln!("Not a recognizable provider session id");
                }
                _ => {
                    eprintln!("Issue failed: {}", e);
                }
            }
            std::process::exit(1);
        }
    }
}
