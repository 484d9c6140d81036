//! Paygate configuration.

use std::time::Duration;

/// Configuration for the paywall gate.
///
/// This struct contains all deployment-specific settings: secrets, the
/// credential validity window, cookie transport attributes, and the
/// public/protected route lists. Construct it explicitly at startup and pass
/// it to [`crate::PaywallManager::new`]; construction fails fast on a missing
/// or undersized signing secret rather than degrading at first use.
#[derive(Debug, Clone)]
pub struct PaygateConfig {
    /// HMAC signing secret, hex-encoded, at least 32 bytes once decoded.
    /// SECURITY: process-wide secret state. Load from the deployment
    /// environment at startup; never ship a default.
    pub signing_secret_hex: String,

    /// Admin secret for the privileged revoke endpoint.
    /// Absence is a configuration error surfaced when revoke is attempted.
    pub admin_token: Option<String>,

    /// Payment-provider API secret used by the ledger client.
    pub provider_secret_key: Option<String>,

    /// Name of the credential cookie (e.g., "paygate_access").
    pub cookie_name: String,

    /// How long an issued credential remains locally valid.
    pub validity_window: Duration,

    /// Bounded timeout for ledger queries.
    pub provider_timeout: Duration,

    /// Whether to emit the `Secure` cookie attribute (on in production).
    pub secure_cookies: bool,

    /// Redirect target for denied page-style requests (e.g., "/pricing").
    pub pricing_path: String,

    /// Paths on the public allow-list (exact or prefix match).
    pub public_paths: Vec<String>,

    /// Paths requiring a valid credential (exact or prefix match).
    pub protected_paths: Vec<String>,
}

impl PaygateConfig {
    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), crate::PaygateError> {
        let secret = hex::decode(&self.signing_secret_hex).map_err(|e| {
            crate::PaygateError::ConfigError(format!("signing secret is not valid hex: {}", e))
        })?;
        if secret.len() < 32 {
            return Err(crate::PaygateError::ConfigError(format!(
                "signing secret must be at least 32 bytes, got {}",
                secret.len()
            )));
        }
        if self.cookie_name.is_empty() {
            return Err(crate::PaygateError::ConfigError(
                "cookie_name cannot be empty".to_string(),
            ));
        }
        if self.validity_window.is_zero() {
            return Err(crate::PaygateError::ConfigError(
                "validity_window cannot be zero".to_string(),
            ));
        }
        if self.pricing_path.is_empty() || !self.pricing_path.starts_with('/') {
            return Err(crate::PaygateError::ConfigError(
                "pricing_path must be an absolute path".to_string(),
            ));
        }
        for path in self.public_paths.iter().chain(&self.protected_paths) {
            if !path.starts_with('/') {
                return Err(crate::PaygateError::ConfigError(format!(
                    "route path {:?} must be absolute",
                    path
                )));
            }
        }
        Ok(())
    }
}
