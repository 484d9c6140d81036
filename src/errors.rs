//! Paygate error types.

use thiserror::Error;

/// Errors that can occur while issuing, confirming, or revoking credentials.
///
/// Malformed or forged credentials never surface here: decoding and signature
/// verification are total operations that return `None`/`false`, so a bad
/// credential is indistinguishable from an absent one at the boundary.
#[derive(Debug, Error)]
pub enum PaygateError {
    /// Configuration is invalid or a required secret is missing.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Admin secret missing or did not match (privileged endpoints).
    #[error("Unauthorized")]
    Unauthorized,

    /// No provider session id was supplied where one is required.
    #[error("Missing provider session id")]
    MissingSessionId,

    /// The provider session exists but is not in a settled, paid state.
    #[error("Provider session is not paid")]
    SessionUnpaid,

    /// HTTP transport error communicating with the payment provider.
    #[error("Provider transport error: {0}")]
    ProviderTransport(String),

    /// Failed to parse a payment-provider response.
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// The license store could not be reached or returned an error.
    #[error("License store error: {0}")]
    StoreError(String),
}
