//! Payment-provider ledger access.
//!
//! The ledger is the authoritative record of what was paid and refunded.
//! [`PaymentLedger`] is the seam the validator and lifecycle endpoints work
//! against; [`client::ProviderClient`] is the production implementation.

pub mod client;
pub mod models;

use crate::provider::models::SessionRecord;
use crate::PaygateError;

/// Read/annotate access to the provider's session ledger.
///
/// Implementations must bound their I/O: every call either completes or
/// fails within the configured timeout, and callers treat any error as
/// "not confirmed", never as implicit validity.
pub trait PaymentLedger: Send + Sync {
    /// Fetch a session's normalized payment/refund/revocation state.
    fn fetch_session(&self, session_id: &str) -> Result<SessionRecord, PaygateError>;

    /// Mark a session revoked in the provider's record, forcing every
    /// credential that references it to fail confirmation from now on.
    fn revoke_session(&self, session_id: &str) -> Result<(), PaygateError>;
}
