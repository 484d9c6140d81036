//! Credential cookie directives.
//!
//! The credential is client-held, transported as a cookie that is not
//! readable by script, sent only over secure transport in production, scoped
//! to the whole site, with a lax cross-site send policy. This module only
//! formats `Set-Cookie` values; the embedding HTTP layer attaches them.

use chrono::DateTime;

use crate::clock::Clock;

const EPOCH_HTTP_DATE: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Format an instant as an HTTP cookie `Expires` date.
fn http_date(at_ms: i64) -> String {
    let instant = DateTime::from_timestamp_millis(at_ms).unwrap_or(DateTime::UNIX_EPOCH);
    instant.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn secure_suffix(secure: bool) -> &'static str {
    if secure {
        "; Secure"
    } else {
        ""
    }
}

/// Build the `Set-Cookie` value installing a credential token.
///
/// Cookie lifetime matches the credential's `expires_at`, carried as both
/// `Max-Age` and an absolute `Expires`.
pub fn set_credential_cookie(
    name: &str,
    token: &str,
    expires_at_ms: i64,
    secure: bool,
    clock: &dyn Clock,
) -> String {
    let max_age_secs = ((expires_at_ms - clock.now_ms()) / 1000).max(0);
    format!(
        "{}={}; Path=/; Max-Age={}; Expires={}; HttpOnly; SameSite=Lax{}",
        name,
        token,
        max_age_secs,
        http_date(expires_at_ms),
        secure_suffix(secure),
    )
}

/// Build the `Set-Cookie` value clearing the credential.
///
/// Sets both a zero lifetime and an already-past absolute expiry, for
/// clients that honor one attribute over the other.
pub fn clear_credential_cookie(name: &str, secure: bool) -> String {
    format!(
        "{}=; Path=/; Max-Age=0; Expires={}; HttpOnly; SameSite=Lax{}",
        name,
        EPOCH_HTTP_DATE,
        secure_suffix(secure),
    )
}
