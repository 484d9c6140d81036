//! Per-request gating decision.
//!
//! The gate is evaluated once per request, retains no state across requests,
//! and never performs a remote call: it inspects only locally verifiable
//! credential state, so it stays fast and available even when the payment
//! provider is unreachable. A credential whose payment was refunded after
//! issuance therefore remains locally valid until expiry or explicit revoke;
//! the out-of-band confirmation path in [`crate::validator`] covers that gap.

pub mod rules;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;

use crate::clock::Clock;
use crate::credential::signer::TagSigner;
use crate::credential::{verify_token, AccessCredential};
use crate::gate::rules::{RouteClass, RouteTable};

/// How a denied request should be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// API-style request: structured rejection, no redirect.
    ApiUnauthorized,
    /// Page-style request: redirect to the pricing entry point, carrying the
    /// originally requested path so the client can resume after purchase.
    PageRedirect {
        /// Redirect target, e.g. `/pricing?next=/cv`.
        location: String,
    },
}

impl Denial {
    /// HTTP status the transport layer should use.
    pub fn status(&self) -> u16 {
        match self {
            Denial::ApiUnauthorized => 401,
            Denial::PageRedirect { .. } => 307,
        }
    }

    /// Machine-readable body for API-style denials.
    pub fn body(&self) -> Option<DenialBody> {
        match self {
            Denial::ApiUnauthorized => Some(DenialBody {
                error: "payment_required",
            }),
            Denial::PageRedirect { .. } => None,
        }
    }
}

/// JSON body returned for API-style denials. Deliberately carries no detail
/// about why validation failed.
#[derive(Debug, Clone, Serialize)]
pub struct DenialBody {
    /// Machine-readable reason code.
    pub error: &'static str,
}

/// Outcome of evaluating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Path is public; no credential needed.
    PublicAllow,
    /// Path is protected and the presented credential is locally valid.
    ProtectedAllow(AccessCredential),
    /// Path is protected and no locally valid credential was presented.
    ProtectedDeny(Denial),
}

impl GateDecision {
    /// Whether the request may proceed to its handler.
    pub fn is_allowed(&self) -> bool {
        !matches!(self, GateDecision::ProtectedDeny(_))
    }
}

/// The request gate: route table plus denial targets.
#[derive(Debug, Clone)]
pub struct RequestGate {
    table: RouteTable,
    pricing_path: String,
}

impl RequestGate {
    /// Build a gate over the configured route lists.
    pub fn new(public_paths: &[String], protected_paths: &[String], pricing_path: &str) -> Self {
        Self {
            table: RouteTable::new(public_paths, protected_paths),
            pricing_path: pricing_path.to_string(),
        }
    }

    /// Evaluate one request.
    ///
    /// `token` is the raw credential cookie value, if any. A missing,
    /// malformed, forged, unpaid, or expired credential all produce the same
    /// denial.
    pub fn decide(
        &self,
        path: &str,
        token: Option<&str>,
        signer: &TagSigner,
        clock: &dyn Clock,
    ) -> GateDecision {
        if self.table.classify(path) == RouteClass::Public {
            return GateDecision::PublicAllow;
        }

        if let Some(credential) = token.and_then(|t| verify_token(t, signer, clock)) {
            tracing::debug!(path, "protected path allowed");
            return GateDecision::ProtectedAllow(credential);
        }

        tracing::debug!(path, "protected path denied");
        GateDecision::ProtectedDeny(if is_api_path(path) {
            Denial::ApiUnauthorized
        } else {
            Denial::PageRedirect {
                location: format!(
                    "{}?next={}",
                    self.pricing_path,
                    utf8_percent_encode(path, NEXT_TARGET)
                ),
            }
        })
    }
}

/// Characters escaped when the denied path is carried as the `next` query
/// value. `/` stays literal so the return target remains readable.
const NEXT_TARGET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'=');

/// API-style requests are distinguished by the `/api` path prefix.
fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::credential::issue_token;

    fn test_signer() -> TagSigner {
        TagSigner::from_hex(&"33".repeat(32)).unwrap()
    }

    fn clock() -> MockClock {
        MockClock::from_rfc3339("2025-06-01T12:00:00Z")
    }

    fn gate() -> RequestGate {
        RequestGate::new(
            &["/pricing".to_string(), "/api/checkout".to_string()],
            &["/cv".to_string(), "/api/generate-cv".to_string()],
            "/pricing",
        )
    }

    fn valid_token(signer: &TagSigner, clock: &MockClock) -> String {
        let credential = AccessCredential::paid_until(
            clock.now_ms() + 3_600_000,
            Some("cs_test_1".to_string()),
        );
        issue_token(&credential, signer).unwrap()
    }

    #[test]
    fn public_path_allowed_without_credential() {
        let decision = gate().decide("/pricing", None, &test_signer(), &clock());
        assert_eq!(decision, GateDecision::PublicAllow);
    }

    #[test]
    fn protected_page_without_credential_redirects_with_return_target() {
        let decision = gate().decide("/cv", None, &test_signer(), &clock());
        assert_eq!(
            decision,
            GateDecision::ProtectedDeny(Denial::PageRedirect {
                location: "/pricing?next=/cv".to_string(),
            })
        );
    }

    #[test]
    fn protected_api_without_credential_gets_structured_rejection() {
        let decision = gate().decide("/api/generate-cv", None, &test_signer(), &clock());
        let GateDecision::ProtectedDeny(denial) = decision else {
            panic!("expected denial");
        };
        assert_eq!(denial, Denial::ApiUnauthorized);
        assert_eq!(denial.status(), 401);
        assert_eq!(denial.body().unwrap().error, "payment_required");
    }

    #[test]
    fn redirect_target_escapes_query_metacharacters() {
        let decision = gate().decide(
            "/cv/export?fmt=pdf&page=2#top",
            None,
            &test_signer(),
            &clock(),
        );
        assert_eq!(
            decision,
            GateDecision::ProtectedDeny(Denial::PageRedirect {
                location: "/pricing?next=/cv/export%3Ffmt%3Dpdf%26page%3D2%23top".to_string(),
            })
        );
    }

    #[test]
    fn page_redirect_has_no_body_and_307_status() {
        let denial = Denial::PageRedirect {
            location: "/pricing?next=/cv".to_string(),
        };
        assert_eq!(denial.status(), 307);
        assert!(denial.body().is_none());
    }

    #[test]
    fn protected_path_with_valid_credential_allowed() {
        let signer = test_signer();
        let clock = clock();
        let token = valid_token(&signer, &clock);
        let decision = gate().decide("/cv", Some(&token), &signer, &clock);
        assert!(matches!(decision, GateDecision::ProtectedAllow(_)));
        assert!(decision.is_allowed());
    }

    #[test]
    fn expired_credential_denied_like_missing() {
        let signer = test_signer();
        let clock = clock();
        let credential = AccessCredential::paid_until(clock.now_ms() - 1, None);
        let token = issue_token(&credential, &signer).unwrap();

        let with_expired = gate().decide("/cv", Some(&token), &signer, &clock);
        let with_nothing = gate().decide("/cv", None, &signer, &clock);
        assert_eq!(with_expired, with_nothing);
    }

    #[test]
    fn forged_credential_denied_like_missing() {
        let signer = test_signer();
        let clock = clock();
        let other = TagSigner::from_hex(&"44".repeat(32)).unwrap();
        let forged = valid_token(&other, &clock);

        let with_forged = gate().decide("/cv", Some(&forged), &signer, &clock);
        let with_nothing = gate().decide("/cv", None, &signer, &clock);
        assert_eq!(with_forged, with_nothing);
    }

    #[test]
    fn unmatched_path_is_open_by_default() {
        let decision = gate().decide("/about", None, &test_signer(), &clock());
        assert_eq!(decision, GateDecision::PublicAllow);
    }

    #[test]
    fn public_allow_list_beats_api_classification() {
        // /api/checkout is on the allow-list; it must not be gated
        let decision = gate().decide("/api/checkout", None, &test_signer(), &clock());
        assert_eq!(decision, GateDecision::PublicAllow);
    }

    #[test]
    fn api_path_detection() {
        assert!(is_api_path("/api"));
        assert!(is_api_path("/api/generate-cv"));
        assert!(!is_api_path("/apiary"));
        assert!(!is_api_path("/cv"));
    }
}
