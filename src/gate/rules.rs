//! Route classification rules.
//!
//! An ordered rule table maps request paths to public/protected classes via
//! a pure longest-prefix-or-exact match, independent of any transport layer.
//! Paths matching no rule are public: the gate is open by default and denies
//! by exception.

/// Classification of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Allowed without a credential.
    Public,
    /// Requires a locally valid credential.
    Protected,
}

/// A single classification rule. The path matches exactly, or as a
/// path-segment prefix (`/cv` covers `/cv/export` but not `/cvx`).
#[derive(Debug, Clone)]
pub struct RouteRule {
    path: String,
    class: RouteClass,
}

impl RouteRule {
    /// Create a rule, normalizing away a trailing slash (except the root).
    pub fn new(path: &str, class: RouteClass) -> Self {
        let path = if path.len() > 1 {
            path.trim_end_matches('/').to_string()
        } else {
            path.to_string()
        };
        Self { path, class }
    }

    /// Match strength against a request path: `usize::MAX` for an exact
    /// match, the rule-path length for a segment-prefix match, `None` for
    /// no match.
    fn strength(&self, request_path: &str) -> Option<usize> {
        if request_path == self.path {
            return Some(usize::MAX);
        }
        if self.path == "/" {
            // Root prefix covers everything, at minimal strength
            return Some(1);
        }
        if request_path.starts_with(&self.path)
            && request_path.as_bytes().get(self.path.len()) == Some(&b'/')
        {
            return Some(self.path.len());
        }
        None
    }
}

/// Ordered rule table over the public and protected path lists.
#[derive(Debug, Clone)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    /// Build a table from the two configured lists. Public rules come first
    /// so they win ties at equal match strength, as the allow-list takes
    /// precedence.
    pub fn new(public_paths: &[String], protected_paths: &[String]) -> Self {
        let mut rules = Vec::with_capacity(public_paths.len() + protected_paths.len());
        for p in public_paths {
            rules.push(RouteRule::new(p, RouteClass::Public));
        }
        for p in protected_paths {
            rules.push(RouteRule::new(p, RouteClass::Protected));
        }
        Self { rules }
    }

    /// Classify a request path. Exact beats prefix, longer prefix beats
    /// shorter, earlier rule wins ties, no match is public.
    pub fn classify(&self, request_path: &str) -> RouteClass {
        let mut best: Option<(usize, RouteClass)> = None;
        for rule in &self.rules {
            if let Some(strength) = rule.strength(request_path) {
                if best.map_or(true, |(s, _)| strength > s) {
                    best = Some((strength, rule.class));
                }
            }
        }
        best.map_or(RouteClass::Public, |(_, class)| class)
    }
}
