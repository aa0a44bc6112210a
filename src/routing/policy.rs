// SPDX-License-Identifier: MIT

//! Path classification: which paths need a session, which need its absence.

/// Path prefixes that require an authenticated session.
///
/// `/admin` is deliberately absent: the admin page performs its own
/// identity-aware check downstream so it can distinguish "not logged in"
/// from "logged in without the admin role" instead of blindly redirecting.
pub const PROTECTED_PREFIXES: &[&str] = &[
    "/home",
    "/profile",
    "/portfolio",
    "/contributor",
    "/prompts",
    "/checkout",
];

/// Path prefixes reserved for unauthenticated visitors.
pub const AUTH_ONLY_PREFIXES: &[&str] = &["/login", "/signup"];

/// Login path a protected-path redirect targets.
pub const LOGIN_PATH: &str = "/login";

/// Landing path for an already-authenticated visitor hitting an auth page.
pub const HOME_PATH: &str = "/home";

/// Query parameter carrying the original path through the login redirect.
pub const RETURN_PARAM: &str = "redirectTo";

/// Access policy for a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathPolicy {
    /// Anyone may view.
    Public,
    /// Requires a session.
    Protected,
    /// Login/signup; requires the absence of a session.
    AuthOnly,
}

/// Classify a request path against the canonical policy table.
///
/// Prefix matching: `/profile/settings` is Protected because `/profile` is.
/// A prefix only matches at a path-segment boundary, so `/profiles` is not
/// captured by `/profile`. Protected wins over AuthOnly if the tables ever
/// overlap. Pure and deterministic; every call site sees the same verdict
/// for the same path.
pub fn classify(path: &str) -> PathPolicy {
    if matches_any(path, PROTECTED_PREFIXES) {
        PathPolicy::Protected
    } else if matches_any(path, AUTH_ONLY_PREFIXES) {
        PathPolicy::AuthOnly
    } else {
        PathPolicy::Public
    }
}

fn matches_any(path: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| matches_prefix(path, prefix))
}

/// True when `path` equals `prefix` or starts with `prefix` followed by a
/// segment separator.
fn matches_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_prefixes() {
        assert_eq!(classify("/home"), PathPolicy::Protected);
        assert_eq!(classify("/profile"), PathPolicy::Protected);
        assert_eq!(classify("/profile/settings"), PathPolicy::Protected);
        assert_eq!(classify("/contributor/alice"), PathPolicy::Protected);
        assert_eq!(classify("/prompts/42"), PathPolicy::Protected);
        assert_eq!(classify("/checkout/42"), PathPolicy::Protected);
        assert_eq!(classify("/portfolio"), PathPolicy::Protected);
    }

    #[test]
    fn test_auth_only_prefixes() {
        assert_eq!(classify("/login"), PathPolicy::AuthOnly);
        assert_eq!(classify("/signup"), PathPolicy::AuthOnly);
    }

    #[test]
    fn test_public_paths() {
        assert_eq!(classify("/"), PathPolicy::Public);
        assert_eq!(classify("/gallery"), PathPolicy::Public);
        assert_eq!(classify("/health"), PathPolicy::Public);
        // Admin is left for the downstream role-aware check.
        assert_eq!(classify("/admin"), PathPolicy::Public);
    }

    #[test]
    fn test_prefix_requires_segment_boundary() {
        assert_eq!(classify("/homework"), PathPolicy::Public);
        assert_eq!(classify("/profiles"), PathPolicy::Public);
        assert_eq!(classify("/loginner"), PathPolicy::Public);
    }

    #[test]
    fn test_classify_is_stable() {
        for path in ["/home", "/gallery", "/login", "/admin", "/x/y/z"] {
            assert_eq!(classify(path), classify(path));
        }
    }
}
