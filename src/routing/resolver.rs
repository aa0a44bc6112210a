// SPDX-License-Identifier: MIT

//! Redirect resolution from (policy, auth state, current path).

use crate::routing::policy::{PathPolicy, HOME_PATH, LOGIN_PATH, RETURN_PARAM};

/// Outcome of evaluating the routing policy for one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectDecision {
    /// Render the requested path unchanged.
    None,
    /// Short-circuit with a redirect to this path.
    To(String),
}

impl RedirectDecision {
    pub fn target(&self) -> Option<&str> {
        match self {
            RedirectDecision::None => None,
            RedirectDecision::To(path) => Some(path),
        }
    }
}

/// Decide whether the current navigation must be redirected.
///
/// Rules, in order:
/// 1. Protected without a session goes to login, carrying the original
///    path so post-login navigation can restore it.
/// 2. AuthOnly with a session goes to the authenticated landing page.
/// 3. Everything else passes through. An authenticated user on a
///    Protected path stays put, so re-resolving a pass-through is always
///    another pass-through and no redirect loop can form.
pub fn resolve(policy: PathPolicy, is_authenticated: bool, current_path: &str) -> RedirectDecision {
    match policy {
        PathPolicy::Protected if !is_authenticated => RedirectDecision::To(format!(
            "{}?{}={}",
            LOGIN_PATH,
            RETURN_PARAM,
            urlencoding::encode(current_path)
        )),
        PathPolicy::AuthOnly if is_authenticated => RedirectDecision::To(HOME_PATH.to_string()),
        _ => RedirectDecision::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::policy::classify;

    #[test]
    fn test_protected_without_session_redirects_to_login_with_return_path() {
        for path in ["/home", "/profile", "/contributor/alice", "/prompts/42"] {
            let decision = resolve(classify(path), false, path);
            let expected = format!("/login?redirectTo={}", urlencoding::encode(path));
            assert_eq!(decision, RedirectDecision::To(expected));
        }
    }

    #[test]
    fn test_auth_only_with_session_redirects_home() {
        for path in ["/login", "/signup"] {
            let decision = resolve(classify(path), true, path);
            assert_eq!(decision, RedirectDecision::To("/home".to_string()));
        }
    }

    #[test]
    fn test_pass_through_cases() {
        // Authenticated user on a protected path stays put.
        assert_eq!(resolve(PathPolicy::Protected, true, "/home"), RedirectDecision::None);
        // Public paths never redirect.
        assert_eq!(resolve(PathPolicy::Public, false, "/gallery"), RedirectDecision::None);
        assert_eq!(resolve(PathPolicy::Public, true, "/gallery"), RedirectDecision::None);
        // Unauthenticated visitor may view login.
        assert_eq!(resolve(PathPolicy::AuthOnly, false, "/login"), RedirectDecision::None);
    }

    #[test]
    fn test_resolution_is_a_fixed_point() {
        // Following a redirect and re-resolving at the destination must not
        // produce another redirect for the same auth state.
        let first = resolve(classify("/home"), false, "/home");
        let target = first.target().unwrap();
        let bare_target = target.split('?').next().unwrap();
        assert_eq!(
            resolve(classify(bare_target), false, bare_target),
            RedirectDecision::None
        );

        let first = resolve(classify("/login"), true, "/login");
        let target = first.target().unwrap();
        assert_eq!(resolve(classify(target), true, target), RedirectDecision::None);
    }

    #[test]
    fn test_return_path_is_url_encoded() {
        let decision = resolve(PathPolicy::Protected, false, "/home");
        assert_eq!(
            decision,
            RedirectDecision::To("/login?redirectTo=%2Fhome".to_string())
        );
    }
}
