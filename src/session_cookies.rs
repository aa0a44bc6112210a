// SPDX-License-Identifier: MIT

//! Session cookie construction shared by the guard, the auth endpoints,
//! and the client re-check endpoint.
//!
//! Both cookies are HttpOnly, SameSite=Lax, path=/. The refresh cookie
//! outlives the access token so an expired session can still be renewed.

use crate::services::auth::AuthTokens;
use axum::http::{header, HeaderValue};
use axum::response::Response;
use axum_extra::extract::cookie::{Cookie, SameSite};
use crate::services::session::{ACCESS_COOKIE, REFRESH_COOKIE};

/// Refresh cookie lifetime (30 days).
const REFRESH_MAX_AGE: time::Duration = time::Duration::days(30);

/// Fallback access cookie lifetime when the collaborator omits expires_in.
const DEFAULT_ACCESS_MAX_AGE: time::Duration = time::Duration::hours(1);

/// Cookie pair for a freshly issued token bundle.
pub fn for_tokens(tokens: &AuthTokens) -> [Cookie<'static>; 2] {
    let access_max_age = if tokens.expires_in > 0 {
        time::Duration::seconds(tokens.expires_in as i64)
    } else {
        DEFAULT_ACCESS_MAX_AGE
    };

    [
        base_cookie(ACCESS_COOKIE, tokens.access_token.clone(), access_max_age),
        base_cookie(REFRESH_COOKIE, tokens.refresh_token.clone(), REFRESH_MAX_AGE),
    ]
}

/// Expired cookie pair that clears the session on the client.
pub fn cleared() -> [Cookie<'static>; 2] {
    [
        base_cookie(ACCESS_COOKIE, String::new(), time::Duration::ZERO),
        base_cookie(REFRESH_COOKIE, String::new(), time::Duration::ZERO),
    ]
}

fn base_cookie(name: &'static str, value: String, max_age: time::Duration) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(max_age);
    cookie
}

/// Append Set-Cookie headers to an already-built response.
pub fn attach(mut response: Response, cookies: &[Cookie<'static>]) -> Response {
    for cookie in cookies {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(err) => {
                // Token bytes should always be header-safe; log and skip.
                tracing::error!(error = %err, cookie = cookie.name(), "Unencodable cookie");
            }
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> AuthTokens {
        serde_json::from_value(serde_json::json!({
            "access_token": "at-123",
            "refresh_token": "rt-456",
            "expires_in": 3600,
        }))
        .unwrap()
    }

    #[test]
    fn test_cookie_pair_attributes() {
        let [access, refresh] = for_tokens(&tokens());

        assert_eq!(access.name(), ACCESS_COOKIE);
        assert_eq!(access.value(), "at-123");
        assert_eq!(access.max_age(), Some(time::Duration::seconds(3600)));
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.same_site(), Some(SameSite::Lax));
        assert_eq!(access.path(), Some("/"));

        assert_eq!(refresh.name(), REFRESH_COOKIE);
        assert_eq!(refresh.max_age(), Some(time::Duration::days(30)));
    }

    #[test]
    fn test_cleared_cookies_expire_immediately() {
        for cookie in cleared() {
            assert!(cookie.value().is_empty());
            assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        }
    }
}
