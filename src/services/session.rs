// SPDX-License-Identifier: MIT

//! Session accessor: the single reading of "who is making this request".
//!
//! Both the request-scoped route guard and the client re-check endpoint go
//! through [`SessionAccessor::current_session`], so server and client
//! evaluations of the auth state cannot disagree structurally.
//!
//! Failure policy is fail closed: an unreachable collaborator, a garbled
//! token, or a failed refresh all read as "no session". That is never a
//! page-level error.

use crate::services::auth::{AuthClient, AuthTokens};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Cookie holding the collaborator-signed access token.
pub const ACCESS_COOKIE: &str = "pf_access_token";
/// Cookie holding the opaque refresh token.
pub const REFRESH_COOKIE: &str = "pf_refresh_token";

/// Access-token claims as signed by the auth collaborator.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    #[serde(default)]
    pub email: Option<String>,
}

/// Read-only, time-limited view of an authenticated identity.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
    pub expires_at: usize,
    /// Raw access token, forwarded to the store for row-level rules.
    pub access_token: String,
}

/// Result of one session evaluation.
///
/// `refreshed` carries a new token pair when the evaluation had to go
/// through the collaborator's refresh endpoint; the caller MUST attach
/// those cookies to the outgoing response or subsequent requests silently
/// log out once the old access token expires.
#[derive(Debug, Clone, Default)]
pub struct SessionOutcome {
    pub session: Option<Session>,
    pub refreshed: Option<AuthTokens>,
}

impl SessionOutcome {
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}

/// Evaluates session state from request-attached credentials.
#[derive(Clone)]
pub struct SessionAccessor {
    secret: Vec<u8>,
    auth: AuthClient,
}

impl SessionAccessor {
    pub fn new(secret: Vec<u8>, auth: AuthClient) -> Self {
        Self { secret, auth }
    }

    /// Evaluate the current session from the request's cookies.
    ///
    /// Never fails: any verification or collaborator error yields an
    /// unauthenticated outcome.
    pub async fn current_session(&self, jar: &CookieJar) -> SessionOutcome {
        let access_token = jar.get(ACCESS_COOKIE).map(|c| c.value().to_string());
        let refresh_token = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string());

        if let Some(token) = &access_token {
            if let Some(session) = self.verify(token) {
                return SessionOutcome {
                    session: Some(session),
                    refreshed: None,
                };
            }
        }

        // Access token absent, expired, or invalid. Try the refresh path.
        let Some(refresh_token) = refresh_token else {
            return SessionOutcome::default();
        };

        match self.auth.refresh(&refresh_token).await {
            Ok(tokens) => match self.verify(&tokens.access_token) {
                Some(session) => {
                    tracing::debug!(user_id = %session.user_id, "Session refreshed");
                    SessionOutcome {
                        session: Some(session),
                        refreshed: Some(tokens),
                    }
                }
                None => {
                    tracing::warn!("Refresh returned an unverifiable access token");
                    SessionOutcome::default()
                }
            },
            Err(err) => {
                // Fail closed: treat as unauthenticated.
                tracing::debug!(error = %err, "Session refresh failed");
                SessionOutcome::default()
            }
        }
    }

    /// Verify an access token locally. None on any defect, including an
    /// unset verification secret.
    fn verify(&self, token: &str) -> Option<Session> {
        if self.secret.is_empty() {
            return None;
        }

        let key = DecodingKey::from_secret(&self.secret);
        let mut validation = Validation::new(Algorithm::HS256);
        // The collaborator sets its own audience; subject and expiry are
        // what this service relies on.
        validation.validate_aud = false;

        let data = decode::<Claims>(token, &key, &validation).ok()?;

        Some(Session {
            user_id: data.claims.sub,
            email: data.claims.email,
            expires_at: data.claims.exp,
            access_token: token.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_extra::extract::cookie::Cookie;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    const SECRET: &[u8] = b"test_jwt_secret_32_bytes_minimum!";

    fn make_token(sub: &str, exp_offset_secs: i64, secret: &[u8]) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64;
        let claims = Claims {
            sub: sub.to_string(),
            exp: (now + exp_offset_secs) as usize,
            email: Some("user@example.com".to_string()),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
    }

    fn accessor() -> SessionAccessor {
        SessionAccessor::new(SECRET.to_vec(), AuthClient::new_mock())
    }

    fn jar_with(cookies: &[(&str, &str)]) -> CookieJar {
        let mut jar = CookieJar::new();
        for (name, value) in cookies {
            jar = jar.add(Cookie::new(name.to_string(), value.to_string()));
        }
        jar
    }

    #[tokio::test]
    async fn test_valid_access_token_yields_session() {
        let token = make_token("u-1", 3600, SECRET);
        let jar = jar_with(&[(ACCESS_COOKIE, &token)]);

        let outcome = accessor().current_session(&jar).await;
        let session = outcome.session.expect("should be authenticated");
        assert_eq!(session.user_id, "u-1");
        assert_eq!(session.email.as_deref(), Some("user@example.com"));
        assert!(outcome.refreshed.is_none());
    }

    #[tokio::test]
    async fn test_no_cookies_is_unauthenticated() {
        let outcome = accessor().current_session(&CookieJar::new()).await;
        assert!(!outcome.is_authenticated());
    }

    #[tokio::test]
    async fn test_expired_token_without_refresh_fails_closed() {
        let token = make_token("u-1", -3600, SECRET);
        let jar = jar_with(&[(ACCESS_COOKIE, &token)]);

        let outcome = accessor().current_session(&jar).await;
        assert!(!outcome.is_authenticated());
    }

    #[tokio::test]
    async fn test_wrong_signature_fails_closed() {
        let token = make_token("u-1", 3600, b"a_different_secret_entirely!!!!!!");
        let jar = jar_with(&[(ACCESS_COOKIE, &token)]);

        let outcome = accessor().current_session(&jar).await;
        assert!(!outcome.is_authenticated());
    }

    #[tokio::test]
    async fn test_refresh_collaborator_error_fails_closed() {
        // Offline auth client: the refresh attempt errors, which must read
        // as unauthenticated rather than propagate.
        let jar = jar_with(&[(REFRESH_COOKIE, "some-refresh-token")]);

        let outcome = accessor().current_session(&jar).await;
        assert!(!outcome.is_authenticated());
        assert!(outcome.refreshed.is_none());
    }

    #[tokio::test]
    async fn test_empty_secret_fails_closed() {
        let accessor = SessionAccessor::new(Vec::new(), AuthClient::new_mock());
        let token = make_token("u-1", 3600, SECRET);
        let jar = jar_with(&[(ACCESS_COOKIE, &token)]);

        let outcome = accessor.current_session(&jar).await;
        assert!(!outcome.is_authenticated());
    }
}
