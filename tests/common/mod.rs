// SPDX-License-Identifier: MIT

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use promptfolio::config::Config;
use promptfolio::db::{ObjectStore, StoreDb};
use promptfolio::routes::create_router;
use promptfolio::services::auth::AuthTokens;
use promptfolio::services::{AuthClient, ProfileService, SessionAccessor};
use promptfolio::AppState;
use serde::Serialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Create a test app with offline mock collaborators and a configured
/// store (so the route guard is active).
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    build_app(Config::test_default())
}

/// Create a test app whose store is NOT configured: the guard passes
/// everything through and pages answer with setup payloads.
#[allow(dead_code)]
pub fn create_unconfigured_app() -> (axum::Router, Arc<AppState>) {
    let mut config = Config::test_default();
    config.store_url.clear();
    config.store_anon_key.clear();
    build_app(config)
}

/// Create a test app whose auth collaborator answers refresh requests
/// with a fresh, verifiable token bundle for `user_id`. Used to exercise
/// the guard's refreshed-cookie propagation.
#[allow(dead_code)]
pub fn create_refreshing_test_app(user_id: &str) -> (axum::Router, Arc<AppState>) {
    let tokens: AuthTokens = serde_json::from_value(serde_json::json!({
        "access_token": make_access_token(user_id, 3600),
        "refresh_token": "rt-rotated",
        "expires_in": 3600,
    }))
    .unwrap();
    build_app_with_auth(Config::test_default(), AuthClient::new_mock_with_refresh(tokens))
}

fn build_app(config: Config) -> (axum::Router, Arc<AppState>) {
    build_app_with_auth(config, AuthClient::new_mock())
}

fn build_app_with_auth(config: Config, auth: AuthClient) -> (axum::Router, Arc<AppState>) {
    let store = StoreDb::new_mock();
    let storage = ObjectStore::new_mock();
    let session = SessionAccessor::new(config.auth_jwt_secret.clone(), auth.clone());
    let profile = ProfileService::new(store.clone(), storage, auth.clone());

    let state = Arc::new(AppState {
        config,
        store,
        auth,
        session,
        profile,
    });

    (create_router(state.clone()), state)
}

/// Mint an access token the test config's secret verifies.
#[allow(dead_code)]
pub fn make_access_token(user_id: &str, expires_in_secs: i64) -> String {
    #[derive(Serialize)]
    struct Claims {
        sub: String,
        exp: usize,
        email: Option<String>,
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now + expires_in_secs) as usize,
        email: Some(format!("{}@example.com", user_id)),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&Config::test_default().auth_jwt_secret),
    )
    .unwrap()
}

/// Cookie header value carrying a session access token.
#[allow(dead_code)]
pub fn session_cookie_header(user_id: &str) -> String {
    format!("pf_access_token={}", make_access_token(user_id, 3600))
}
