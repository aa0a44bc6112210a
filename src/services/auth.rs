// SPDX-License-Identifier: MIT

//! Hosted auth collaborator client.
//!
//! Wraps the collaborator's credential endpoints: password grant, signup,
//! refresh, sign-out, and password update. Session verification itself is
//! local (the access token is an HS256 JWT) and lives in
//! [`crate::services::session`].

use crate::config::Config;
use crate::error::AppError;
use serde::Deserialize;

/// Token bundle issued by the auth collaborator.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub user: Option<AuthUserInfo>,
}

/// Identity subset echoed back by credential endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUserInfo {
    pub id: String,
    pub email: Option<String>,
}

/// Hosted auth API client.
#[derive(Clone)]
pub struct AuthClient {
    backend: Option<AuthBackend>,
    /// Canned refresh response for offline clients; exercises the refresh
    /// flow in tests without a live collaborator.
    mock_refresh: Option<AuthTokens>,
}

#[derive(Clone)]
struct AuthBackend {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl AuthClient {
    pub fn new(config: &Config) -> Self {
        if !config.store_configured() {
            return Self {
                backend: None,
                mock_refresh: None,
            };
        }
        Self {
            backend: Some(AuthBackend {
                http: reqwest::Client::new(),
                base_url: config.store_url.clone(),
                anon_key: config.store_anon_key.clone(),
            }),
            mock_refresh: None,
        }
    }

    /// Create an offline client for testing. All operations error.
    pub fn new_mock() -> Self {
        Self {
            backend: None,
            mock_refresh: None,
        }
    }

    /// Create an offline client whose refresh endpoint succeeds with a
    /// canned token bundle. Everything else still errors.
    pub fn new_mock_with_refresh(tokens: AuthTokens) -> Self {
        Self {
            backend: None,
            mock_refresh: Some(tokens),
        }
    }

    fn get_backend(&self) -> Result<&AuthBackend, AppError> {
        self.backend
            .as_ref()
            .ok_or_else(|| AppError::AuthApi("Auth service not connected (offline mode)".to_string()))
    }

    /// Password-grant sign-in.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthTokens, AppError> {
        let backend = self.get_backend()?;
        let body = serde_json::json!({ "email": email, "password": password });

        let response = backend
            .post("/auth/v1/token?grant_type=password", None)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::AuthApi(format!("sign-in request failed: {}", e)))?;

        backend.check_json("sign-in", response).await
    }

    /// Register a new account. The collaborator may return a full token
    /// bundle or require email confirmation first (no tokens).
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Option<AuthTokens>, AppError> {
        let backend = self.get_backend()?;
        let body = serde_json::json!({ "email": email, "password": password });

        let response = backend
            .post("/auth/v1/signup", None)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::AuthApi(format!("signup request failed: {}", e)))?;

        let value: serde_json::Value = backend.check_json("signup", response).await?;
        if value.get("access_token").is_some() {
            let tokens = serde_json::from_value(value)
                .map_err(|e| AppError::AuthApi(format!("signup returned undecodable body: {}", e)))?;
            Ok(Some(tokens))
        } else {
            Ok(None)
        }
    }

    /// Exchange a refresh token for a fresh token pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthTokens, AppError> {
        if let Some(tokens) = &self.mock_refresh {
            return Ok(tokens.clone());
        }
        let backend = self.get_backend()?;
        let body = serde_json::json!({ "refresh_token": refresh_token });

        let response = backend
            .post("/auth/v1/token?grant_type=refresh_token", None)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::AuthApi(format!("token refresh failed: {}", e)))?;

        backend.check_json("refresh", response).await
    }

    /// Revoke the session server-side.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        let backend = self.get_backend()?;

        let response = backend
            .post("/auth/v1/logout", Some(access_token))
            .send()
            .await
            .map_err(|e| AppError::AuthApi(format!("sign-out request failed: {}", e)))?;

        backend.check_status("sign-out", response).await?;
        Ok(())
    }

    /// Change the authenticated user's password.
    pub async fn update_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let backend = self.get_backend()?;
        let body = serde_json::json!({ "password": new_password });

        let response = backend
            .http
            .put(format!("{}/auth/v1/user", backend.base_url))
            .header("apikey", &backend.anon_key)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::AuthApi(format!("password update failed: {}", e)))?;

        backend.check_status("password update", response).await?;
        Ok(())
    }
}

impl AuthBackend {
    fn post(&self, path: &str, token: Option<&str>) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}{}", self.base_url, path))
            .header("apikey", &self.anon_key)
            .bearer_auth(token.unwrap_or(&self.anon_key))
    }

    async fn check_status(
        &self,
        op: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        // Credential endpoints return 400-class statuses for bad logins;
        // surface those as Unauthorized rather than a gateway error.
        if status == reqwest::StatusCode::BAD_REQUEST
            || status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::UNPROCESSABLE_ENTITY
        {
            tracing::debug!(op, %status, "Auth collaborator rejected credentials");
            return Err(AppError::Unauthorized);
        }
        Err(AppError::AuthApi(format!(
            "{} failed with {}: {}",
            op,
            status,
            body.chars().take(200).collect::<String>()
        )))
    }

    async fn check_json<T: serde::de::DeserializeOwned>(
        &self,
        op: &str,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        let response = self.check_status(op, response).await?;
        response
            .json()
            .await
            .map_err(|e| AppError::AuthApi(format!("{} returned undecodable body: {}", op, e)))
    }
}
