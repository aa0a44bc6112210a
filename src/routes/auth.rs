// SPDX-License-Identifier: MIT

//! Auth endpoints: credential exchange with the hosted auth collaborator
//! plus the client re-check endpoint backing the post-mount re-guard.

use crate::error::{AppError, Result};
use crate::routing::{classify, resolve, RedirectDecision};
use crate::services::Session;
use crate::session_cookies;
use crate::AppState;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/logout", post(logout))
        .route("/api/session", get(session_check))
}

#[derive(Deserialize, Validate)]
pub struct CredentialsPayload {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Serialize)]
struct AuthResponse {
    user: Option<AuthUserSummary>,
    /// False when signup requires email confirmation before a session exists.
    session_established: bool,
}

#[derive(Serialize)]
struct AuthUserSummary {
    id: String,
    email: Option<String>,
}

fn validation_error(err: validator::ValidationErrors) -> AppError {
    AppError::BadRequest(err.to_string())
}

/// Sign in with email + password; establishes the session cookie pair.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CredentialsPayload>,
) -> Result<Response> {
    payload.validate().map_err(validation_error)?;
    if !state.config.store_configured() {
        return Err(AppError::NotConfigured);
    }

    let tokens = state.auth.sign_in(&payload.email, &payload.password).await?;
    tracing::info!(email = %payload.email, "User signed in");

    let user = tokens.user.as_ref().map(|u| AuthUserSummary {
        id: u.id.clone(),
        email: u.email.clone(),
    });

    let response = Json(AuthResponse {
        user,
        session_established: true,
    })
    .into_response();

    Ok(session_cookies::attach(
        response,
        &session_cookies::for_tokens(&tokens),
    ))
}

/// Register a new account. Sets cookies only when the collaborator issues
/// tokens immediately (no email confirmation step).
async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CredentialsPayload>,
) -> Result<Response> {
    payload.validate().map_err(validation_error)?;
    if !state.config.store_configured() {
        return Err(AppError::NotConfigured);
    }

    let tokens = state.auth.sign_up(&payload.email, &payload.password).await?;
    tracing::info!(email = %payload.email, "User signed up");

    match tokens {
        Some(tokens) => {
            let user = tokens.user.as_ref().map(|u| AuthUserSummary {
                id: u.id.clone(),
                email: u.email.clone(),
            });
            let response = Json(AuthResponse {
                user,
                session_established: true,
            })
            .into_response();
            Ok(session_cookies::attach(
                response,
                &session_cookies::for_tokens(&tokens),
            ))
        }
        None => Ok(Json(AuthResponse {
            user: None,
            session_established: false,
        })
        .into_response()),
    }
}

/// Sign out: revoke server-side when possible, always clear cookies.
///
/// Reuses the session the route guard already evaluated; re-running the
/// accessor here could spend the refresh token a second time.
async fn logout(
    State(state): State<Arc<AppState>>,
    session: Option<Extension<Session>>,
    jar: CookieJar,
) -> Response {
    let session = match session {
        Some(Extension(session)) => Some(session),
        None => state.session.current_session(&jar).await.session,
    };
    if let Some(session) = &session {
        if let Err(err) = state.auth.sign_out(&session.access_token).await {
            tracing::warn!(error = %err, "Server-side sign-out failed; clearing cookies anyway");
        }
    }

    let response = Json(serde_json::json!({ "signed_out": true })).into_response();
    session_cookies::attach(response, &session_cookies::cleared())
}

// ─── Client Re-Guard ─────────────────────────────────────────

#[derive(Deserialize)]
pub struct SessionCheckQuery {
    /// Path the client is currently mounted on.
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Serialize)]
struct SessionCheckResponse {
    authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<AuthUserSummary>,
    /// Where the client must navigate if its rendered state has drifted
    /// from the actual session state. Absent means stay put.
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect: Option<String>,
}

/// Post-mount session re-check.
///
/// Shares the guard's pure classify/resolve pair and reuses the session
/// the guard already injected, so a drifted client converges in at most
/// one redirect. Evaluating the accessor again here would spend the
/// refresh token a second time and could read a just-refreshed session as
/// absent; the accessor only runs when no guard evaluation happened.
async fn session_check(
    State(state): State<Arc<AppState>>,
    session: Option<Extension<Session>>,
    jar: CookieJar,
    Query(params): Query<SessionCheckQuery>,
) -> Response {
    // Refreshed cookies from the guard's evaluation are already on this
    // response; only a fallback evaluation has its own pair to attach.
    let (session, refreshed) = match session {
        Some(Extension(session)) => (Some(session), None),
        None => {
            let outcome = state.session.current_session(&jar).await;
            (outcome.session, outcome.refreshed)
        }
    };
    let authenticated = session.is_some();

    let redirect = params.path.as_deref().and_then(|path| {
        match resolve(classify(path), authenticated, path) {
            RedirectDecision::To(target) => Some(target),
            RedirectDecision::None => None,
        }
    });

    let user = session.as_ref().map(|s: &Session| AuthUserSummary {
        id: s.user_id.clone(),
        email: s.email.clone(),
    });

    let response = Json(SessionCheckResponse {
        authenticated,
        user,
        redirect,
    })
    .into_response();

    match &refreshed {
        Some(tokens) => session_cookies::attach(response, &session_cookies::for_tokens(tokens)),
        None => response,
    }
}
