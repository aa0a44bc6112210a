// SPDX-License-Identifier: MIT

//! Route guard middleware.
//!
//! Runs once per request, before any page logic: evaluate the session,
//! classify the path, resolve the redirect. Two invariants:
//!
//! 1. Refreshed session credentials are attached to the outgoing response
//!    on BOTH branches. Dropping them on a pass-through causes silent
//!    logout once the old access token expires.
//! 2. When the store is not configured the guard passes everything through
//!    untouched. The guard never hard-fails a request; only page content
//!    reports the setup problem.

use crate::routing::{classify, resolve, RedirectDecision};
use crate::session_cookies;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Coarse authentication gate for page routes.
///
/// `/admin` is classified Public on purpose: its handler performs the
/// identity-aware check so it can answer 401 vs 403 instead of redirecting.
pub async fn route_guard(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    if !state.config.store_configured() {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    let outcome = state.session.current_session(&jar).await;
    let decision = resolve(classify(&path), outcome.is_authenticated(), &path);

    let response = match decision {
        RedirectDecision::To(target) => {
            tracing::debug!(path = %path, target = %target, "Route guard redirect");
            Redirect::temporary(&target).into_response()
        }
        RedirectDecision::None => {
            if let Some(session) = outcome.session.clone() {
                request.extensions_mut().insert(session);
            }
            next.run(request).await
        }
    };

    match &outcome.refreshed {
        Some(tokens) => session_cookies::attach(response, &session_cookies::for_tokens(tokens)),
        None => response,
    }
}
