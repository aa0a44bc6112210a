// SPDX-License-Identifier: MIT

//! Session requirement for API routes.
//!
//! API callers get a 401 body instead of the page-route redirect. Reuses
//! the session the route guard already evaluated when present.

use crate::error::AppError;
use crate::services::Session;
use crate::session_cookies;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Middleware that requires an authenticated session.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if request.extensions().get::<Session>().is_some() {
        return Ok(next.run(request).await);
    }

    let outcome = state.session.current_session(&jar).await;
    let Some(session) = outcome.session.clone() else {
        return Err(AppError::Unauthorized);
    };

    request.extensions_mut().insert(session);
    let response = next.run(request).await;

    Ok(match &outcome.refreshed {
        Some(tokens) => session_cookies::attach(response, &session_cookies::for_tokens(tokens)),
        None => response,
    })
}
