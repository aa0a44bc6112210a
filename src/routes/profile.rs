// SPDX-License-Identifier: MIT

//! Profile API: aggregate read plus independent point mutations.
//!
//! All routes here sit behind the require_session middleware; handlers
//! take the session from request extensions.

use crate::error::{AppError, Result};
use crate::models::{ConnectedAccount, NotificationSettings, ProfileData, UserProfile};
use crate::services::profile::ProfileUpdate;
use crate::services::Session;
use crate::session_cookies;
use crate::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/profile",
            get(get_profile).patch(update_profile).delete(delete_account),
        )
        .route("/api/profile/accounts", post(set_connected_account))
        .route("/api/profile/notifications", post(set_notifications))
        .route("/api/profile/password", post(change_password))
        .route(
            "/api/profile/avatar",
            post(upload_avatar).delete(remove_avatar),
        )
}

fn validation_error(err: validator::ValidationErrors) -> AppError {
    AppError::BadRequest(err.to_string())
}

/// Full profile aggregate (four concurrent reads, row-absent defaults).
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<ProfileData>> {
    let data = state.profile.load_all(&session).await?;
    Ok(Json(data))
}

#[derive(Deserialize, Validate)]
pub struct UpdateProfilePayload {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub full_name: Option<String>,
}

/// Update display fields on the profile row.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<Json<UserProfile>> {
    payload.validate().map_err(validation_error)?;

    let profile = state
        .profile
        .update_profile(
            &session,
            ProfileUpdate {
                full_name: payload.full_name,
                avatar_url: None,
            },
        )
        .await?;
    Ok(Json(profile))
}

#[derive(Deserialize, Validate)]
pub struct ConnectedAccountPayload {
    #[validate(length(min = 1, max = 50))]
    pub provider: String,
    pub connected: bool,
}

/// Toggle a third-party account link.
async fn set_connected_account(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(payload): Json<ConnectedAccountPayload>,
) -> Result<Json<ConnectedAccount>> {
    payload.validate().map_err(validation_error)?;

    let account = state
        .profile
        .set_connected_account(&session, &payload.provider, payload.connected)
        .await?;
    Ok(Json(account))
}

#[derive(Deserialize)]
pub struct NotificationsPayload {
    pub newsletter_enabled: bool,
}

/// Toggle the newsletter flag.
async fn set_notifications(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(payload): Json<NotificationsPayload>,
) -> Result<Json<NotificationSettings>> {
    let settings = state
        .profile
        .set_newsletter(&session, payload.newsletter_enabled)
        .await?;
    Ok(Json(settings))
}

#[derive(Deserialize, Validate)]
pub struct ChangePasswordPayload {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

#[derive(Serialize)]
struct OkResponse {
    success: bool,
}

/// Change the account password via the auth collaborator.
async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<Json<OkResponse>> {
    payload.validate().map_err(validation_error)?;

    state
        .profile
        .update_password(&session, &payload.new_password)
        .await?;
    Ok(Json(OkResponse { success: true }))
}

/// Delete the account and clear the session cookies.
async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Response> {
    state.profile.delete_account(&session).await?;

    let response = Json(OkResponse { success: true }).into_response();
    Ok(session_cookies::attach(
        response,
        &session_cookies::cleared(),
    ))
}

// ─── Avatar ──────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct AvatarUploadPayload {
    #[validate(length(min = 1, max = 255))]
    pub filename: String,
    #[validate(length(min = 1))]
    pub content_type: String,
    /// Image bytes, base64-encoded.
    pub data: String,
}

#[derive(Serialize)]
struct AvatarResponse {
    avatar_url: String,
}

/// Upload a new avatar; responds with the confirmed public URL.
async fn upload_avatar(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(payload): Json<AvatarUploadPayload>,
) -> Result<Json<AvatarResponse>> {
    payload.validate().map_err(validation_error)?;

    let bytes = BASE64
        .decode(payload.data.as_bytes())
        .map_err(|_| AppError::BadRequest("Avatar data is not valid base64".to_string()))?;

    let avatar_url = state
        .profile
        .upload_avatar(&session, &payload.filename, &payload.content_type, bytes)
        .await?;
    Ok(Json(AvatarResponse { avatar_url }))
}

/// Remove the avatar and clear its profile reference.
async fn remove_avatar(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<OkResponse>> {
    state.profile.remove_avatar(&session).await?;
    Ok(Json(OkResponse { success: true }))
}
