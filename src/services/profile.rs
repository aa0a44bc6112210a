// SPDX-License-Identifier: MIT

//! Profile data façade.
//!
//! `load_all` gathers the profile row and its three satellites with four
//! concurrent, independent reads. Row-absent normalizes to documented
//! defaults; any other store error aborts the aggregate as one failure.
//! Mutations are independent point operations and deliberately not
//! transactional with each other.

use crate::db::storage::AVATAR_EXTENSIONS;
use crate::db::{ObjectStore, StoreDb};
use crate::error::AppError;
use crate::models::{ConnectedAccount, NotificationSettings, ProfileData, UserProfile};
use crate::services::auth::AuthClient;
use crate::services::session::Session;

/// Maximum accepted avatar upload size.
const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

/// Profile aggregation and mutation service.
#[derive(Clone)]
pub struct ProfileService {
    store: StoreDb,
    storage: ObjectStore,
    auth: AuthClient,
}

/// Profile fields a user may change.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub avatar_url: Option<Option<String>>,
}

impl ProfileService {
    pub fn new(store: StoreDb, storage: ObjectStore, auth: AuthClient) -> Self {
        Self {
            store,
            storage,
            auth,
        }
    }

    /// Load the full profile aggregate with four concurrent reads.
    pub async fn load_all(&self, session: &Session) -> Result<ProfileData, AppError> {
        let token = &session.access_token;
        let user_id = &session.user_id;

        let (profile, accounts, settings, activity) = tokio::try_join!(
            self.store.get_profile(token, user_id),
            self.store.list_connected_accounts(token, user_id),
            self.store.get_notification_settings(token, user_id),
            self.store.get_user_activity(token, user_id),
        )?;

        Ok(ProfileData::assemble(
            user_id,
            session.email.as_deref(),
            profile,
            accounts,
            settings,
            activity,
        ))
    }

    /// Update profile fields, creating the row if it does not exist yet.
    pub async fn update_profile(
        &self,
        session: &Session,
        update: ProfileUpdate,
    ) -> Result<UserProfile, AppError> {
        let mut body = serde_json::json!({
            "id": session.user_id,
            "updated_at": chrono::Utc::now().to_rfc3339(),
        });
        if let Some(email) = &session.email {
            body["email"] = serde_json::json!(email);
        }
        if let Some(full_name) = update.full_name {
            body["full_name"] = serde_json::json!(full_name);
        }
        if let Some(avatar_url) = update.avatar_url {
            body["avatar_url"] = serde_json::json!(avatar_url);
        }

        self.store.upsert_profile(&session.access_token, &body).await
    }

    /// Toggle a provider link, updating the existing row or creating one.
    pub async fn set_connected_account(
        &self,
        session: &Session,
        provider: &str,
        connected: bool,
    ) -> Result<ConnectedAccount, AppError> {
        let token = &session.access_token;

        let existing = self
            .store
            .get_connected_account(token, &session.user_id, provider)
            .await?;

        match existing {
            Some(account) => self
                .store
                .update_connected_account(token, &account.id, connected)
                .await?
                .ok_or_else(|| {
                    AppError::Store(format!("connected account {} vanished mid-update", account.id))
                }),
            None => {
                self.store
                    .insert_connected_account(token, &session.user_id, provider, connected)
                    .await
            }
        }
    }

    /// Set the newsletter flag, creating the settings row on first write.
    pub async fn set_newsletter(
        &self,
        session: &Session,
        enabled: bool,
    ) -> Result<NotificationSettings, AppError> {
        self.store
            .upsert_notification_settings(&session.access_token, &session.user_id, enabled)
            .await
    }

    /// Change the account password via the auth collaborator.
    pub async fn update_password(
        &self,
        session: &Session,
        new_password: &str,
    ) -> Result<(), AppError> {
        self.auth
            .update_password(&session.access_token, new_password)
            .await
    }

    /// Delete the account: drop the profile row (satellites cascade in the
    /// store), then revoke the session. A sign-out failure after the row
    /// is gone is logged, not surfaced; the account is already deleted.
    pub async fn delete_account(&self, session: &Session) -> Result<(), AppError> {
        self.store
            .delete_profile(&session.access_token, &session.user_id)
            .await?;

        tracing::info!(user_id = %session.user_id, "Account deleted");

        if let Err(err) = self.auth.sign_out(&session.access_token).await {
            tracing::warn!(error = %err, "Sign-out after account deletion failed");
        }
        Ok(())
    }

    /// Upload a new avatar and persist its public URL on the profile.
    /// Returns the confirmed URL; the client's optimistic preview reverts
    /// on error.
    pub async fn upload_avatar(
        &self,
        session: &Session,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AppError> {
        validate_avatar(filename, content_type, bytes.len())?;
        let ext = avatar_extension(filename)?;

        let url = self
            .storage
            .upload_avatar(
                &session.access_token,
                &session.user_id,
                ext,
                content_type,
                bytes,
            )
            .await?;

        self.update_profile(
            session,
            ProfileUpdate {
                avatar_url: Some(Some(url.clone())),
                ..Default::default()
            },
        )
        .await?;

        Ok(url)
    }

    /// Remove the avatar object(s) and clear the profile reference.
    pub async fn remove_avatar(&self, session: &Session) -> Result<(), AppError> {
        self.storage
            .remove_avatar(&session.access_token, &session.user_id)
            .await?;

        self.update_profile(
            session,
            ProfileUpdate {
                avatar_url: Some(None),
                ..Default::default()
            },
        )
        .await?;

        Ok(())
    }
}

/// Reject avatars that are too large or not images.
fn validate_avatar(filename: &str, content_type: &str, size: usize) -> Result<(), AppError> {
    if size > MAX_AVATAR_BYTES {
        return Err(AppError::BadRequest(
            "Avatar must be smaller than 5MB".to_string(),
        ));
    }
    if !content_type.starts_with("image/") {
        return Err(AppError::BadRequest("Avatar must be an image".to_string()));
    }
    if filename.trim().is_empty() {
        return Err(AppError::BadRequest("Missing avatar filename".to_string()));
    }
    Ok(())
}

/// Canonical storage extension for an avatar filename.
///
/// Only the extensions [`AVATAR_EXTENSIONS`] probes on removal are
/// admitted (`jpeg` normalizes to `jpg`); anything else would leave an
/// object behind that removal can never find.
fn avatar_extension(filename: &str) -> Result<&'static str, AppError> {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .ok_or_else(|| AppError::BadRequest("Avatar filename has no extension".to_string()))?;
    let ext = if ext == "jpeg" { "jpg".to_string() } else { ext };

    AVATAR_EXTENSIONS
        .iter()
        .find(|&&candidate| candidate == ext)
        .copied()
        .ok_or_else(|| {
            AppError::BadRequest("Avatar must be a jpg, png, gif, or webp image".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avatar_validation_limits() {
        assert!(validate_avatar("a.png", "image/png", 1024).is_ok());
        assert!(validate_avatar("a.png", "image/png", MAX_AVATAR_BYTES + 1).is_err());
        assert!(validate_avatar("a.pdf", "application/pdf", 1024).is_err());
        assert!(validate_avatar("", "image/png", 1024).is_err());
    }

    #[test]
    fn test_avatar_extension_normalizes_jpeg() {
        assert_eq!(avatar_extension("photo.jpeg").unwrap(), "jpg");
        assert_eq!(avatar_extension("photo.JPG").unwrap(), "jpg");
        assert_eq!(avatar_extension("photo.webp").unwrap(), "webp");
    }

    #[test]
    fn test_avatar_extension_rejects_unremovable_extensions() {
        // Every accepted extension must be one removal probes for, or the
        // uploaded object is orphaned once the profile URL is cleared.
        assert!(avatar_extension("image.svg").is_err());
        assert!(avatar_extension("archive.tar.gz").is_err());
        assert!(avatar_extension("noext").is_err());
    }

    #[test]
    fn test_accepted_extensions_match_removal_probe_list() {
        for ext in AVATAR_EXTENSIONS {
            let filename = format!("avatar.{}", ext);
            assert_eq!(avatar_extension(&filename).unwrap(), *ext);
        }
    }
}
