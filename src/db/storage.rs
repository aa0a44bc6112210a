// SPDX-License-Identifier: MIT

//! Object storage client for avatar images.
//!
//! Avatars live in the `avatars` bucket at `{user_id}/avatar.{ext}` and are
//! served through the store's public object endpoint.

use crate::config::Config;
use crate::error::AppError;

const AVATAR_BUCKET: &str = "avatars";

/// Canonical avatar extensions. Upload validation admits exactly these, so
/// removal can probe the same list and never orphan an object.
pub const AVATAR_EXTENSIONS: &[&str] = &["jpg", "png", "gif", "webp"];

/// Hosted object storage client.
#[derive(Clone)]
pub struct ObjectStore {
    backend: Option<StorageBackend>,
}

#[derive(Clone)]
struct StorageBackend {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl ObjectStore {
    pub fn new(config: &Config) -> Self {
        if !config.store_configured() {
            return Self { backend: None };
        }
        Self {
            backend: Some(StorageBackend {
                http: reqwest::Client::new(),
                base_url: config.store_url.clone(),
                anon_key: config.store_anon_key.clone(),
            }),
        }
    }

    /// Create an offline client for testing.
    pub fn new_mock() -> Self {
        Self { backend: None }
    }

    fn get_backend(&self) -> Result<&StorageBackend, AppError> {
        self.backend
            .as_ref()
            .ok_or_else(|| AppError::Storage("Object store not connected (offline mode)".to_string()))
    }

    /// Upload an avatar, replacing any existing object at the same path.
    /// Returns the public URL of the stored object.
    pub async fn upload_avatar(
        &self,
        token: &str,
        user_id: &str,
        ext: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AppError> {
        let backend = self.get_backend()?;
        let path = avatar_path(user_id, ext);
        let url = format!("{}/storage/v1/object/{}", backend.base_url, path);

        let response = backend
            .http
            .post(&url)
            .header("apikey", &backend.anon_key)
            .bearer_auth(token)
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("avatar upload failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!(
                "avatar upload rejected with {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        Ok(self.public_url(&path)?)
    }

    /// Remove a user's avatar objects. Missing objects are not an error;
    /// the upload extension is unknown here so every canonical candidate
    /// is tried.
    pub async fn remove_avatar(&self, token: &str, user_id: &str) -> Result<(), AppError> {
        let backend = self.get_backend()?;

        for ext in AVATAR_EXTENSIONS {
            let path = avatar_path(user_id, ext);
            let url = format!("{}/storage/v1/object/{}", backend.base_url, path);

            let response = backend
                .http
                .delete(&url)
                .header("apikey", &backend.anon_key)
                .bearer_auth(token)
                .send()
                .await
                .map_err(|e| AppError::Storage(format!("avatar removal failed: {}", e)))?;

            let status = response.status();
            if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
                tracing::warn!(user_id, %status, ext, "Unexpected status removing avatar object");
            }
        }

        Ok(())
    }

    /// Public URL for an object path within the avatar bucket.
    fn public_url(&self, path: &str) -> Result<String, AppError> {
        let backend = self.get_backend()?;
        Ok(format!(
            "{}/storage/v1/object/public/{}",
            backend.base_url, path
        ))
    }
}

fn avatar_path(user_id: &str, ext: &str) -> String {
    format!(
        "{}/{}/avatar.{}",
        AVATAR_BUCKET,
        urlencoding::encode(user_id),
        ext
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avatar_path_encodes_user_id() {
        assert_eq!(avatar_path("u-1", "png"), "avatars/u-1/avatar.png");
        assert_eq!(avatar_path("a b", "jpg"), "avatars/a%20b/avatar.jpg");
    }

    #[test]
    fn test_offline_store_errors_on_use() {
        let store = ObjectStore::new_mock();
        assert!(store.public_url("avatars/u/avatar.png").is_err());
    }
}
