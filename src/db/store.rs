// SPDX-License-Identifier: MIT

//! Hosted relational store client with typed operations.
//!
//! The store speaks a REST dialect: each table is addressed as
//! `{base}/rest/v1/{table}` with column filters in the query string.
//! Single-row reads return `Ok(None)` when the row is absent; that variant
//! is distinct from a transport or server error and never becomes an
//! `AppError`. User-scoped operations forward the caller's access token so
//! the store's own row-level rules apply.

use crate::config::Config;
use crate::db::tables;
use crate::error::AppError;
use crate::models::{
    Category, Collection, ConnectedAccount, NotificationSettings, Prompt, UserActivity,
    UserProfile,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Hosted store client.
#[derive(Clone)]
pub struct StoreDb {
    backend: Option<RestBackend>,
}

#[derive(Clone)]
struct RestBackend {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl StoreDb {
    /// Create a client from config. Yields an offline client when the
    /// store is not configured; callers degrade instead of crashing.
    pub fn new(config: &Config) -> Self {
        if !config.store_configured() {
            tracing::warn!("Store not configured; running with offline store client");
            return Self { backend: None };
        }

        Self {
            backend: Some(RestBackend {
                http: reqwest::Client::new(),
                base_url: config.store_url.clone(),
                anon_key: config.store_anon_key.clone(),
            }),
        }
    }

    /// Create an offline client for testing.
    ///
    /// All operations return an error if called.
    pub fn new_mock() -> Self {
        Self { backend: None }
    }

    /// Helper to get the backend or return an error if offline.
    fn get_backend(&self) -> Result<&RestBackend, AppError> {
        self.backend
            .as_ref()
            .ok_or_else(|| AppError::Store("Store not connected (offline mode)".to_string()))
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Get a user profile by auth subject id.
    pub async fn get_profile(
        &self,
        token: &str,
        user_id: &str,
    ) -> Result<Option<UserProfile>, AppError> {
        self.select_one(tables::USER_PROFILES, &[("id", eq(user_id))], Some(token))
            .await
    }

    /// Look up a profile by display name (contributor pages).
    pub async fn get_profile_by_name(&self, name: &str) -> Result<Option<UserProfile>, AppError> {
        self.select_one(tables::USER_PROFILES, &[("full_name", eq(name))], None)
            .await
    }

    /// Create or update a user profile, merging on the primary key.
    pub async fn upsert_profile(
        &self,
        token: &str,
        profile: &serde_json::Value,
    ) -> Result<UserProfile, AppError> {
        self.upsert(tables::USER_PROFILES, "id", profile, Some(token))
            .await
    }

    /// Delete a user profile row. Satellite rows cascade in the store.
    pub async fn delete_profile(&self, token: &str, user_id: &str) -> Result<(), AppError> {
        self.delete(tables::USER_PROFILES, &[("id", eq(user_id))], Some(token))
            .await
    }

    // ─── Connected Accounts ──────────────────────────────────────

    /// All linked accounts for a user, newest first.
    pub async fn list_connected_accounts(
        &self,
        token: &str,
        user_id: &str,
    ) -> Result<Vec<ConnectedAccount>, AppError> {
        self.select(
            tables::CONNECTED_ACCOUNTS,
            &[
                ("user_id", eq(user_id)),
                ("order", "created_at.desc".to_string()),
            ],
            Some(token),
        )
        .await
    }

    /// One provider's link row for a user, if it exists.
    pub async fn get_connected_account(
        &self,
        token: &str,
        user_id: &str,
        provider: &str,
    ) -> Result<Option<ConnectedAccount>, AppError> {
        self.select_one(
            tables::CONNECTED_ACCOUNTS,
            &[("user_id", eq(user_id)), ("provider", eq(provider))],
            Some(token),
        )
        .await
    }

    /// Flip an existing link row's connected flag.
    pub async fn update_connected_account(
        &self,
        token: &str,
        account_id: &str,
        connected: bool,
    ) -> Result<Option<ConnectedAccount>, AppError> {
        let body = serde_json::json!({
            "connected": connected,
            "updated_at": chrono::Utc::now().to_rfc3339(),
        });
        self.update(
            tables::CONNECTED_ACCOUNTS,
            &[("id", eq(account_id))],
            &body,
            Some(token),
        )
        .await
    }

    /// Create a link row for a provider not seen before.
    pub async fn insert_connected_account(
        &self,
        token: &str,
        user_id: &str,
        provider: &str,
        connected: bool,
    ) -> Result<ConnectedAccount, AppError> {
        let now = chrono::Utc::now().to_rfc3339();
        let body = serde_json::json!({
            "user_id": user_id,
            "provider": provider,
            "provider_id": "",
            "connected": connected,
            "created_at": now,
            "updated_at": now,
        });
        self.insert(tables::CONNECTED_ACCOUNTS, &body, Some(token))
            .await
    }

    // ─── Notification Settings ───────────────────────────────────

    /// Notification settings row for a user, if present.
    pub async fn get_notification_settings(
        &self,
        token: &str,
        user_id: &str,
    ) -> Result<Option<NotificationSettings>, AppError> {
        self.select_one(
            tables::NOTIFICATION_SETTINGS,
            &[("user_id", eq(user_id))],
            Some(token),
        )
        .await
    }

    /// Create or update the settings row, merging on user_id.
    pub async fn upsert_notification_settings(
        &self,
        token: &str,
        user_id: &str,
        newsletter_enabled: bool,
    ) -> Result<NotificationSettings, AppError> {
        let body = serde_json::json!({
            "user_id": user_id,
            "newsletter_enabled": newsletter_enabled,
            "updated_at": chrono::Utc::now().to_rfc3339(),
        });
        self.upsert(tables::NOTIFICATION_SETTINGS, "user_id", &body, Some(token))
            .await
    }

    // ─── Activity Counters ───────────────────────────────────────

    /// Activity counters row for a user, if present.
    pub async fn get_user_activity(
        &self,
        token: &str,
        user_id: &str,
    ) -> Result<Option<UserActivity>, AppError> {
        self.select_one(
            tables::USER_ACTIVITY,
            &[("user_id", eq(user_id))],
            Some(token),
        )
        .await
    }

    // ─── Catalog Operations ──────────────────────────────────────

    /// Newest prompts for the gallery/landing grids.
    pub async fn list_prompts(&self, limit: u32) -> Result<Vec<Prompt>, AppError> {
        self.select(
            tables::PROMPTS,
            &[
                ("order", "created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ],
            None,
        )
        .await
    }

    /// One prompt by id.
    pub async fn get_prompt(&self, prompt_id: &str) -> Result<Option<Prompt>, AppError> {
        self.select_one(tables::PROMPTS, &[("id", eq(prompt_id))], None)
            .await
    }

    /// Prompts created by one author, newest first.
    pub async fn list_prompts_by_author(&self, author_id: &str) -> Result<Vec<Prompt>, AppError> {
        self.select(
            tables::PROMPTS,
            &[
                ("author_id", eq(author_id)),
                ("order", "created_at.desc".to_string()),
            ],
            None,
        )
        .await
    }

    /// Case-insensitive title/description search.
    pub async fn search_prompts(&self, query: &str, limit: u32) -> Result<Vec<Prompt>, AppError> {
        let pattern = ilike_pattern(query);
        self.select(
            tables::PROMPTS,
            &[
                (
                    "or",
                    format!("(title.ilike.{pattern},description.ilike.{pattern})"),
                ),
                ("limit", limit.to_string()),
            ],
            None,
        )
        .await
    }

    /// All prompt categories.
    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        self.select(tables::CATEGORIES, &[("order", "name.asc".to_string())], None)
            .await
    }

    /// Curated collections for the landing page.
    pub async fn list_collections(&self, limit: u32) -> Result<Vec<Collection>, AppError> {
        self.select(
            tables::COLLECTIONS,
            &[("limit", limit.to_string())],
            None,
        )
        .await
    }

    // ─── Unlocks ─────────────────────────────────────────────────

    /// Whether a user has unlocked a premium prompt.
    pub async fn has_unlock(
        &self,
        token: &str,
        user_id: &str,
        prompt_id: &str,
    ) -> Result<bool, AppError> {
        let rows: Vec<serde_json::Value> = self
            .select(
                tables::UNLOCKS,
                &[
                    ("user_id", eq(user_id)),
                    ("prompt_id", eq(prompt_id)),
                    ("limit", "1".to_string()),
                ],
                Some(token),
            )
            .await?;
        Ok(!rows.is_empty())
    }

    // ─── Generic REST Helpers ────────────────────────────────────

    /// SELECT returning all matching rows.
    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
        token: Option<&str>,
    ) -> Result<Vec<T>, AppError> {
        let backend = self.get_backend()?;
        let response = backend
            .request(reqwest::Method::GET, table, filters, token)
            .send()
            .await
            .map_err(|e| AppError::Store(format!("{} select failed: {}", table, e)))?;

        backend.check_json(table, response).await
    }

    /// SELECT returning at most one row; absent rows are `Ok(None)`.
    async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
        token: Option<&str>,
    ) -> Result<Option<T>, AppError> {
        let mut filters = filters.to_vec();
        filters.push(("limit", "1".to_string()));
        let mut rows: Vec<T> = self.select(table, &filters, token).await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    /// INSERT one row, returning the stored representation.
    async fn insert<T: DeserializeOwned, B: Serialize>(
        &self,
        table: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T, AppError> {
        let backend = self.get_backend()?;
        let response = backend
            .request(reqwest::Method::POST, table, &[], token)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Store(format!("{} insert failed: {}", table, e)))?;

        let mut rows: Vec<T> = backend.check_json(table, response).await?;
        if rows.is_empty() {
            return Err(AppError::Store(format!("{} insert returned no row", table)));
        }
        Ok(rows.swap_remove(0))
    }

    /// INSERT with merge-on-conflict semantics keyed by `conflict_col`.
    async fn upsert<T: DeserializeOwned, B: Serialize>(
        &self,
        table: &str,
        conflict_col: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T, AppError> {
        let backend = self.get_backend()?;
        let response = backend
            .request(
                reqwest::Method::POST,
                table,
                &[("on_conflict", conflict_col.to_string())],
                token,
            )
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Store(format!("{} upsert failed: {}", table, e)))?;

        let mut rows: Vec<T> = backend.check_json(table, response).await?;
        if rows.is_empty() {
            return Err(AppError::Store(format!("{} upsert returned no row", table)));
        }
        Ok(rows.swap_remove(0))
    }

    /// UPDATE matching rows, returning the first updated row if any.
    async fn update<T: DeserializeOwned, B: Serialize>(
        &self,
        table: &str,
        filters: &[(&str, String)],
        body: &B,
        token: Option<&str>,
    ) -> Result<Option<T>, AppError> {
        let backend = self.get_backend()?;
        let response = backend
            .request(reqwest::Method::PATCH, table, filters, token)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Store(format!("{} update failed: {}", table, e)))?;

        let mut rows: Vec<T> = backend.check_json(table, response).await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    /// DELETE matching rows.
    async fn delete(
        &self,
        table: &str,
        filters: &[(&str, String)],
        token: Option<&str>,
    ) -> Result<(), AppError> {
        let backend = self.get_backend()?;
        let response = backend
            .request(reqwest::Method::DELETE, table, filters, token)
            .send()
            .await
            .map_err(|e| AppError::Store(format!("{} delete failed: {}", table, e)))?;

        backend.check_status(table, response).await?;
        Ok(())
    }
}

impl RestBackend {
    fn request(
        &self,
        method: reqwest::Method,
        table: &str,
        filters: &[(&str, String)],
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let url = format!("{}/rest/v1/{}", self.base_url, table);
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token.unwrap_or(&self.anon_key))
            .query(filters)
    }

    async fn check_status(
        &self,
        table: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Store(format!(
            "{} request failed with {}: {}",
            table,
            status,
            body.chars().take(200).collect::<String>()
        )))
    }

    async fn check_json<T: DeserializeOwned>(
        &self,
        table: &str,
        response: reqwest::Response,
    ) -> Result<Vec<T>, AppError> {
        let response = self.check_status(table, response).await?;
        response
            .json()
            .await
            .map_err(|e| AppError::Store(format!("{} returned undecodable body: {}", table, e)))
    }
}

/// Column equality filter in the store's query dialect.
fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

/// Quoted case-insensitive match pattern for a user-supplied search term.
///
/// The term is embedded inside an `or=(...)` filter, whose grammar reserves
/// commas and parentheses. Double-quoting the pattern makes those literal;
/// backslashes and quotes inside the term are escaped per the same rules.
fn ilike_pattern(query: &str) -> String {
    let escaped = query.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"*{}*\"", escaped)
}
