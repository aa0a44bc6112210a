// SPDX-License-Identifier: MIT

//! Profile records and their satellites, as stored in the hosted store.
//!
//! Every satellite is independently nullable in the store. A missing row is
//! normalized to a documented default at the façade boundary, never
//! surfaced as an error.

use serde::{Deserialize, Serialize};

/// Subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Free,
    Premium,
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// User profile row (`user_profiles` table, keyed by the auth subject id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub subscription_status: SubscriptionStatus,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl UserProfile {
    /// Synthesized profile for a user whose backing row does not exist yet.
    pub fn default_for(user_id: &str, email: Option<&str>) -> Self {
        Self {
            id: user_id.to_string(),
            email: email.map(str::to_string),
            full_name: None,
            avatar_url: None,
            subscription_status: SubscriptionStatus::Free,
            role: Role::User,
            created_at: String::new(),
            updated_at: None,
        }
    }
}

/// Linked third-party account row (`connected_accounts` table).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectedAccount {
    pub id: String,
    pub user_id: String,
    pub provider: String,
    #[serde(default)]
    pub provider_id: String,
    pub connected: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Notification preferences row (`notification_settings` table).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    pub newsletter_enabled: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl NotificationSettings {
    /// Default: newsletter on. Matches the row the store would create on
    /// first explicit settings write.
    pub fn default_for(user_id: &str) -> Self {
        Self {
            id: String::new(),
            user_id: user_id.to_string(),
            newsletter_enabled: true,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }
}

/// Activity counters row (`user_activity` table).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserActivity {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub prompts_created: u32,
    #[serde(default)]
    pub prompts_used: u32,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl UserActivity {
    /// Zeroed counters for a user with no recorded activity.
    pub fn default_for(user_id: &str) -> Self {
        Self {
            id: String::new(),
            user_id: user_id.to_string(),
            prompts_created: 0,
            prompts_used: 0,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }
}

/// Aggregate the profile page renders from.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileData {
    pub profile: UserProfile,
    pub connected_accounts: Vec<ConnectedAccount>,
    pub notification_settings: NotificationSettings,
    pub user_activity: UserActivity,
}

impl ProfileData {
    /// Normalize four independent (and independently nullable) reads into
    /// the aggregate, applying row-absent defaults.
    pub fn assemble(
        user_id: &str,
        session_email: Option<&str>,
        profile: Option<UserProfile>,
        accounts: Vec<ConnectedAccount>,
        settings: Option<NotificationSettings>,
        activity: Option<UserActivity>,
    ) -> Self {
        Self {
            profile: profile.unwrap_or_else(|| UserProfile::default_for(user_id, session_email)),
            connected_accounts: accounts,
            notification_settings: settings
                .unwrap_or_else(|| NotificationSettings::default_for(user_id)),
            user_activity: activity.unwrap_or_else(|| UserActivity::default_for(user_id)),
        }
    }
}
