// SPDX-License-Identifier: MIT

//! Hosted store layer (REST tables + object storage).

pub mod storage;
pub mod store;

pub use storage::ObjectStore;
pub use store::StoreDb;

/// Table names as constants.
pub mod tables {
    pub const USER_PROFILES: &str = "user_profiles";
    pub const CONNECTED_ACCOUNTS: &str = "connected_accounts";
    pub const NOTIFICATION_SETTINGS: &str = "notification_settings";
    pub const USER_ACTIVITY: &str = "user_activity";
    pub const PROMPTS: &str = "prompts";
    pub const CATEGORIES: &str = "categories";
    pub const COLLECTIONS: &str = "collections";
    /// Purchased/unlocked premium prompts (keyed by user_id + prompt_id)
    pub const UNLOCKS: &str = "unlocks";
}
