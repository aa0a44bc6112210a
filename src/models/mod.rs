// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod profile;
pub mod prompt;

pub use profile::{
    ConnectedAccount, NotificationSettings, ProfileData, Role, SubscriptionStatus, UserActivity,
    UserProfile,
};
pub use prompt::{Category, Collection, Prompt};
