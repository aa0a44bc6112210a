// SPDX-License-Identifier: MIT

//! Catalog records: prompts, categories, and curated collections.

use serde::{Deserialize, Serialize};

/// Marketplace prompt row (`prompts` table).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// Example output image/link shown in the gallery grid.
    pub result_url: Option<String>,
    pub category_id: Option<String>,
    /// Creator's user id; owners always see their own prompts unlocked.
    #[serde(default)]
    pub author_id: Option<String>,
    /// Premium prompts require an unlock before the body is shown.
    #[serde(default)]
    pub premium: bool,
    /// The prompt text itself; withheld from locked responses.
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

impl Prompt {
    /// Strip the prompt body for viewers who have not unlocked it.
    pub fn redacted(mut self) -> Self {
        self.body = None;
        self
    }
}

/// Prompt category row (`categories` table).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// Curated landing-page collection row (`collections` table).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}
