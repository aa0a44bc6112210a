// SPDX-License-Identifier: MIT

//! Application configuration loaded from environment variables.
//!
//! The hosted store endpoint and key may legitimately be absent or still
//! hold scaffold placeholder values. That state is detectable via
//! [`Config::store_configured`] and must degrade page content, never crash
//! startup or the route guard.

use std::env;

/// Values that project scaffolding ships as placeholders. Treated the same
/// as an unset variable.
const PLACEHOLDER_URLS: &[&str] = &[
    "https://your-project.example.com",
    "https://placeholder.example.com",
];
const PLACEHOLDER_KEYS: &[&str] = &["your-anon-key", "placeholder-key"];

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Hosted store base URL (REST, auth, and object storage live under it)
    pub store_url: String,
    /// Publishable API key for the hosted store
    pub store_anon_key: String,
    /// HS256 secret the auth collaborator signs access tokens with.
    /// Empty when unset; session verification then always fails closed.
    pub auth_jwt_secret: Vec<u8>,
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", raw))?,
            Err(_) => 8080,
        };

        Ok(Self {
            store_url: env::var("STORE_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_default(),
            store_anon_key: env::var("STORE_ANON_KEY")
                .map(|v| v.trim().to_string())
                .unwrap_or_default(),
            auth_jwt_secret: env::var("AUTH_JWT_SECRET")
                .map(|v| v.into_bytes())
                .unwrap_or_default(),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port,
        })
    }

    /// Whether the hosted store collaborator is usable.
    ///
    /// False when the endpoint or key is missing or still a placeholder.
    /// The route guard passes everything through in that state and
    /// data-bearing pages report a setup message instead of content.
    pub fn store_configured(&self) -> bool {
        !self.store_url.is_empty()
            && !self.store_anon_key.is_empty()
            && !PLACEHOLDER_URLS.contains(&self.store_url.as_str())
            && !PLACEHOLDER_KEYS.contains(&self.store_anon_key.as_str())
    }

    /// Config for tests: configured store pointing at a known-fake host,
    /// with a fixed JWT secret so tests can mint session tokens.
    pub fn test_default() -> Self {
        Self {
            store_url: "http://store.test".to_string(),
            store_anon_key: "test-anon-key".to_string(),
            auth_jwt_secret: b"test_jwt_secret_32_bytes_minimum!".to_vec(),
            frontend_url: "http://localhost:3000".to_string(),
            port: 8080,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_values_read_as_unconfigured() {
        let mut config = Config::test_default();
        assert!(config.store_configured());

        config.store_url = "https://your-project.example.com".to_string();
        assert!(!config.store_configured());

        config = Config::test_default();
        config.store_anon_key = "placeholder-key".to_string();
        assert!(!config.store_configured());

        config = Config::test_default();
        config.store_url.clear();
        assert!(!config.store_configured());
    }

    #[test]
    fn test_config_from_env_defaults() {
        env::remove_var("STORE_URL");
        env::remove_var("STORE_ANON_KEY");
        env::remove_var("PORT");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.port, 8080);
        assert!(!config.store_configured());
    }
}
