// SPDX-License-Identifier: MIT

//! Promptfolio: backend for an AI-prompt marketplace.
//!
//! This crate owns the authentication-gated routing policy (one canonical
//! path classifier and redirect resolver shared by every entry point) and
//! the typed façades over the hosted auth, relational store, and object
//! storage collaborators.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod routing;
pub mod services;
pub mod session_cookies;

use config::Config;
use db::{ObjectStore, StoreDb};
use services::{AuthClient, ProfileService, SessionAccessor};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: StoreDb,
    pub auth: AuthClient,
    pub session: SessionAccessor,
    pub profile: ProfileService,
}

impl AppState {
    /// Wire up all collaborator clients from config.
    pub fn from_config(config: Config) -> Self {
        let store = StoreDb::new(&config);
        let storage = ObjectStore::new(&config);
        let auth = AuthClient::new(&config);
        let session = SessionAccessor::new(config.auth_jwt_secret.clone(), auth.clone());
        let profile = ProfileService::new(store.clone(), storage, auth.clone());

        Self {
            config,
            store,
            auth,
            session,
            profile,
        }
    }
}
