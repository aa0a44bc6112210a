// SPDX-License-Identifier: MIT

//! External collaborator clients and domain services.

pub mod auth;
pub mod profile;
pub mod session;

pub use auth::AuthClient;
pub use profile::ProfileService;
pub use session::{Session, SessionAccessor, SessionOutcome};
