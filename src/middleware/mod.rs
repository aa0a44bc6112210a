// SPDX-License-Identifier: MIT

//! Middleware modules (route guard, API session requirement, security headers).

pub mod guard;
pub mod require_session;
pub mod security;

pub use guard::route_guard;
pub use require_session::require_session;
