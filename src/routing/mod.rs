// SPDX-License-Identifier: MIT

//! Authentication-gated routing policy.
//!
//! One canonical path-policy table and one redirect resolver, shared by the
//! request-scoped guard middleware and the client re-check endpoint so the
//! two evaluations cannot drift.

pub mod policy;
pub mod resolver;

pub use policy::{classify, PathPolicy};
pub use resolver::{resolve, RedirectDecision};
