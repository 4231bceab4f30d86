//! HTTP middleware components.
//!
//! Middleware are functions that run before route handlers.
//! They can:
//! - Resolve the session cookie into a logged-in user
//! - Short-circuit requests (reject anonymous access)

/// Session cookie authentication middleware
pub mod auth;
