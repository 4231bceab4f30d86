//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (form body, query string, path params)
//! 2. Calls into the services
//! 3. Returns a `{"stat": ...}` JSON envelope

/// Login and logout endpoints
pub mod accounts;
/// Service health endpoint
pub mod health;
/// Server info and API root
pub mod server_info;
/// Session resource
pub mod session;
/// User resource
pub mod users;
