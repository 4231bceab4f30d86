//! Data models representing database entities and API payloads.

/// Fixture records (database dump format)
pub mod fixture;
/// Resource hyperlinks
pub mod link;
/// `{"stat": "ok"}` envelope
pub mod response;
/// Login session model
pub mod session;
/// Registered user model
pub mod user;
