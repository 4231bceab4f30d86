//! Business logic services.
//!
//! Services contain core logic separated from HTTP handlers.
//! They handle credential checks, session storage and fixture import.

pub mod auth_service;
pub mod fixture_service;
pub mod password;
pub mod session_service;
pub mod user_service;
