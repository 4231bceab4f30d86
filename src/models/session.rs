//! Login session model.
//!
//! Sessions are identified by a random key handed to the client in a
//! cookie. Only the SHA-256 hash of that key is persisted.

use chrono::{DateTime, Utc};

/// Represents a session record from the database.
///
/// # Database Table
///
/// Maps to the `sessions` table with columns:
/// - `id`: Row identifier
/// - `key_hash`: SHA-256 hash of the session key (64 hex characters)
/// - `user_id`: The authenticated user
/// - `created_at`: When the session was established
/// - `expires_at`: After this instant the session is rejected
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub id: i64,

    /// SHA-256 hash of the session key
    ///
    /// When a request arrives with `rbsessionid=abc123`, we:
    /// 1. Hash "abc123" with SHA-256
    /// 2. Look up this hash in the database
    /// 3. If found and not expired, treat the request as authenticated
    pub key_hash: String,

    pub user_id: i64,

    pub created_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// A freshly created session together with the plaintext key.
///
/// The key exists only here and in the client's cookie.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub session: Session,
    pub key: String,
}
