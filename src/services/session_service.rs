//! Session service: issuing, resolving and destroying login sessions.
//!
//! # Key Handling
//!
//! Session keys are 32 random bytes rendered as 64 hex characters. The
//! plaintext key is returned once, to be placed in the client's cookie;
//! the database only ever sees its SHA-256 hash.

use chrono::{TimeDelta, Utc};
use sha2::{Digest, Sha256};

use crate::{
    db::DbPool,
    error::ApiError,
    models::{
        session::{IssuedSession, Session},
        user::User,
    },
    services::user_service,
};

/// Generate a cryptographically secure session key.
///
/// # Output
///
/// 64 hex characters (32 random bytes)
pub fn generate_key() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// SHA-256 of the session key, hex encoded.
pub fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Create a session for `user_id` that lives for `ttl_secs` seconds.
///
/// # Errors
///
/// - `Internal`: `ttl_secs` puts the expiry outside the representable range
/// - `Database`: Database error occurred
pub async fn create_session(
    pool: &DbPool,
    user_id: i64,
    ttl_secs: i64,
) -> Result<IssuedSession, ApiError> {
    let now = Utc::now();
    let expires_at = TimeDelta::try_seconds(ttl_secs)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| {
            ApiError::Internal(format!("Session lifetime {}s is out of range", ttl_secs))
        })?;
    let key = generate_key();

    let session = sqlx::query_as::<_, Session>(
        r#"
        INSERT INTO sessions (key_hash, user_id, created_at, expires_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, key_hash, user_id, created_at, expires_at
        "#,
    )
    .bind(hash_key(&key))
    .bind(user_id)
    .bind(now)
    .bind(expires_at)
    .fetch_one(pool)
    .await?;

    tracing::debug!(session_id = session.id, user_id, "Session created");

    Ok(IssuedSession { session, key })
}

/// Resolve a session key to its session and user.
///
/// # Returns
///
/// `None` when the key is unknown, the session expired, or the user has
/// been deactivated since logging in.
pub async fn resolve(pool: &DbPool, key: &str) -> Result<Option<(Session, User)>, ApiError> {
    let Some(session) = sqlx::query_as::<_, Session>(
        "SELECT id, key_hash, user_id, created_at, expires_at FROM sessions WHERE key_hash = ?",
    )
    .bind(hash_key(key))
    .fetch_optional(pool)
    .await?
    else {
        return Ok(None);
    };

    if session.is_expired_at(Utc::now()) {
        delete_session(pool, session.id).await?;
        return Ok(None);
    }

    let user = user_service::find_by_id(pool, session.user_id)
        .await?
        .filter(|user| user.is_active);

    Ok(user.map(|user| (session, user)))
}

pub async fn delete_session(pool: &DbPool, session_id: i64) -> Result<(), ApiError> {
    sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(session_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Delete every expired session.
///
/// # Returns
///
/// Number of sessions removed.
pub async fn purge_expired(pool: &DbPool) -> Result<u64, ApiError> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(Utc::now())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Periodically purge expired sessions until the process exits.
pub async fn run_purge_loop(pool: DbPool, interval_secs: u64) {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs.max(1)));

    loop {
        interval.tick().await;

        match purge_expired(&pool).await {
            Ok(0) => {}
            Ok(removed) => tracing::info!(removed, "Purged expired sessions"),
            Err(e) => tracing::error!("Failed to purge expired sessions: {:?}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, models::user::NewUser};

    async fn setup() -> (DbPool, User) {
        let pool = db::create_pool("sqlite::memory:").await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        let user = user_service::create_user(
            &pool,
            NewUser {
                username: "doc".to_string(),
                password: "pw".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        (pool, user)
    }

    #[test]
    fn keys_are_random_hex() {
        let a = generate_key();
        let b = generate_key();

        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
        assert_eq!(hash_key(&a), hash_key(&a));
        assert_ne!(hash_key(&a), a);
    }

    #[tokio::test]
    async fn resolves_issued_session() {
        let (pool, user) = setup().await;
        let issued = create_session(&pool, user.id, 60).await.unwrap();

        let (session, resolved) = resolve(&pool, &issued.key).await.unwrap().unwrap();
        assert_eq!(session.id, issued.session.id);
        assert_eq!(resolved.username, "doc");

        assert!(resolve(&pool, "not-a-key").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stores_only_key_hash() {
        let (pool, user) = setup().await;
        let issued = create_session(&pool, user.id, 60).await.unwrap();

        let stored: String = sqlx::query_scalar("SELECT key_hash FROM sessions WHERE id = ?")
            .bind(issued.session.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_ne!(stored, issued.key);
        assert_eq!(stored, hash_key(&issued.key));
    }

    #[tokio::test]
    async fn expired_sessions_are_rejected_and_purged() {
        let (pool, user) = setup().await;
        let expired = create_session(&pool, user.id, -10).await.unwrap();
        let live = create_session(&pool, user.id, 600).await.unwrap();

        assert!(resolve(&pool, &expired.key).await.unwrap().is_none());

        let stale = create_session(&pool, user.id, -10).await.unwrap();
        assert_eq!(purge_expired(&pool).await.unwrap(), 1);
        assert!(resolve(&pool, &stale.key).await.unwrap().is_none());
        assert!(resolve(&pool, &live.key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn deactivated_user_loses_session() {
        let (pool, user) = setup().await;
        let issued = create_session(&pool, user.id, 600).await.unwrap();

        user_service::set_active(&pool, user.id, false).await.unwrap();
        assert!(resolve(&pool, &issued.key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleted_session_no_longer_resolves() {
        let (pool, user) = setup().await;
        let issued = create_session(&pool, user.id, 600).await.unwrap();

        delete_session(&pool, issued.session.id).await.unwrap();
        assert!(resolve(&pool, &issued.key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn out_of_range_lifetime_is_an_error() {
        let (pool, user) = setup().await;

        let err = create_session(&pool, user.id, i64::MAX).await.unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
