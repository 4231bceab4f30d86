//! Credential checking against the user store.

use std::sync::OnceLock;

use crate::{
    db::DbPool,
    error::ApiError,
    models::user::User,
    services::{password, user_service},
};

/// Hash checked when the username is unknown, so a miss costs about as
/// much time as a wrong password.
fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| password::hash_password("dummy-password").unwrap_or_default())
}

/// Authenticate a username/password pair.
///
/// # Process
///
/// 1. Look up the user by exact username
/// 2. Verify the password against the stored hash
/// 3. Reject inactive accounts
/// 4. Stamp `last_login`
///
/// # Errors
///
/// - `LoginFailed`: unknown user, wrong password, unusable password or
///   inactive account (indistinguishable to the caller)
/// - `Database`: Database error occurred
pub async fn authenticate(pool: &DbPool, username: &str, password: &str) -> Result<User, ApiError> {
    let Some(user) = user_service::find_by_username(pool, username).await? else {
        let _ = password::verify_password(password, dummy_hash());
        tracing::info!(username, "Login failed: unknown user");
        return Err(ApiError::LoginFailed);
    };

    if !password::verify_password(password, &user.password) {
        tracing::info!(username, "Login failed: bad password");
        return Err(ApiError::LoginFailed);
    }

    if !user.is_active {
        tracing::info!(username, "Login failed: account inactive");
        return Err(ApiError::LoginFailed);
    }

    user_service::touch_last_login(pool, user.id).await?;

    Ok(user)
}
