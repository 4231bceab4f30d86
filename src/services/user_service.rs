//! User store: lookups, listing and registration.

use chrono::Utc;

use crate::{
    db::DbPool,
    error::ApiError,
    models::user::{NewUser, User},
    services::password,
};

const USER_COLUMNS: &str = "id, username, first_name, last_name, email, password, is_active, is_staff, date_joined, last_login";

/// Filters for listing users.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Case-insensitive prefix the username must start with
    pub prefix: Option<String>,

    /// Also match the prefix against first and last names
    pub match_fullname: bool,
}

impl UserFilter {
    /// WHERE clause and the LIKE pattern to bind (once per `?`).
    fn where_clause(&self) -> (String, Vec<String>) {
        let mut clause = "WHERE is_active = 1".to_string();
        let mut binds = Vec::new();

        if let Some(prefix) = self.prefix.as_deref().filter(|p| !p.is_empty()) {
            let pattern = format!("{}%", escape_like(prefix));

            if self.match_fullname {
                clause.push_str(
                    " AND (username LIKE ? ESCAPE '\\' OR first_name LIKE ? ESCAPE '\\' OR last_name LIKE ? ESCAPE '\\')",
                );
                binds.extend(std::iter::repeat_n(pattern, 3));
            } else {
                clause.push_str(" AND username LIKE ? ESCAPE '\\'");
                binds.push(pattern);
            }
        }

        (clause, binds)
    }
}

/// Escape LIKE wildcards so user input only ever matches literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Fetch a user by exact username, active or not.
pub async fn find_by_username(pool: &DbPool, username: &str) -> Result<Option<User>, ApiError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE username = ?",
        USER_COLUMNS
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<User>, ApiError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE id = ?",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Fetch an active user by username.
///
/// Inactive accounts are reported as not existing.
pub async fn get_active_user(pool: &DbPool, username: &str) -> Result<User, ApiError> {
    find_by_username(pool, username)
        .await?
        .filter(|user| user.is_active)
        .ok_or(ApiError::DoesNotExist)
}

/// List active users matching `filter`, ordered by username (case-insensitively).
pub async fn list_users(
    pool: &DbPool,
    filter: &UserFilter,
    start: i64,
    max_results: i64,
) -> Result<Vec<User>, ApiError> {
    let (clause, binds) = filter.where_clause();
    let sql = format!(
        "SELECT {} FROM users {} ORDER BY username COLLATE NOCASE, username LIMIT ? OFFSET ?",
        USER_COLUMNS, clause
    );

    let mut query = sqlx::query_as::<_, User>(&sql);
    for bind in binds {
        query = query.bind(bind);
    }

    let users = query
        .bind(max_results)
        .bind(start)
        .fetch_all(pool)
        .await?;

    Ok(users)
}

/// Count active users matching `filter`.
pub async fn count_users(pool: &DbPool, filter: &UserFilter) -> Result<i64, ApiError> {
    let (clause, binds) = filter.where_clause();
    let sql = format!("SELECT COUNT(*) FROM users {}", clause);

    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    for bind in binds {
        query = query.bind(bind);
    }

    Ok(query.fetch_one(pool).await?)
}

/// All users, active or not, ordered by primary key.
pub async fn all_users(pool: &DbPool) -> Result<Vec<User>, ApiError> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users ORDER BY id",
        USER_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Register a new account with an Argon2-hashed password.
///
/// # Errors
///
/// - `InvalidFormData`: empty username or password, or username taken
/// - `Database`: Database error occurred
pub async fn create_user(pool: &DbPool, new_user: NewUser) -> Result<User, ApiError> {
    let mut errors = Vec::new();
    if new_user.username.trim().is_empty() {
        errors.push(("username".to_string(), "This field is required.".to_string()));
    }
    if new_user.password.is_empty() {
        errors.push(("password".to_string(), "This field is required.".to_string()));
    }
    if !errors.is_empty() {
        return Err(ApiError::InvalidFormData(errors));
    }

    if find_by_username(pool, &new_user.username).await?.is_some() {
        return Err(ApiError::InvalidFormData(vec![(
            "username".to_string(),
            "A user with that username already exists.".to_string(),
        )]));
    }

    let hashed = password::hash_password(&new_user.password)?;

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (username, first_name, last_name, email, password, is_active, is_staff, date_joined)
        VALUES (?, ?, ?, ?, ?, 1, ?, ?)
        RETURNING {}
        "#,
        USER_COLUMNS
    ))
    .bind(new_user.username.trim())
    .bind(&new_user.first_name)
    .bind(&new_user.last_name)
    .bind(&new_user.email)
    .bind(hashed)
    .bind(new_user.is_staff)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    tracing::info!(username = %user.username, id = user.id, "User created");

    Ok(user)
}

/// Flag an account active or inactive.
pub async fn set_active(pool: &DbPool, user_id: i64, active: bool) -> Result<(), ApiError> {
    let result = sqlx::query("UPDATE users SET is_active = ? WHERE id = ?")
        .bind(active)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::DoesNotExist);
    }

    Ok(())
}

/// Record a successful login.
pub async fn touch_last_login(pool: &DbPool, user_id: i64) -> Result<(), ApiError> {
    sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}
