//! User data models and API response types.
//!
//! This module defines:
//! - `User`: Database entity representing a registered account
//! - `NewUser`: Values needed to register an account
//! - `UserResponse`: Serialized form returned by the user resource

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Config;
use crate::models::link::{Link, Links};

/// Represents a user record from the database.
///
/// # Database Table
///
/// Maps to the `users` table. The `password` column holds either an
/// Argon2 PHC string, a legacy `sha256$salt$hex` digest, or an unusable
/// marker starting with `!`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Primary key (kept stable across fixture dumps and loads)
    pub id: i64,

    /// Unique login name
    pub username: String,

    pub first_name: String,

    pub last_name: String,

    pub email: String,

    /// Stored password hash; never serialized to clients
    pub password: String,

    /// Inactive accounts cannot log in and are hidden from the user resource
    pub is_active: bool,

    pub is_staff: bool,

    /// Timestamp when the account was registered
    pub date_joined: DateTime<Utc>,

    /// Timestamp of the most recent successful login
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// First and last name joined by a space, trimmed.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Values needed to register a new account.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_staff: bool,
}

/// Response body for the user resource.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": 1,
///   "username": "admin",
///   "first_name": "Jane",
///   "last_name": "Admin",
///   "fullname": "Jane Admin",
///   "email": "admin@example.com",
///   "url": "/users/admin/",
///   "links": {
///     "self": {"method": "GET", "href": "http://localhost:3000/api/users/admin/"}
///   }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub fullname: String,
    pub email: String,

    /// Path of the user's page on the site
    pub url: String,

    pub links: Links,
}

impl UserResponse {
    /// Serialize a user, building absolute links from the site URL.
    ///
    /// Drops the internal `password`, `is_staff` and login timestamps.
    pub fn from_user(user: User, config: &Config) -> Self {
        let mut links = Links::new();
        links.insert(
            "self".to_string(),
            Link::get(config.href(&user_api_path(&user.username))),
        );

        Self {
            id: user.id,
            fullname: user.full_name(),
            url: format!("/users/{}/", urlencoding::encode(&user.username)),
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            links,
        }
    }
}

/// API path of a single user, relative to the site root.
///
/// The username is percent-encoded so it always forms a single path segment.
pub fn user_api_path(username: &str) -> String {
    format!("api/users/{}/", urlencoding::encode(username))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str) -> User {
        User {
            id: 1,
            username: username.to_string(),
            first_name: "Grumpy".to_string(),
            last_name: String::new(),
            email: String::new(),
            password: "!".to_string(),
            is_active: true,
            is_staff: false,
            date_joined: Utc::now(),
            last_login: None,
        }
    }

    #[test]
    fn full_name_is_trimmed() {
        assert_eq!(user("grumpy").full_name(), "Grumpy");
    }

    #[test]
    fn links_encode_username() {
        let config = Config::new("sqlite::memory:");
        let response = UserResponse::from_user(user("joe #1"), &config);

        assert_eq!(response.username, "joe #1");
        assert_eq!(response.url, "/users/joe%20%231/");
        assert_eq!(
            response.links["self"].href,
            "http://localhost:3000/api/users/joe%20%231/"
        );
    }
}
