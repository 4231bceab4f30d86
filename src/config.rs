//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): SQLite connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `SESSION_COOKIE_NAME` (optional): defaults to `rbsessionid`
/// - `SESSION_TTL_SECS` (optional): session lifetime, defaults to two weeks
/// - `SESSION_COOKIE_SECURE` (optional): mark the cookie `Secure`, defaults to false
/// - `SESSION_PURGE_INTERVAL_SECS` (optional): expired session sweep period, defaults to 3600
/// - `ANONYMOUS_ACCESS` (optional): allow read resources without login, defaults to true
/// - `SITE_URL` (optional): absolute base URL used when building links
/// - `ADMINS` (optional): comma separated `Name <email>` entries
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_session_cookie_name")]
    pub session_cookie_name: String,

    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: i64,

    #[serde(default)]
    pub session_cookie_secure: bool,

    #[serde(default = "default_session_purge_interval_secs")]
    pub session_purge_interval_secs: u64,

    #[serde(default = "default_anonymous_access")]
    pub anonymous_access: bool,

    #[serde(default = "default_site_url")]
    pub site_url: String,

    #[serde(default)]
    pub admins: Vec<String>,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_session_cookie_name() -> String {
    "rbsessionid".to_string()
}

/// Two weeks, in seconds.
fn default_session_ttl_secs() -> i64 {
    60 * 60 * 24 * 14
}

fn default_session_purge_interval_secs() -> u64 {
    3600
}

fn default_anonymous_access() -> bool {
    true
}

fn default_site_url() -> String {
    "http://localhost:3000/".to_string()
}

/// A site administrator parsed from the `ADMINS` setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admin {
    pub name: String,
    pub email: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Field names are automatically converted: database_url -> DATABASE_URL
        envy::from_env::<Config>()
    }

    /// Configuration with every optional setting at its default.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            server_port: default_port(),
            session_cookie_name: default_session_cookie_name(),
            session_ttl_secs: default_session_ttl_secs(),
            session_cookie_secure: false,
            session_purge_interval_secs: default_session_purge_interval_secs(),
            anonymous_access: default_anonymous_access(),
            site_url: default_site_url(),
            admins: Vec::new(),
        }
    }

    /// Build an absolute link below the site root.
    ///
    /// `path` is relative to the root, e.g. `api/session/`.
    pub fn href(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.site_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Parse `ADMINS` entries of the form `Name <email>`.
    ///
    /// Entries without angle brackets are treated as a bare e-mail address.
    pub fn administrators(&self) -> Vec<Admin> {
        self.admins
            .iter()
            .map(|entry| entry.trim())
            .filter(|entry| !entry.is_empty())
            .map(|entry| match (entry.find('<'), entry.rfind('>')) {
                (Some(open), Some(close)) if open < close => Admin {
                    name: entry[..open].trim().to_string(),
                    email: entry[open + 1..close].trim().to_string(),
                },
                _ => Admin {
                    name: entry.to_string(),
                    email: entry.to_string(),
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn href_joins_without_double_slashes() {
        let mut config = Config::new("sqlite::memory:");
        config.site_url = "https://reviews.example.com/".to_string();

        assert_eq!(
            config.href("/api/session/"),
            "https://reviews.example.com/api/session/"
        );
        assert_eq!(
            config.href("api/users/"),
            "https://reviews.example.com/api/users/"
        );
    }

    #[test]
    fn parses_administrators() {
        let mut config = Config::new("sqlite::memory:");
        config.admins = vec![
            "Jane Admin <jane@example.com>".to_string(),
            " ops@example.com ".to_string(),
            "".to_string(),
        ];

        assert_eq!(
            config.administrators(),
            vec![
                Admin {
                    name: "Jane Admin".to_string(),
                    email: "jane@example.com".to_string(),
                },
                Admin {
                    name: "ops@example.com".to_string(),
                    email: "ops@example.com".to_string(),
                },
            ]
        );
    }
}
