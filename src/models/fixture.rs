//! Fixture records: serialized snapshots of database rows used to seed a
//! test environment.
//!
//! A fixture file is a JSON array of entries:
//!
//! ```json
//! [
//!   {
//!     "model": "auth.user",
//!     "pk": 1,
//!     "fields": {
//!       "username": "admin",
//!       "password": "sha256$a1b2$5f4d...",
//!       "is_active": true,
//!       "date_joined": "2009-02-01 12:00:00"
//!     }
//!   }
//! ]
//! ```

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::user::User;

/// Model label of user records.
pub const USER_MODEL: &str = "auth.user";

/// Load order that satisfies foreign-key dependencies between models.
///
/// Models not listed here sort after all listed ones.
pub const MODEL_ORDER: &[&str] = &[
    "auth.group",
    "auth.user",
    "auth.permission",
    "contenttypes.contenttype",
    "sites.site",
    "sessions.session",
    "scmtools.tool",
    "scmtools.repository",
    "diffviewer.diffsethistory",
    "diffviewer.diffset",
    "diffviewer.filediff",
    "reviews.group",
    "reviews.screenshot",
    "reviews.screenshotcomment",
    "reviews.comment",
    "reviews.reviewrequest",
    "reviews.reviewrequestdraft",
    "reviews.review",
    "accounts.profile",
];

/// Position of a model in [`MODEL_ORDER`].
pub fn model_rank(model: &str) -> usize {
    MODEL_ORDER
        .iter()
        .position(|m| *m == model)
        .unwrap_or(MODEL_ORDER.len())
}

/// One serialized database row.
///
/// `pk` is kept as raw JSON: most models use integer keys but sessions
/// are keyed by string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureEntry {
    pub model: String,
    pub pk: serde_json::Value,
    pub fields: serde_json::Value,
}

/// Field set of an `auth.user` fixture record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserFields {
    pub username: String,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    #[serde(default)]
    pub email: String,

    /// Already-hashed password; plaintext is never accepted
    #[serde(default = "unusable_password")]
    pub password: String,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub is_staff: bool,

    #[serde(default)]
    pub date_joined: Option<String>,

    #[serde(default)]
    pub last_login: Option<String>,
}

fn unusable_password() -> String {
    "!".to_string()
}

fn default_true() -> bool {
    true
}

impl From<&User> for FixtureEntry {
    fn from(user: &User) -> Self {
        let fields = UserFields {
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
            is_active: user.is_active,
            is_staff: user.is_staff,
            date_joined: Some(format_fixture_date(user.date_joined)),
            last_login: user.last_login.map(format_fixture_date),
        };

        Self {
            model: USER_MODEL.to_string(),
            pk: user.id.into(),
            // UserFields only holds strings and bools
            fields: serde_json::to_value(fields).unwrap_or_default(),
        }
    }
}

/// Parse a fixture timestamp.
///
/// Accepts RFC 3339 (`2009-02-01T12:00:00Z`) or the naive
/// `YYYY-MM-DD HH:MM:SS[.ffffff]` form, which is taken as UTC.
pub fn parse_fixture_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn format_fixture_date(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M:%S").to_string()
}
