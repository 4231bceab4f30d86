//! Error types and HTTP error response handling.
//!
//! This module defines all API errors and how they are converted
//! into HTTP responses with the web API's `{"stat": "fail"}` envelope.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value, json};

/// Application-wide error type.
///
/// Each variant carries a numeric API error code that clients match on,
/// and maps to a specific HTTP status.
///
/// # Error Categories
///
/// - **Database / Internal Errors**: storage or hashing failures (code 1)
/// - **Resource Errors**: requested object not found (code 100)
/// - **Authentication Errors**: not logged in (103), bad credentials (104)
/// - **Validation Errors**: invalid form or query data (105)
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Database operation failed.
    ///
    /// This wraps any sqlx::Error using the `#[from]` attribute, which
    /// automatically implements `From<sqlx::Error> for ApiError`.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Any other server-side failure (password hashing, serialization).
    #[error("Internal error: {0}")]
    Internal(String),

    /// Requested object does not exist or is not visible.
    #[error("Object does not exist")]
    DoesNotExist,

    /// The resource requires an authenticated session.
    #[error("You are not logged in")]
    NotLoggedIn,

    /// Username/password pair did not match an active account.
    #[error("Login failed")]
    LoginFailed,

    /// Submitted form data failed validation.
    ///
    /// Pairs of (field name, message).
    #[error("One or more fields had errors")]
    InvalidFormData(Vec<(String, String)>),
}

impl ApiError {
    /// Numeric API error code reported in the `err.code` field.
    pub fn code(&self) -> u32 {
        match self {
            ApiError::Database(_) | ApiError::Internal(_) => 1,
            ApiError::DoesNotExist => 100,
            ApiError::NotLoggedIn => 103,
            ApiError::LoginFailed => 104,
            ApiError::InvalidFormData(_) => 105,
        }
    }

    /// HTTP status returned alongside the error body.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::DoesNotExist => StatusCode::NOT_FOUND,
            ApiError::InvalidFormData(_) => StatusCode::BAD_REQUEST,
            ApiError::NotLoggedIn | ApiError::LoginFailed => StatusCode::UNAUTHORIZED,
        }
    }
}

impl From<argon2::password_hash::Error> for ApiError {
    fn from(err: argon2::password_hash::Error) -> Self {
        ApiError::Internal(format!("password hashing failed: {}", err))
    }
}

/// Convert ApiError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "stat": "fail",
///   "err": {
///     "code": 104,
///     "msg": "Login failed"
///   }
/// }
/// ```
///
/// `InvalidFormData` adds a `fields` object mapping each field to its list
/// of messages.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let msg = match &self {
            ApiError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "An internal error occurred".to_string()
            }
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let mut body = json!({
            "stat": "fail",
            "err": {
                "code": code,
                "msg": msg,
            }
        });

        if let ApiError::InvalidFormData(errors) = self {
            let mut fields = Map::new();
            for (field, message) in errors {
                let entry = fields
                    .entry(field)
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(messages) = entry {
                    messages.push(Value::String(message));
                }
            }
            body["fields"] = Value::Object(fields);
        }

        (status, Json(body)).into_response()
    }
}
