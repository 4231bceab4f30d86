//! Account login/logout HTTP handlers.
//!
//! This module implements the JSON account endpoints:
//! - POST /api/json/accounts/login/ - Authenticate and start a session
//! - POST /api/json/accounts/logout/ - End the current session

use axum::{
    Extension, Form, Json,
    extract::{State, rejection::FormRejection},
    http::header::SET_COOKIE,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    AppState,
    config::Config,
    error::ApiError,
    middleware::auth::CurrentSession,
    models::response::ApiResponse,
    services::{auth_service, session_service},
};

/// Form body of the login call.
///
/// Both fields are optional at the parsing level so that a missing field
/// reports a failed login rather than a malformed request.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Build the `Set-Cookie` value carrying a session key.
pub fn session_cookie(config: &Config, key: &str) -> String {
    build_cookie(config, key, config.session_ttl_secs.max(0))
}

/// Build a `Set-Cookie` value that deletes the session cookie.
pub fn expired_session_cookie(config: &Config) -> String {
    build_cookie(config, "", 0)
}

fn build_cookie(config: &Config, value: &str, max_age: i64) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        config.session_cookie_name, value, max_age
    );
    if config.session_cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Log in.
///
/// # Endpoint
///
/// `POST /api/json/accounts/login/`
///
/// # Request Body (`application/x-www-form-urlencoded`)
///
/// `username=admin&password=admin`
///
/// # Response
///
/// - **Success (200 OK)**: `{"stat": "ok"}` plus a `Set-Cookie` header
///   carrying the session key
/// - **Error (401)**: code 104, login failed
///
/// # Session Rotation
///
/// If the request already carried a valid session, that session is
/// destroyed and a fresh key is issued.
pub async fn login(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!("Unreadable login form: {}", rejection);
            LoginForm::default()
        }
    };

    let (Some(username), Some(password)) = (form.username, form.password) else {
        return Err(ApiError::LoginFailed);
    };

    let user = auth_service::authenticate(&state.pool, &username, &password).await?;

    if let Some(previous) = current.0 {
        session_service::delete_session(&state.pool, previous.session_id).await?;
    }

    let issued =
        session_service::create_session(&state.pool, user.id, state.config.session_ttl_secs)
            .await?;

    tracing::info!(username = %user.username, "User logged in");

    Ok((
        [(SET_COOKIE, session_cookie(&state.config, &issued.key))],
        Json(ApiResponse::empty()),
    ))
}

/// Log out.
///
/// # Endpoint
///
/// `POST /api/json/accounts/logout/`
///
/// # Response
///
/// Always `{"stat": "ok"}` with a `Set-Cookie` header clearing the
/// session cookie, whether or not a session was active.
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(auth) = current.0 {
        session_service::delete_session(&state.pool, auth.session_id).await?;
        tracing::info!(username = %auth.user.username, "User logged out");
    }

    Ok((
        [(SET_COOKIE, expired_session_cookie(&state.config))],
        Json(ApiResponse::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_attributes() {
        let mut config = Config::new("sqlite::memory:");
        config.session_ttl_secs = 60;

        assert_eq!(
            session_cookie(&config, "abc"),
            "rbsessionid=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=60"
        );

        config.session_cookie_secure = true;
        assert!(session_cookie(&config, "abc").ends_with("; Secure"));
    }

    #[test]
    fn expired_cookie_clears_value() {
        let config = Config::new("sqlite::memory:");

        assert_eq!(
            expired_session_cookie(&config),
            "rbsessionid=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
        );
    }
}
