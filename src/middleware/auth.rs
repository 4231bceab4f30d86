//! Session cookie authentication middleware.
//!
//! This middleware runs on every request to:
//! 1. Extract the session key from the session cookie
//! 2. Hash it and resolve it to a live session and active user
//! 3. Inject the (possibly anonymous) session context into the request
//!
//! A second middleware, [`require_login`], rejects anonymous requests with
//! code 103 when the site disables anonymous access.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::COOKIE},
    middleware::Next,
    response::Response,
};

use crate::{
    AppState,
    config::Config,
    error::ApiError,
    models::user::User,
    services::session_service,
};

/// Authentication context of a request that carried a valid session.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Row id of the session the cookie resolved to
    pub session_id: i64,

    /// The logged-in user
    pub user: User,
}

/// Session state attached to every request by [`session_middleware`].
///
/// `None` means the request is anonymous.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession(pub Option<AuthContext>);

impl CurrentSession {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref().map(|auth| &auth.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}

/// Extract a cookie value by name from the `Cookie` header.
pub fn extract_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|cookie| {
            let (name, value) = cookie.trim().split_once('=')?;

            if name == cookie_name && !value.is_empty() {
                Some(value.to_string())
            } else {
                None
            }
        })
}

/// Session middleware function.
///
/// # Flow
///
/// 1. Read the configured session cookie from the request
/// 2. Look up the hashed key; expired sessions and inactive users count as absent
/// 3. Insert `CurrentSession` into the request extensions
///
/// An unknown or stale cookie never fails the request; it is simply anonymous.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let current = match extract_cookie(request.headers(), &state.config.session_cookie_name) {
        Some(key) => session_service::resolve(&state.pool, &key)
            .await?
            .map(|(session, user)| AuthContext {
                session_id: session.id,
                user,
            }),
        None => None,
    };

    request.extensions_mut().insert(CurrentSession(current));

    Ok(next.run(request).await)
}

/// Reject anonymous requests when anonymous access is disabled.
///
/// Must be layered inside [`session_middleware`].
pub async fn require_login(
    State(config): State<Arc<Config>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !config.anonymous_access {
        let authenticated = request
            .extensions()
            .get::<CurrentSession>()
            .is_some_and(CurrentSession::is_authenticated);

        if !authenticated {
            return Err(ApiError::NotLoggedIn);
        }
    }

    Ok(next.run(request).await)
}
