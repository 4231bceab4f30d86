//! Review web API: accounts, sessions and user directory.
//!
//! A JSON web API for a code review site. Clients log in with a username
//! and password, receive a session cookie, and present it on later
//! requests.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: SQLite with sqlx (async queries, embedded migrations)
//! - **Authentication**: Argon2 password hashes, SHA-256 hashed session keys
//! - **Format**: form-encoded requests, `{"stat": ...}` JSON responses
//!
//! # Routes
//!
//! | Method | Path | Access |
//! |---|---|---|
//! | POST | `/api/json/accounts/login/` | always |
//! | POST | `/api/json/accounts/logout/` | always |
//! | GET | `/api/` | login-gated |
//! | GET | `/api/info/` | login-gated |
//! | GET | `/api/session/` | login-gated |
//! | GET | `/api/users/` | login-gated |
//! | GET | `/api/users/{username}/` | login-gated |
//! | GET | `/health` | always |
//!
//! "Login-gated" routes are public unless `ANONYMOUS_ACCESS=false`.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;

use axum::{
    Router,
    extract::FromRef,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{config::Config, db::DbPool};

/// State shared with every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<Config> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

/// Build the HTTP router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Read resources, subject to the login-required gate
    let gated_routes = Router::new()
        .route("/api/", get(handlers::server_info::get_root))
        .route("/api/info/", get(handlers::server_info::get_info))
        .route("/api/session/", get(handlers::session::get_session))
        .route("/api/users/", get(handlers::users::list_users))
        .route("/api/users/{username}/", get(handlers::users::get_user))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_login,
        ));

    Router::new()
        // Public routes
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/json/accounts/login/",
            post(handlers::accounts::login),
        )
        .route(
            "/api/json/accounts/logout/",
            post(handlers::accounts::logout),
        )
        .merge(gated_routes)
        // Resolve the session cookie before any route runs
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
