//! Session resource: who is the calling client logged in as.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    middleware::auth::CurrentSession,
    models::{
        link::{Link, Links},
        response::ApiResponse,
        user::{UserResponse, user_api_path},
    },
};

#[derive(Debug, Default, Deserialize)]
pub struct SessionQuery {
    /// Comma separated list of links to inline (`user`)
    #[serde(default)]
    pub expand: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionData {
    pub authenticated: bool,

    pub links: Links,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
}

#[derive(Debug, Serialize)]
pub struct SessionBody {
    pub session: SessionData,
}

/// Describe the caller's session.
///
/// # Endpoint
///
/// `GET /api/session/`
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "stat": "ok",
///   "session": {
///     "authenticated": true,
///     "links": {
///       "self": {"method": "GET", "href": "http://localhost:3000/api/session/"},
///       "user": {"method": "GET", "href": "http://localhost:3000/api/users/admin/", "title": "admin"}
///     }
///   }
/// }
/// ```
///
/// With `?expand=user` the user is inlined as `session.user` and the
/// `user` link is dropped.
pub async fn get_session(
    State(config): State<Arc<Config>>,
    Extension(current): Extension<CurrentSession>,
    Query(query): Query<SessionQuery>,
) -> Json<ApiResponse<SessionBody>> {
    let expand_user = query
        .expand
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .any(|item| item.trim() == "user");

    let mut links = Links::new();
    links.insert("self".to_string(), Link::get(config.href("api/session/")));

    let authenticated = current.is_authenticated();
    let mut user = None;
    if let Some(auth) = current.0 {
        if expand_user {
            user = Some(UserResponse::from_user(auth.user, &config));
        } else {
            links.insert(
                "user".to_string(),
                Link::get(config.href(&user_api_path(&auth.user.username)))
                    .with_title(auth.user.username.clone()),
            );
        }
    }

    Json(ApiResponse::ok(SessionBody {
        session: SessionData {
            authenticated,
            links,
            user,
        },
    }))
}
