//! User resource HTTP handlers.
//!
//! - GET /api/users/ - List active users, optionally filtered
//! - GET /api/users/{username}/ - Get one active user

use std::{collections::HashMap, sync::Arc};

use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{
    config::Config,
    db::DbPool,
    error::ApiError,
    models::{
        link::{Link, Links},
        response::ApiResponse,
        user::UserResponse,
    },
    services::user_service::{self, UserFilter},
};

/// Page size when `max-results` is absent.
pub const DEFAULT_MAX_RESULTS: i64 = 25;

/// Upper bound on `max-results`.
pub const MAX_RESULTS_LIMIT: i64 = 200;

/// Parsed query of the user list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListQuery {
    pub filter_prefix: Option<String>,
    pub fullname: bool,
    pub start: i64,
    pub max_results: i64,
    pub counts_only: bool,
}

/// Interpret a query flag the way HTML forms send them.
fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl UserListQuery {
    /// Validate raw query parameters.
    ///
    /// # Errors
    ///
    /// `InvalidFormData` when `start` is not a non-negative integer or
    /// `max-results` is not a positive one.
    pub fn parse(params: &HashMap<String, String>) -> Result<Self, ApiError> {
        let mut errors = Vec::new();

        let mut number = |name: &str, default: i64, min: i64| match params.get(name) {
            None => default,
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(n) if n >= min => n,
                _ => {
                    errors.push((
                        name.to_string(),
                        format!("'{}' must be an integer of at least {}", raw, min),
                    ));
                    default
                }
            },
        };

        let start = number("start", 0, 0);
        let max_results = number("max-results", DEFAULT_MAX_RESULTS, 1).min(MAX_RESULTS_LIMIT);

        if !errors.is_empty() {
            return Err(ApiError::InvalidFormData(errors));
        }

        Ok(Self {
            filter_prefix: params.get("q").filter(|q| !q.is_empty()).cloned(),
            fullname: params.get("fullname").is_some_and(|v| is_truthy(v)),
            start,
            max_results,
            counts_only: params.get("counts-only").is_some_and(|v| is_truthy(v)),
        })
    }

    fn filter(&self) -> UserFilter {
        UserFilter {
            prefix: self.filter_prefix.clone(),
            // `fullname` only applies alongside `q`
            match_fullname: self.fullname && self.filter_prefix.is_some(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserListBody {
    pub users: Vec<UserResponse>,
    pub total_results: i64,
    pub links: Links,
}

#[derive(Debug, Serialize)]
pub struct CountBody {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct UserBody {
    pub user: UserResponse,
}

/// List active users.
///
/// # Endpoint
///
/// `GET /api/users/?q=bo&fullname=1&start=0&max-results=25`
///
/// # Query Parameters
///
/// - `q`: case-insensitive username prefix
/// - `fullname`: also match `q` against first/last names
/// - `start`, `max-results`: pagination (max-results capped at 200)
/// - `counts-only`: return `{"stat": "ok", "count": N}` instead of users
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "stat": "ok",
///   "users": [ ... ],
///   "total_results": 2,
///   "links": {"self": {...}, "next": {...}}
/// }
/// ```
pub async fn list_users(
    State(pool): State<DbPool>,
    State(config): State<Arc<Config>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let query = UserListQuery::parse(&params)?;
    let filter = query.filter();
    let total = user_service::count_users(&pool, &filter).await?;

    if query.counts_only {
        return Ok(Json(ApiResponse::ok(CountBody { count: total })).into_response());
    }

    let users = user_service::list_users(&pool, &filter, query.start, query.max_results).await?;

    let mut links = Links::new();
    links.insert("self".to_string(), Link::get(config.href("api/users/")));

    let next_start = query.start.saturating_add(query.max_results);
    if next_start < total {
        links.insert(
            "next".to_string(),
            Link::get(page_href(&config, &query, next_start)),
        );
    }
    if query.start > 0 {
        let prev_start = (query.start - query.max_results).max(0);
        links.insert(
            "prev".to_string(),
            Link::get(page_href(&config, &query, prev_start)),
        );
    }

    let body = UserListBody {
        users: users
            .into_iter()
            .map(|user| UserResponse::from_user(user, &config))
            .collect(),
        total_results: total,
        links,
    };

    Ok(Json(ApiResponse::ok(body)).into_response())
}

/// Link to another page of the list with the same filters.
fn page_href(config: &Config, query: &UserListQuery, start: i64) -> String {
    let mut href = format!(
        "{}?start={}&max-results={}",
        config.href("api/users/"),
        start,
        query.max_results
    );
    if let Some(q) = &query.filter_prefix {
        href.push_str("&q=");
        href.push_str(&urlencoding::encode(q));
        if query.fullname {
            href.push_str("&fullname=1");
        }
    }
    href
}

/// Get one active user.
///
/// # Endpoint
///
/// `GET /api/users/{username}/`
///
/// # Response
///
/// - **Success (200 OK)**: `{"stat": "ok", "user": {...}}`
/// - **Error (404)**: code 100, unknown or inactive user
pub async fn get_user(
    State(pool): State<DbPool>,
    State(config): State<Arc<Config>>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<UserBody>>, ApiError> {
    let user = user_service::get_active_user(&pool, &username).await?;

    Ok(Json(ApiResponse::ok(UserBody {
        user: UserResponse::from_user(user, &config),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_without_parameters() {
        let query = UserListQuery::parse(&HashMap::new()).unwrap();

        assert_eq!(
            query,
            UserListQuery {
                filter_prefix: None,
                fullname: false,
                start: 0,
                max_results: DEFAULT_MAX_RESULTS,
                counts_only: false,
            }
        );
    }

    #[test]
    fn caps_max_results_and_reads_flags() {
        let query = UserListQuery::parse(&params(&[
            ("max-results", "1000"),
            ("counts-only", "1"),
            ("fullname", "true"),
            ("q", "bo"),
        ]))
        .unwrap();

        assert_eq!(query.max_results, MAX_RESULTS_LIMIT);
        assert!(query.counts_only);
        assert!(query.filter().match_fullname);
    }

    #[test]
    fn fullname_is_ignored_without_q() {
        let query = UserListQuery::parse(&params(&[("fullname", "1"), ("q", "")])).unwrap();

        assert!(query.filter_prefix.is_none());
        assert!(!query.filter().match_fullname);
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = UserListQuery::parse(&params(&[("start", "-1"), ("max-results", "lots")]))
            .unwrap_err();

        match err {
            ApiError::InvalidFormData(errors) => {
                let fields: Vec<&str> = errors.iter().map(|(f, _)| f.as_str()).collect();
                assert_eq!(fields, vec!["start", "max-results"]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn rejects_empty_pages() {
        let err = UserListQuery::parse(&params(&[("max-results", "0")])).unwrap_err();

        match err {
            ApiError::InvalidFormData(errors) => assert_eq!(errors[0].0, "max-results"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn page_links_keep_filters() {
        let config = Config::new("sqlite::memory:");
        let query = UserListQuery::parse(&params(&[("q", "a b"), ("fullname", "1")])).unwrap();

        assert_eq!(
            page_href(&config, &query, 25),
            "http://localhost:3000/api/users/?start=25&max-results=25&q=a%20b&fullname=1"
        );
    }
}
