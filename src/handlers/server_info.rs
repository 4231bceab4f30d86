//! Server information and the API root resource.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

use crate::{
    config::Config,
    models::{
        link::{Link, Links},
        response::ApiResponse,
    },
};

pub const PRODUCT_NAME: &str = "Review Board";

#[derive(Debug, Serialize)]
pub struct ProductInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub package_version: &'static str,
    pub is_release: bool,
}

#[derive(Debug, Serialize)]
pub struct AdminInfo {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SiteInfo {
    pub url: String,
    pub administrators: Vec<AdminInfo>,
}

#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub product: ProductInfo,
    pub site: SiteInfo,
}

#[derive(Debug, Serialize)]
pub struct InfoBody {
    pub info: ServerInfo,
}

/// Pre-release versions carry a suffix such as `0.2.0-beta.1`.
fn is_release(version: &str) -> bool {
    !version.contains('-')
}

/// Product and site information.
///
/// # Endpoint
///
/// `GET /api/info/`
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "stat": "ok",
///   "info": {
///     "product": {"name": "Review Board", "version": "0.1.0", "package_version": "0.1.0", "is_release": true},
///     "site": {"url": "http://localhost:3000/", "administrators": [{"name": "Jane", "email": "jane@example.com"}]}
///   }
/// }
/// ```
pub async fn get_info(State(config): State<Arc<Config>>) -> Json<ApiResponse<InfoBody>> {
    let version = env!("CARGO_PKG_VERSION");

    Json(ApiResponse::ok(InfoBody {
        info: ServerInfo {
            product: ProductInfo {
                name: PRODUCT_NAME,
                version,
                package_version: version,
                is_release: is_release(version),
            },
            site: SiteInfo {
                url: config.site_url.clone(),
                administrators: config
                    .administrators()
                    .into_iter()
                    .map(|admin| AdminInfo {
                        name: admin.name,
                        email: admin.email,
                    })
                    .collect(),
            },
        },
    }))
}

#[derive(Debug, Serialize)]
pub struct RootBody {
    pub links: Links,
    pub uri_templates: Links,
}

/// Entry point linking to every top-level resource.
///
/// # Endpoint
///
/// `GET /api/`
///
/// Clients should walk from here instead of hard-coding paths.
pub async fn get_root(State(config): State<Arc<Config>>) -> Json<ApiResponse<RootBody>> {
    let mut links = Links::new();
    links.insert("self".to_string(), Link::get(config.href("api/")));
    links.insert("info".to_string(), Link::get(config.href("api/info/")));
    links.insert("session".to_string(), Link::get(config.href("api/session/")));
    links.insert("users".to_string(), Link::get(config.href("api/users/")));
    links.insert(
        "login".to_string(),
        Link::post(config.href("api/json/accounts/login/")),
    );
    links.insert(
        "logout".to_string(),
        Link::post(config.href("api/json/accounts/logout/")),
    );

    let mut uri_templates = Links::new();
    uri_templates.insert(
        "user".to_string(),
        Link::get(config.href("api/users/{username}/")),
    );

    Json(ApiResponse::ok(RootBody {
        links,
        uri_templates,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_detection() {
        assert!(is_release("1.0.0"));
        assert!(!is_release("1.1.0-rc.1"));
    }
}
