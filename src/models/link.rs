//! Hyperlinks embedded in API payloads.
//!
//! Every resource carries a `links` object so clients can walk the API
//! instead of hard-coding paths.

use std::collections::BTreeMap;

use serde::Serialize;

/// Link name to link, serialized in a stable (sorted) order.
pub type Links = BTreeMap<String, Link>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub method: &'static str,
    pub href: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Link {
    pub fn get(href: String) -> Self {
        Self {
            method: "GET",
            href,
            title: None,
        }
    }

    pub fn post(href: String) -> Self {
        Self {
            method: "POST",
            href,
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}
