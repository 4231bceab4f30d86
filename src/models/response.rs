//! Success envelope shared by every API payload.

use serde::Serialize;
use serde_json::{Map, Value};

/// `{"stat": "ok", ...body}`
///
/// `body` must serialize as a map; its fields sit beside `stat`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub stat: &'static str,

    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(body: T) -> Self {
        Self { stat: "ok", body }
    }
}

impl ApiResponse<Map<String, Value>> {
    /// The bare `{"stat": "ok"}` body.
    pub fn empty() -> Self {
        Self::ok(Map::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_is_just_stat_ok() {
        assert_eq!(
            serde_json::to_value(ApiResponse::empty()).unwrap(),
            json!({"stat": "ok"})
        );
    }

    #[test]
    fn body_fields_sit_beside_stat() {
        #[derive(Serialize)]
        struct Count {
            count: i64,
        }

        assert_eq!(
            serde_json::to_value(ApiResponse::ok(Count { count: 3 })).unwrap(),
            json!({"stat": "ok", "count": 3})
        );
    }
}
