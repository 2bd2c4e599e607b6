//! Destination response normalization.
//!
//! Every destination body becomes one of three shapes: parsed JSON passed
//! through as-is, a wrapper around raw non-JSON text, or an empty-body
//! marker. Parse failure is an ordinary outcome, not an error.

use axum::http::StatusCode;
use serde_json::{Map, Value};

use crate::config::model::RawMarker;

pub const EMPTY_BODY_MESSAGE: &str = "Empty response from destination";

#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedBody {
    Json(Value),
    Raw {
        text: String,
        status: u16,
        parse_error: String,
    },
    Empty {
        status: u16,
    },
}

#[must_use]
pub fn normalize(raw: &str, status: StatusCode) -> NormalizedBody {
    if raw.trim().is_empty() {
        return NormalizedBody::Empty {
            status: status.as_u16(),
        };
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => NormalizedBody::Json(value),
        Err(e) => NormalizedBody::Raw {
            text: raw.to_string(),
            status: status.as_u16(),
            parse_error: e.to_string(),
        },
    }
}

impl NormalizedBody {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Json(_) => "json",
            Self::Raw { .. } => "raw",
            Self::Empty { .. } => "empty",
        }
    }

    /// Render as the top-level object of the final response.
    ///
    /// JSON objects are returned member-for-member; any other JSON value is
    /// placed under `data`. `marker`, when configured, is added only to the
    /// wrapped shapes.
    #[must_use]
    pub fn into_object(self, marker: Option<&RawMarker>) -> Map<String, Value> {
        let mut object = match self {
            Self::Json(Value::Object(map)) => return map,
            Self::Json(other) => {
                let mut map = Map::with_capacity(1);
                map.insert("data".into(), other);
                return map;
            }
            Self::Raw {
                text,
                status,
                parse_error,
            } => {
                let mut map = Map::with_capacity(4);
                map.insert("raw".into(), Value::String(text));
                map.insert("httpStatus".into(), status.into());
                map.insert("parseError".into(), Value::String(parse_error));
                map
            }
            Self::Empty { status } => {
                let mut map = Map::with_capacity(4);
                map.insert("raw".into(), Value::String(String::new()));
                map.insert("httpStatus".into(), status.into());
                map.insert("message".into(), EMPTY_BODY_MESSAGE.into());
                map
            }
        };
        if let Some(marker) = marker {
            object.insert(marker.field.clone(), marker.value.clone());
        }
        object
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_is_passed_through() {
        let body = normalize(r#"{"accepted": true, "id": 7}"#, StatusCode::OK);
        assert_eq!(body, NormalizedBody::Json(json!({"accepted": true, "id": 7})));
        assert_eq!(
            Value::Object(body.into_object(None)),
            json!({"accepted": true, "id": 7})
        );
    }

    #[test]
    fn whitespace_only_is_empty() {
        let body = normalize("  \n\t", StatusCode::ACCEPTED);
        assert_eq!(body, NormalizedBody::Empty { status: 202 });
        let object = body.into_object(None);
        assert_eq!(object["raw"], "");
        assert_eq!(object["httpStatus"], 202);
        assert_eq!(object["message"], EMPTY_BODY_MESSAGE);
    }

    #[test]
    fn text_is_wrapped_with_parse_error() {
        let body = normalize("Accepted", StatusCode::OK);
        assert_eq!(body.kind(), "raw");
        let object = body.into_object(None);
        assert_eq!(object["raw"], "Accepted");
        assert_eq!(object["httpStatus"], 200);
        assert!(!object["parseError"].as_str().unwrap().is_empty());
    }

    #[test]
    fn raw_text_is_kept_exactly() {
        let text = "  <html>oops</html>\n";
        match normalize(text, StatusCode::BAD_GATEWAY) {
            NormalizedBody::Raw { text: kept, status, .. } => {
                assert_eq!(kept, text);
                assert_eq!(status, 502);
            }
            other => panic!("expected raw wrapper, got {other:?}"),
        }
    }

    #[test]
    fn trailing_garbage_is_not_json() {
        assert_eq!(normalize(r#"{"a":1} trailing"#, StatusCode::OK).kind(), "raw");
    }

    #[test]
    fn non_object_json_goes_under_data() {
        let object = normalize("[1,2,3]", StatusCode::OK).into_object(None);
        assert_eq!(Value::Object(object), json!({"data": [1, 2, 3]}));

        let object = normalize("\"Accepted\"", StatusCode::OK).into_object(None);
        assert_eq!(Value::Object(object), json!({"data": "Accepted"}));
    }

    #[test]
    fn marker_is_added_to_wrapped_shapes_only() {
        let marker = RawMarker {
            field: "status".into(),
            value: json!("accepted"),
        };

        let raw = normalize("Accepted", StatusCode::OK).into_object(Some(&marker));
        assert_eq!(raw["status"], "accepted");

        let empty = normalize("", StatusCode::OK).into_object(Some(&marker));
        assert_eq!(empty["status"], "accepted");

        let parsed = normalize(r#"{"ok": true}"#, StatusCode::OK).into_object(Some(&marker));
        assert!(parsed.get("status").is_none());
    }
}
