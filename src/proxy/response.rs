//! Final response body assembly.
//!
//! Merges the normalized destination body with the `proxy_info`
//! diagnostics object and, for leads, the `google_sheets` fan-out outcome.

use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use super::fanout::FanoutOutcome;
use super::headers::RequestKind;
use super::normalize::NormalizedBody;
use crate::config::model::RawMarker;

pub const DIAGNOSTICS_KEY: &str = "proxy_info";
pub const FANOUT_KEY: &str = "google_sheets";

/// RFC 3339 UTC timestamp with millisecond precision.
#[must_use]
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug)]
pub struct Diagnostics<'a> {
    pub duration: Duration,
    pub request_kind: Option<&'a RequestKind>,
}

impl Diagnostics<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn to_json(&self) -> Value {
        json!({
            "duration_ms": self.duration.as_millis() as u64,
            "request_type": self.request_kind.map(RequestKind::as_str),
            "timestamp": timestamp(),
            "authenticated": true,
        })
    }
}

/// Build the caller-facing body. Diagnostics and fan-out keys overwrite any
/// same-named members of the destination's own JSON.
#[must_use]
pub fn assemble(
    body: NormalizedBody,
    marker: Option<&RawMarker>,
    diagnostics: &Diagnostics<'_>,
    fanout: Option<&FanoutOutcome>,
) -> Value {
    let mut object = body.into_object(marker);
    object.insert(DIAGNOSTICS_KEY.into(), diagnostics.to_json());
    if let Some(outcome) = fanout {
        object.insert(FANOUT_KEY.into(), outcome.to_json());
    }
    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::fanout::FanoutError;

    #[test]
    fn json_body_is_merged_without_wrapping() {
        let diagnostics = Diagnostics {
            duration: Duration::from_millis(42),
            request_kind: Some(&RequestKind::Tracking),
        };
        let body = assemble(
            NormalizedBody::Json(json!({"ok": true, "id": "abc"})),
            None,
            &diagnostics,
            None,
        );

        assert_eq!(body["ok"], true);
        assert_eq!(body["id"], "abc");
        assert_eq!(body[DIAGNOSTICS_KEY]["duration_ms"], 42);
        assert_eq!(body[DIAGNOSTICS_KEY]["request_type"], "tracking");
        assert_eq!(body[DIAGNOSTICS_KEY]["authenticated"], true);
        assert!(body.get(FANOUT_KEY).is_none());
    }

    #[test]
    fn absent_kind_is_null() {
        let diagnostics = Diagnostics {
            duration: Duration::ZERO,
            request_kind: None,
        };
        let body = assemble(NormalizedBody::Empty { status: 204 }, None, &diagnostics, None);
        assert!(body[DIAGNOSTICS_KEY]["request_type"].is_null());
        assert_eq!(body["httpStatus"], 204);
    }

    #[test]
    fn fanout_outcome_is_attached() {
        let diagnostics = Diagnostics {
            duration: Duration::ZERO,
            request_kind: Some(&RequestKind::Lead),
        };
        let outcome = FanoutOutcome::Failed(FanoutError::MissingDestination);
        let body = assemble(
            NormalizedBody::Json(json!({})),
            None,
            &diagnostics,
            Some(&outcome),
        );
        assert_eq!(body[FANOUT_KEY]["success"], false);
        assert_eq!(body[FANOUT_KEY]["reason"], "MissingFanoutDestination");
    }

    #[test]
    fn timestamp_is_rfc3339_millis() {
        let ts = timestamp();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
        // 2026-01-01T00:00:00.000Z
        assert_eq!(ts.len(), 24);
    }
}
