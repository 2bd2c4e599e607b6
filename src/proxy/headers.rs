//! Routing metadata extraction and outbound header construction.
//!
//! [`RoutingMetadata::from_headers`] reads the gateway's control headers
//! (`X-Target-Webhook`, `X-Request-Type`, `X-Google-Sheets-Url`).
//! [`build_forward_headers`] produces the fixed header set sent to the
//! primary destination, including the injected [`Credential`]. Inbound
//! headers are never copied to destinations. The CORS constants here are
//! applied to every response by the router.

use std::fmt;

use axum::http::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::error::GatewayServiceError;

pub const TARGET_HEADER: &str = "x-target-webhook";
pub const REQUEST_TYPE_HEADER: &str = "x-request-type";
pub const FANOUT_URL_HEADER: &str = "x-google-sheets-url";
pub const CORRELATION_HEADER: &str = "x-correlation-id";

pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_METHODS: &str = "POST, OPTIONS";
pub const CORS_ALLOW_HEADERS: &str =
    "Content-Type, X-Target-Webhook, X-Request-Type, X-Google-Sheets-Url";
pub const CORS_MAX_AGE: &str = "86400";

const JSON: &str = "application/json";
const ACCEPT_ANY: &str = "application/json, text/plain, */*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    Lead,
    Tracking,
    Other(String),
}

impl RequestKind {
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "lead" => Self::Lead,
            "tracking" => Self::Tracking,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Lead => "lead",
            Self::Tracking => "tracking",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingMetadata {
    pub target: Option<String>,
    pub kind: Option<RequestKind>,
    pub fanout_url: Option<String>,
}

impl RoutingMetadata {
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            target: header_str(headers, TARGET_HEADER).map(String::from),
            kind: header_str(headers, REQUEST_TYPE_HEADER).map(RequestKind::parse),
            fanout_url: header_str(headers, FANOUT_URL_HEADER).map(String::from),
        }
    }

    #[must_use]
    pub fn is_lead(&self) -> bool {
        self.kind == Some(RequestKind::Lead)
    }
}

/// Non-empty, visible-ASCII header value, if any.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
}

/// Secret header injected into every primary forward.
///
/// Established once at startup; the value is marked sensitive so it is
/// elided from `http` debug output, and this type's own `Debug` redacts it.
#[derive(Clone)]
pub struct Credential {
    name: HeaderName,
    value: HeaderValue,
}

impl Credential {
    pub fn new(header: &str, secret: &str) -> Result<Self, GatewayServiceError> {
        if secret.is_empty() {
            return Err(GatewayServiceError::InvalidCredential(
                "secret cannot be empty".into(),
            ));
        }
        let name = header.parse::<HeaderName>().map_err(|_| {
            GatewayServiceError::InvalidCredential(format!("'{header}' is not a valid header name"))
        })?;
        let mut value = HeaderValue::from_str(secret).map_err(|_| {
            GatewayServiceError::InvalidCredential("secret is not a valid header value".into())
        })?;
        value.set_sensitive(true);
        Ok(Self { name, value })
    }

    #[must_use]
    pub const fn header_name(&self) -> &HeaderName {
        &self.name
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .finish()
    }
}

pub fn build_forward_headers(credential: &Credential, user_agent: &HeaderValue) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(4);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_ANY));
    headers.insert(USER_AGENT, user_agent.clone());
    headers.insert(credential.name.clone(), credential.value.clone());
    headers
}

pub fn build_fanout_headers() -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(1);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_routing_metadata() {
        let mut headers = HeaderMap::new();
        headers.insert(TARGET_HEADER, "https://hook.example.com/a".parse().unwrap());
        headers.insert(REQUEST_TYPE_HEADER, "lead".parse().unwrap());
        headers.insert(FANOUT_URL_HEADER, "https://sheets.example.com/x".parse().unwrap());

        let meta = RoutingMetadata::from_headers(&headers);
        assert_eq!(meta.target.as_deref(), Some("https://hook.example.com/a"));
        assert_eq!(meta.kind, Some(RequestKind::Lead));
        assert_eq!(meta.fanout_url.as_deref(), Some("https://sheets.example.com/x"));
        assert!(meta.is_lead());
    }

    #[test]
    fn empty_header_values_are_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(TARGET_HEADER, HeaderValue::from_static(""));
        headers.insert(REQUEST_TYPE_HEADER, HeaderValue::from_static(""));

        let meta = RoutingMetadata::from_headers(&headers);
        assert_eq!(meta, RoutingMetadata::default());
        assert!(!meta.is_lead());
    }

    #[test]
    fn request_kind_is_case_sensitive() {
        assert_eq!(RequestKind::parse("lead"), RequestKind::Lead);
        assert_eq!(RequestKind::parse("tracking"), RequestKind::Tracking);
        assert_eq!(RequestKind::parse("Lead"), RequestKind::Other("Lead".into()));
        assert_eq!(RequestKind::parse("Lead").as_str(), "Lead");
    }

    #[test]
    fn forward_headers_carry_credential() {
        let credential = Credential::new("x-make-apikey", "s3cret").unwrap();
        let ua = HeaderValue::from_static("webhook-gateway/test");
        let headers = build_forward_headers(&credential, &ua);

        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json, text/plain, */*");
        assert_eq!(headers.get(USER_AGENT).unwrap(), "webhook-gateway/test");
        let secret = headers.get("x-make-apikey").unwrap();
        assert_eq!(secret, "s3cret");
        assert!(secret.is_sensitive());
    }

    #[test]
    fn fanout_headers_have_no_credential() {
        let headers = build_fanout_headers();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn credential_debug_is_redacted() {
        let credential = Credential::new("x-make-apikey", "s3cret").unwrap();
        let shown = format!("{credential:?}");
        assert!(!shown.contains("s3cret"));
        assert!(shown.contains("redacted"));
    }

    #[test]
    fn credential_rejects_bad_input() {
        assert!(Credential::new("x-make-apikey", "").is_err());
        assert!(Credential::new("bad header", "s3cret").is_err());
        assert!(Credential::new("x-make-apikey", "line\nbreak").is_err());
    }
}
