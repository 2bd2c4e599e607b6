//! Serde data structures for the gateway configuration file.
//!
//! Contains [`Config`] (the root), [`Forwarding`], [`Fanout`],
//! [`Responses`] and [`RawMarker`]. All types derive `Serialize` and
//! `Deserialize` with `deny_unknown_fields` for strict parsing.

use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMEOUT_MS: u64 = 25_000;
pub const DEFAULT_CREDENTIAL_HEADER: &str = "x-make-apikey";

const fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_user_agent() -> String {
    concat!("webhook-gateway/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_credential_header() -> String {
    DEFAULT_CREDENTIAL_HEADER.to_string()
}

fn is_default_timeout(v: &u64) -> bool {
    *v == default_timeout()
}

fn is_default_user_agent(v: &String) -> bool {
    *v == default_user_agent()
}

fn is_default_credential_header(v: &String) -> bool {
    v == DEFAULT_CREDENTIAL_HEADER
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Exact-match allow-list of destination URLs.
    #[serde(default)]
    pub destinations: Vec<String>,

    #[serde(default, skip_serializing_if = "Forwarding::is_default")]
    pub forwarding: Forwarding,

    #[serde(default, skip_serializing_if = "Fanout::is_default")]
    pub fanout: Fanout,

    #[serde(default, skip_serializing_if = "Responses::is_default")]
    pub responses: Responses,
}

impl Config {
    #[must_use]
    pub fn with_destinations(destinations: Vec<String>) -> Self {
        Self {
            destinations,
            ..Self::default()
        }
    }

    /// Append destinations not already present, preserving order.
    pub fn extend_destinations<I>(&mut self, extra: I)
    where
        I: IntoIterator<Item = String>,
    {
        for destination in extra {
            if !self.destinations.contains(&destination) {
                self.destinations.push(destination);
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Forwarding {
    /// Deadline for the primary destination, in milliseconds.
    #[serde(default = "default_timeout", skip_serializing_if = "is_default_timeout")]
    pub timeout: u64,

    #[serde(
        default = "default_user_agent",
        skip_serializing_if = "is_default_user_agent"
    )]
    pub user_agent: String,

    /// Name of the header carrying the injected credential.
    #[serde(
        default = "default_credential_header",
        skip_serializing_if = "is_default_credential_header"
    )]
    pub credential_header: String,
}

impl Default for Forwarding {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            user_agent: default_user_agent(),
            credential_header: default_credential_header(),
        }
    }
}

impl Forwarding {
    fn is_default(&self) -> bool {
        is_default_timeout(&self.timeout)
            && is_default_user_agent(&self.user_agent)
            && is_default_credential_header(&self.credential_header)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Fanout {
    /// Optional deadline for the spreadsheet fan-out, in milliseconds.
    /// Unset means the transport default (no deadline).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Fanout {
    fn is_default(&self) -> bool {
        self.timeout.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Responses {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_marker: Option<RawMarker>,
}

impl Responses {
    fn is_default(&self) -> bool {
        self.raw_marker.is_none()
    }
}

/// Extra member added to wrapped (non-JSON or empty) destination responses,
/// for clients that key off a fixed field rather than the wrapper shape.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawMarker {
    pub field: String,
    pub value: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_relay_contract() {
        let forwarding = Forwarding::default();
        assert_eq!(forwarding.timeout, 25_000);
        assert_eq!(forwarding.credential_header, "x-make-apikey");
        assert!(forwarding.user_agent.starts_with("webhook-gateway/"));
    }

    #[test]
    fn minimal_json_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"destinations": ["https://a.example/hook"]}"#).unwrap();
        assert_eq!(config.destinations.len(), 1);
        assert_eq!(config.forwarding.timeout, DEFAULT_TIMEOUT_MS);
        assert!(config.fanout.timeout.is_none());
        assert!(config.responses.raw_marker.is_none());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = serde_json::from_str::<Config>(r#"{"destinations": [], "routes": []}"#);
        assert!(result.is_err());
    }

    #[test]
    fn extend_destinations_skips_duplicates() {
        let mut config = Config::with_destinations(vec!["https://a.example".into()]);
        config.extend_destinations(vec!["https://a.example".into(), "https://b.example".into()]);
        assert_eq!(
            config.destinations,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn default_sections_are_not_serialized() {
        let config = Config::with_destinations(vec!["https://a.example".into()]);
        let json = serde_json::to_value(&config).unwrap();
        assert!(json.get("forwarding").is_none());
        assert!(json.get("fanout").is_none());
        assert!(json.get("responses").is_none());
    }
}
