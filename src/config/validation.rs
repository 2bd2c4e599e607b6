//! Configuration validation with detailed error reporting.
//!
//! The [`validate`] function checks a parsed [`Config`] for structural
//! errors such as an empty allow-list, malformed or duplicate destination
//! URLs, zero timeouts, and unusable header names. Returns a list of
//! [`ValidationError`] values with per-field suggestions.

use std::collections::HashSet;

use axum::http::{HeaderName, HeaderValue};
use url::Url;

use super::model::Config;
use crate::error::ValidationError;

/// Validate a single destination URL. Returns `Ok(())` or a human-readable error.
pub fn validate_destination(url: &str) -> Result<(), String> {
    if url.trim() != url {
        return Err("leading or trailing whitespace is never matched".into());
    }
    match Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            if scheme != "http" && scheme != "https" {
                Err(format!(
                    "unsupported scheme '{scheme}' (expected http or https)"
                ))
            } else if parsed.host_str().is_none() {
                Err("URL has no host".into())
            } else {
                Ok(())
            }
        }
        Err(_) => Err(format!("'{url}' is not a valid URL")),
    }
}

pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.destinations.is_empty() {
        errors.push(
            ValidationError::new("destinations", "at least one destination must be allowed")
                .with_suggestion("add a URL under 'destinations' or pass --allow"),
        );
    }

    let mut seen = HashSet::new();
    for destination in &config.destinations {
        if let Err(msg) = validate_destination(destination) {
            let mut err = ValidationError::new("destinations", msg).with_entry(destination);
            if !destination.contains("://") {
                err = err.with_suggestion(format!("did you mean 'https://{destination}'?"));
            }
            errors.push(err);
        }
        if !seen.insert(destination.as_str()) {
            errors.push(
                ValidationError::new("destinations", "duplicate destination")
                    .with_entry(destination),
            );
        }
    }

    if config.forwarding.timeout == 0 {
        errors.push(ValidationError::new(
            "forwarding.timeout",
            "timeout must be greater than 0",
        ));
    }

    if config.forwarding.credential_header.parse::<HeaderName>().is_err() {
        errors.push(
            ValidationError::new("forwarding.credential_header", "not a valid header name")
                .with_entry(&config.forwarding.credential_header),
        );
    }

    if HeaderValue::from_str(&config.forwarding.user_agent).is_err() {
        errors.push(ValidationError::new(
            "forwarding.user_agent",
            "not a valid header value",
        ));
    }

    if config.fanout.timeout == Some(0) {
        errors.push(
            ValidationError::new("fanout.timeout", "timeout must be greater than 0")
                .with_suggestion("omit it to use the transport default"),
        );
    }

    if let Some(ref marker) = config.responses.raw_marker {
        if marker.field.is_empty() {
            errors.push(ValidationError::new(
                "responses.raw_marker.field",
                "field name cannot be empty",
            ));
        } else if matches!(marker.field.as_str(), "raw" | "httpStatus" | "parseError" | "message") {
            errors.push(
                ValidationError::new(
                    "responses.raw_marker.field",
                    "field collides with a wrapper member",
                )
                .with_entry(&marker.field),
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[must_use]
pub fn format_validation_report(path: &str, config: &Config) -> String {
    let mut lines = vec![format!(
        "  {} destinations, timeout {}ms\n",
        config.destinations.len(),
        config.forwarding.timeout
    )];

    for destination in &config.destinations {
        lines.push(format!("  -> {destination}"));
    }
    lines.push(format!(
        "\n  credential header: {}",
        config.forwarding.credential_header
    ));
    lines.push(format!("  user agent:        {}", config.forwarding.user_agent));
    lines.push(format!(
        "  fan-out timeout:   {}",
        config
            .fanout
            .timeout
            .map_or_else(|| "transport default".to_string(), |t| format!("{t}ms"))
    ));

    format!("{} is valid\n{}", path, lines.join("\n"))
}
