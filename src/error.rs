//! Error types for the gateway.
//!
//! [`GatewayServiceError`] covers process-level failures (config loading,
//! validation, I/O, CLI subcommands). [`GatewayError`] is the per-request
//! failure taxonomy of the relay path; it renders itself as a JSON body
//! with the matching HTTP status. [`ValidationError`] describes a single
//! config problem with an optional hint.

use std::path::PathBuf;
use std::time::Duration;

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub entry: Option<String>,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub(crate) fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            entry: None,
            message: message.into(),
            suggestion: None,
        }
    }

    pub(crate) fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = Some(entry.into());
        self
    }

    pub(crate) fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  {}", self.field)?;
        if let Some(ref entry) = self.entry {
            write!(f, " '{entry}'")?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            buf.push('\n');
        }
        // write! to String is infallible (only fails on OOM which is unrecoverable)
        let _ = write!(buf, "{e}");
    }
    buf
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayServiceError {
    #[error("No config source found.\n\n  {hint}")]
    NoConfigSource { hint: String },

    #[error("Config file not found: {}", path.display())]
    ConfigFileNotFound { path: PathBuf },

    #[error("Config parse error in {path}:\n  {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Config validation failed:\n{}", format_errors(.errors))]
    ConfigValidation { errors: Vec<ValidationError> },

    #[error("Unsupported config format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("Invalid URI: {source}")]
    UriParse {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP request failed: {source}")]
    HttpRequest {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("File already exists: {}", path.display())]
    FileExists { path: PathBuf },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Health check failed with status {0}")]
    HealthCheckFailed(hyper::StatusCode),
}

/// Failure of the primary relay path. Each variant maps to exactly one
/// status code; fan-out failures are never represented here.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("method {0} not allowed")]
    BadMethod(Method),

    #[error("missing X-Target-Webhook header")]
    MissingDestination,

    #[error("destination not allowed: {provided}")]
    UnauthorizedDestination {
        provided: String,
        allowed: Vec<String>,
    },

    #[error("request body is not valid JSON: {0}")]
    InvalidBody(String),

    #[error("request body exceeds the size limit")]
    PayloadTooLarge,

    #[error("destination {destination} did not respond within {}ms", timeout.as_millis())]
    Timeout {
        destination: String,
        timeout: Duration,
    },

    #[error("destination {destination} unreachable: {details}")]
    Network {
        destination: String,
        details: String,
    },

    #[error("unexpected gateway fault: {0}")]
    Unexpected(String),
}

impl GatewayError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadMethod(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::MissingDestination | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::UnauthorizedDestination { .. } => StatusCode::FORBIDDEN,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Timeout { .. } => StatusCode::REQUEST_TIMEOUT,
            Self::Network { .. } => StatusCode::BAD_GATEWAY,
            Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True when the request was refused before any outbound call was made.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::BadMethod(_)
                | Self::MissingDestination
                | Self::UnauthorizedDestination { .. }
                | Self::InvalidBody(_)
                | Self::PayloadTooLarge
        )
    }

    fn body(&self) -> serde_json::Value {
        match self {
            Self::BadMethod(_) => json!({ "error": "Only POST is allowed" }),
            Self::MissingDestination => json!({ "error": "X-Target-Webhook header is required" }),
            Self::UnauthorizedDestination { provided, allowed } => json!({
                "error": "Destination not allowed",
                "provided": provided,
                "allowed": allowed,
            }),
            Self::InvalidBody(details) => json!({
                "error": "Request body must be valid JSON",
                "details": details,
            }),
            Self::PayloadTooLarge => json!({ "error": "Request body too large" }),
            Self::Timeout {
                destination,
                timeout,
            } => {
                let deadline = format_deadline(*timeout);
                json!({
                    "error": format!("Timeout - destination did not respond within {deadline}"),
                    "webhook": destination,
                    "timeout": deadline,
                })
            }
            Self::Network {
                destination,
                details,
            } => json!({
                "error": "Unable to reach destination",
                "webhook": destination,
                "details": details,
            }),
            Self::Unexpected(details) => internal_error_body(details),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

/// Whole seconds as `25s`, anything else as `300ms`.
fn format_deadline(timeout: Duration) -> String {
    let millis = timeout.as_millis();
    if millis % 1000 == 0 {
        format!("{}s", millis / 1000)
    } else {
        format!("{millis}ms")
    }
}

/// Generic body for faults that escaped every anticipated failure kind.
#[must_use]
pub fn internal_error_body(details: &str) -> serde_json::Value {
    json!({
        "error": "Internal gateway error",
        "timestamp": crate::proxy::response::timestamp(),
        "details": details,
    })
}
