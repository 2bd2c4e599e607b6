//! Best-effort relay of lead submissions to a spreadsheet endpoint.
//!
//! Only a fixed set of contact fields is sent. The outcome is advisory:
//! it is reported in the response body but never changes the primary
//! status code, and nothing here returns an error to the caller.

use std::time::{Duration, Instant};

use axum::http::Method;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use serde_json::{json, Map, Value};

use super::forward::error_chain;
use super::headers::build_fanout_headers;
use crate::server::HttpClient;

/// Fields copied from the inbound payload into the spreadsheet record.
pub const LEAD_FIELDS: [&str; 5] = ["name", "email", "phone", "prefix", "funnel"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FanoutError {
    #[error("fan-out URL missing for lead")]
    MissingDestination,

    #[error("fan-out destination returned {status}")]
    Http { status: u16 },

    #[error("{0}")]
    Network(String),
}

impl FanoutError {
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::MissingDestination => "MissingFanoutDestination",
            Self::Http { .. } => "FanoutHTTPError",
            Self::Network(_) => "FanoutNetworkError",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FanoutOutcome {
    Delivered { response: Value },
    Failed(FanoutError),
}

impl FanoutOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Delivered { response } => json!({
                "success": true,
                "response": response,
            }),
            Self::Failed(err) => {
                let mut body = json!({
                    "success": false,
                    "reason": err.reason(),
                    "error": err.to_string(),
                });
                if let (FanoutError::Http { status }, Some(map)) = (err, body.as_object_mut()) {
                    map.insert("status".into(), (*status).into());
                }
                body
            }
        }
    }
}

pub struct FanoutRequest<'a> {
    pub client: &'a HttpClient,
    pub destination: Option<&'a str>,
    pub payload: &'a Value,
    pub timeout: Option<Duration>,
    pub correlation_id: &'a str,
}

/// Build the reduced record. A field is copied when present and truthy
/// (not `null`, `false`, `0` or `""`); otherwise it becomes `""`.
#[must_use]
pub fn lead_record(payload: &Value) -> Map<String, Value> {
    LEAD_FIELDS
        .iter()
        .map(|&field| {
            let value = payload
                .get(field)
                .filter(|v| is_truthy(v))
                .cloned()
                .unwrap_or_else(|| Value::String(String::new()));
            (field.to_string(), value)
        })
        .collect()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[allow(clippy::cast_possible_truncation)]
pub async fn fanout(req: FanoutRequest<'_>) -> FanoutOutcome {
    let Some(destination) = req.destination else {
        tracing::warn!(
            correlation_id = %req.correlation_id,
            "lead received without fan-out URL"
        );
        return FanoutOutcome::Failed(FanoutError::MissingDestination);
    };

    let record = Value::Object(lead_record(req.payload));
    let start = Instant::now();
    let outcome = match send(&req, destination, &record).await {
        Ok(outcome) => outcome,
        Err(err) => FanoutOutcome::Failed(err),
    };
    let latency_ms = start.elapsed().as_millis() as u64;

    match &outcome {
        FanoutOutcome::Delivered { .. } => tracing::info!(
            correlation_id = %req.correlation_id,
            destination = %destination,
            latency_ms,
            "lead fan-out delivered"
        ),
        FanoutOutcome::Failed(err) => tracing::warn!(
            correlation_id = %req.correlation_id,
            destination = %destination,
            error = %err,
            latency_ms,
            "lead fan-out failed"
        ),
    }

    outcome
}

async fn send(
    req: &FanoutRequest<'_>,
    destination: &str,
    record: &Value,
) -> Result<FanoutOutcome, FanoutError> {
    let body = serde_json::to_vec(record).map_err(|e| FanoutError::Network(e.to_string()))?;

    let mut builder = hyper::Request::builder()
        .method(Method::POST)
        .uri(destination);
    for (key, value) in &build_fanout_headers() {
        builder = builder.header(key, value);
    }
    let request = builder
        .body(Full::new(Bytes::from(body)))
        .map_err(|e| FanoutError::Network(format!("invalid fan-out request: {e}")))?;

    let exchange = async {
        let response = req
            .client
            .request(request)
            .await
            .map_err(|e| FanoutError::Network(error_chain(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FanoutError::Http {
                status: status.as_u16(),
            });
        }

        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| FanoutError::Network(format!("body read error: {}", error_chain(&e))))?
            .to_bytes();
        let text = String::from_utf8_lossy(&bytes);
        let response = serde_json::from_str::<Value>(&text)
            .unwrap_or_else(|_| Value::String(text.into_owned()));
        Ok::<_, FanoutError>(FanoutOutcome::Delivered { response })
    };

    match req.timeout {
        Some(timeout) => tokio::time::timeout(timeout, exchange).await.map_err(|_| {
            FanoutError::Network(format!("no response within {}ms", timeout.as_millis()))
        })?,
        None => exchange.await,
    }
}
