//! Single-attempt forwarding to the primary destination.
//!
//! [`forward`] POSTs the JSON payload with the fixed header set from
//! [`build_forward_headers`] and reads the full response body, all inside
//! one deadline. When the deadline fires the in-flight future is dropped,
//! which aborts the underlying connection. There is no retry and no
//! redirect following.

use std::time::{Duration, Instant};

use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};

use super::headers::{build_forward_headers, Credential};
use crate::config::model::Forwarding;
use crate::error::{GatewayServiceError, ValidationError};
use crate::server::HttpClient;

#[derive(Debug, Clone)]
pub struct ForwardSettings {
    pub timeout: Duration,
    pub user_agent: HeaderValue,
    pub credential: Credential,
}

impl ForwardSettings {
    pub fn new(forwarding: &Forwarding, credential: Credential) -> Result<Self, GatewayServiceError> {
        let user_agent = HeaderValue::from_str(&forwarding.user_agent).map_err(|_| {
            GatewayServiceError::ConfigValidation {
                errors: vec![ValidationError::new(
                    "forwarding.user_agent",
                    "not a valid header value",
                )],
            }
        })?;
        Ok(Self {
            timeout: Duration::from_millis(forwarding.timeout),
            user_agent,
            credential,
        })
    }
}

pub struct ForwardRequest<'a> {
    pub client: &'a HttpClient,
    pub destination: &'a str,
    pub payload: &'a serde_json::Value,
    pub settings: &'a ForwardSettings,
    pub correlation_id: &'a str,
}

#[derive(Debug)]
pub struct OutboundResult {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
    pub elapsed: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("no response within {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("{0}")]
    Network(String),

    #[error("could not build request: {0}")]
    Request(String),
}

pub async fn forward(req: ForwardRequest<'_>) -> Result<OutboundResult, ForwardError> {
    let body = serde_json::to_vec(req.payload).map_err(|e| ForwardError::Request(e.to_string()))?;

    let mut builder = hyper::Request::builder()
        .method(Method::POST)
        .uri(req.destination);
    for (key, value) in &build_forward_headers(&req.settings.credential, &req.settings.user_agent) {
        builder = builder.header(key, value);
    }
    let request = builder
        .body(Full::new(Bytes::from(body)))
        .map_err(|e| ForwardError::Request(e.to_string()))?;

    tracing::debug!(
        correlation_id = %req.correlation_id,
        destination = %req.destination,
        credential_header = %req.settings.credential.header_name(),
        "forwarding to destination"
    );

    let start = Instant::now();
    let exchange = async {
        let response = req
            .client
            .request(request)
            .await
            .map_err(|e| ForwardError::Network(error_chain(&e)))?;
        let (parts, body) = response.into_parts();
        let collected = body
            .collect()
            .await
            .map_err(|e| ForwardError::Network(format!("body read error: {}", error_chain(&e))))?;
        Ok::<_, ForwardError>((parts.status, parts.headers, collected.to_bytes()))
    };

    let (status, headers, bytes) = tokio::time::timeout(req.settings.timeout, exchange)
        .await
        .map_err(|_| ForwardError::Timeout(req.settings.timeout))??;
    let elapsed = start.elapsed();

    for (name, value) in &headers {
        tracing::debug!(
            correlation_id = %req.correlation_id,
            header = %name,
            value = ?value,
            "destination response header"
        );
    }

    Ok(OutboundResult {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
        elapsed,
    })
}

/// Render an error and its full `source()` chain, outermost first.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.ends_with(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}
