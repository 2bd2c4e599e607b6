//! The gateway endpoint.
//!
//! [`gateway_handler`] is the Axum fallback that receives every
//! non-`/health` request. It validates the requested destination against
//! the allow-list, forwards the body once, normalizes the reply, runs the
//! lead fan-out when asked to, and maps each failure to its status code.
//! Submodules hold the individual steps: [`allowlist`], [`forward`],
//! [`normalize`], [`fanout`], [`headers`] and [`response`].

pub mod allowlist;
pub mod fanout;
pub mod forward;
pub mod headers;
pub mod normalize;
pub mod response;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::GatewayError;
use crate::server::AppState;
use allowlist::Rejected;
use forward::{ForwardError, ForwardRequest};
use headers::{RoutingMetadata, CORRELATION_HEADER};

pub async fn gateway_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    req_headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let correlation_id = req_headers
        .get(CORRELATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);

    let mut response = if method == Method::OPTIONS {
        tracing::debug!(correlation_id = %correlation_id, "preflight handled");
        StatusCode::OK.into_response()
    } else {
        match relay(&state, &method, &req_headers, body, &correlation_id).await {
            Ok(response) => response,
            Err(err) => {
                let counter = if err.is_rejection() {
                    tracing::warn!(correlation_id = %correlation_id, error = %err, "request rejected");
                    &state.stats.rejected
                } else {
                    tracing::error!(correlation_id = %correlation_id, error = %err, "forwarding failed");
                    &state.stats.failed
                };
                counter.fetch_add(1, Ordering::Relaxed);
                err.into_response()
            }
        }
    };

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        response.headers_mut().insert(CORRELATION_HEADER, value);
    }
    response
}

async fn relay(
    state: &AppState,
    method: &Method,
    req_headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
    correlation_id: &str,
) -> Result<Response, GatewayError> {
    if *method != Method::POST {
        return Err(GatewayError::BadMethod(method.clone()));
    }
    let body = body.map_err(body_rejection)?;

    let metadata = RoutingMetadata::from_headers(req_headers);
    tracing::info!(
        correlation_id = %correlation_id,
        destination = metadata.target.as_deref().unwrap_or("-"),
        request_type = metadata.kind.as_ref().map_or("-", |k| k.as_str()),
        body_bytes = body.len(),
        "request received"
    );

    let destination = state
        .allow_list
        .validate(metadata.target.as_deref())
        .map_err(|rejected| match rejected {
            Rejected::MissingDestination => GatewayError::MissingDestination,
            Rejected::Unauthorized => GatewayError::UnauthorizedDestination {
                provided: metadata.target.clone().unwrap_or_default(),
                allowed: state.allow_list.entries().to_vec(),
            },
        })?;

    let payload = parse_payload(&body)?;

    let outbound = forward::forward(ForwardRequest {
        client: &state.http_client,
        destination,
        payload: &payload,
        settings: &state.forwarding,
        correlation_id,
    })
    .await
    .map_err(|e| match e {
        ForwardError::Timeout(timeout) => GatewayError::Timeout {
            destination: destination.to_string(),
            timeout,
        },
        ForwardError::Network(details) => GatewayError::Network {
            destination: destination.to_string(),
            details,
        },
        ForwardError::Request(details) => GatewayError::Unexpected(details),
    })?;
    state.stats.forwarded.fetch_add(1, Ordering::Relaxed);

    let normalized = normalize::normalize(&outbound.body, outbound.status);
    tracing::info!(
        correlation_id = %correlation_id,
        destination = %destination,
        status = outbound.status.as_u16(),
        duration_ms = u64::try_from(outbound.elapsed.as_millis()).unwrap_or(u64::MAX),
        body = normalized.kind(),
        "destination responded"
    );

    let fanout_outcome = if metadata.is_lead() {
        let outcome = fanout::fanout(fanout::FanoutRequest {
            client: &state.http_client,
            destination: metadata.fanout_url.as_deref(),
            payload: &payload,
            timeout: state.fanout_timeout,
            correlation_id,
        })
        .await;
        let counter = if outcome.is_success() {
            &state.stats.fanout_delivered
        } else {
            &state.stats.fanout_failed
        };
        counter.fetch_add(1, Ordering::Relaxed);
        Some(outcome)
    } else {
        None
    };

    let diagnostics = response::Diagnostics {
        duration: outbound.elapsed,
        request_kind: metadata.kind.as_ref(),
    };
    let body = response::assemble(
        normalized,
        state.config.config.responses.raw_marker.as_ref(),
        &diagnostics,
        fanout_outcome.as_ref(),
    );

    Ok((outbound.status, Json(body)).into_response())
}

fn body_rejection(rejection: BytesRejection) -> GatewayError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GatewayError::PayloadTooLarge
    } else {
        GatewayError::InvalidBody(rejection.body_text())
    }
}

/// Inbound body as JSON; an empty body is treated as `{}`.
fn parse_payload(body: &Bytes) -> Result<serde_json::Value, GatewayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::Value::Object(serde_json::Map::new()));
    }
    serde_json::from_slice(body).map_err(|e| GatewayError::InvalidBody(e.to_string()))
}
