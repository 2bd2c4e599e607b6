//! `GET /health` endpoint handler.
//!
//! Returns a [`HealthResponse`] JSON payload containing the server
//! version, uptime, config source metadata, allow-list size, and
//! cumulative relay statistics. The credential value is never reported,
//! only the header it is sent in.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::server::AppState;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub config: ConfigHealth,
    pub stats: StatsResponse,
}

#[derive(Serialize, Deserialize)]
pub struct ConfigHealth {
    pub source: String,
    pub version: String,
    pub destinations: usize,
    pub credential_header: String,
}

#[derive(Serialize, Deserialize)]
pub struct StatsResponse {
    pub requests_forwarded: u64,
    pub requests_failed: u64,
    pub requests_rejected: u64,
    pub fanout_delivered: u64,
    pub fanout_failed: u64,
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let stats = &state.stats;
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        config: ConfigHealth {
            source: state.config.source_name.clone(),
            version: state.config.version.short().to_string(),
            destinations: state.allow_list.len(),
            credential_header: state.forwarding.credential.header_name().to_string(),
        },
        stats: StatsResponse {
            requests_forwarded: stats.forwarded.load(Ordering::Relaxed),
            requests_failed: stats.failed.load(Ordering::Relaxed),
            requests_rejected: stats.rejected.load(Ordering::Relaxed),
            fanout_delivered: stats.fanout_delivered.load(Ordering::Relaxed),
            fanout_failed: stats.fanout_failed.load(Ordering::Relaxed),
        },
    })
}

/// Any method other than GET/HEAD on `/health`. Preflight still succeeds.
pub async fn health_method_fallback(method: Method) -> Response {
    if method == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        GatewayError::BadMethod(method).into_response()
    }
}
