//! Integration tests for the HTTP server, health endpoint, and graceful shutdown.

use std::sync::Arc;

use webhook_gateway::config::model::Config;
use webhook_gateway::config::ConfigVersion;
use webhook_gateway::health::HealthResponse;
use webhook_gateway::proxy::headers::Credential;
use webhook_gateway::server::{self, AppState, LoadedConfig};

fn test_config() -> Config {
    Config::with_destinations(vec![
        "https://hook.eu1.make.com/abc".into(),
        "https://hook.eu1.make.com/def".into(),
    ])
}

async fn start_test_server(max_body: usize) -> (String, tokio::sync::oneshot::Sender<()>) {
    let credential = Credential::new("x-make-apikey", "test-secret").unwrap();
    let state = Arc::new(
        AppState::new(
            LoadedConfig {
                config: test_config(),
                version: ConfigVersion::Hash("0123456789abcdef".into()),
                source_name: "test".into(),
            },
            credential,
        )
        .unwrap(),
    );

    let router = server::build_router(state, max_body);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    (format!("http://{addr}"), shutdown_tx)
}

#[tokio::test]
async fn health_endpoint_returns_healthy() {
    let (base, shutdown) = start_test_server(server::DEFAULT_MAX_BODY).await;

    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let health: HealthResponse = resp.json().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.config.source, "test");
    assert_eq!(health.config.version, "01234567");
    assert_eq!(health.config.destinations, 2);
    assert_eq!(health.config.credential_header, "x-make-apikey");
    assert_eq!(health.stats.requests_forwarded, 0);
    assert_eq!(health.stats.requests_failed, 0);
    assert_eq!(health.stats.requests_rejected, 0);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn health_never_exposes_the_credential() {
    let (base, shutdown) = start_test_server(server::DEFAULT_MAX_BODY).await;

    let body = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!body.contains("test-secret"));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn any_other_path_is_the_gateway() {
    let (base, shutdown) = start_test_server(server::DEFAULT_MAX_BODY).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/some/path"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let (base, shutdown) = start_test_server(64).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/"))
        .header("x-target-webhook", "https://hook.eu1.make.com/abc")
        .body(vec![b' '; 1024])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 413);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert!(resp.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Request body too large");

    let _ = shutdown.send(());
}

#[tokio::test]
async fn body_under_the_ceiling_is_accepted() {
    let (base, shutdown) = start_test_server(64).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/"))
        .header("x-target-webhook", "https://unlisted.example/hook")
        .body("{}")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn non_get_health_is_a_json_405() {
    let (base, shutdown) = start_test_server(server::DEFAULT_MAX_BODY).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 405);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Only POST is allowed");

    let resp = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{base}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn health_version_matches_crate() {
    let (base, shutdown) = start_test_server(server::DEFAULT_MAX_BODY).await;

    let health: HealthResponse = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn graceful_shutdown_works() {
    let (base, shutdown) = start_test_server(server::DEFAULT_MAX_BODY).await;

    let url = format!("{base}/health");
    assert!(reqwest::get(&url).await.is_ok());

    let _ = shutdown.send(());

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let result = reqwest::get(&url).await;
    assert!(result.is_err());
}
