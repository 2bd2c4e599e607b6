//! `webhook-gateway run`: start the gateway server.
//!
//! Loads configuration once from a file or from `--allow`, builds the
//! immutable relay state, and serves the Axum router with graceful
//! shutdown.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::RunArgs;
use crate::config::sources;
use crate::config::{self, ConfigSource};
use crate::error::GatewayServiceError;
use crate::logging;
use crate::proxy::headers::Credential;
use crate::server::{self, AppState, LoadedConfig};

pub async fn execute(args: RunArgs) -> Result<(), GatewayServiceError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    #[cfg(feature = "sentry-integration")]
    let _sentry_guard = args
        .sentry_dsn
        .as_ref()
        .map(|dsn| crate::sentry_integration::init(dsn, args.sentry_environment.as_deref()));

    let allowed = args.allowed_destinations();
    let source = resolve_config_source(args.config.as_deref(), &allowed).await?;
    let source_name = source.name();
    let (config, version) = config::load_with_overrides(source.as_ref(), &allowed, |c| {
        if let Some(timeout) = args.timeout {
            c.forwarding.timeout = timeout;
        }
        let header = args.credential_header_or(&c.forwarding.credential_header);
        c.forwarding.credential_header = header.to_string();
    })
    .await?;

    let credential = Credential::new(&config.forwarding.credential_header, &args.api_key)?;

    let destination_count = config.destinations.len();
    let timeout_ms = config.forwarding.timeout;
    let version_short = version.short().to_string();

    let state = Arc::new(AppState::new(
        LoadedConfig {
            config,
            version,
            source_name: source_name.to_string(),
        },
        credential,
    )?);

    let router = server::build_router(state, args.max_body);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        destinations = destination_count,
        timeout_ms,
        config_source = source_name,
        config_version = %version_short,
        "webhook-gateway started"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    tracing::info!("webhook-gateway stopped");
    Ok(())
}

async fn resolve_config_source(
    config_path: Option<&std::path::Path>,
    allowed: &[String],
) -> Result<Box<dyn ConfigSource>, GatewayServiceError> {
    if let Some(source) = resolve_file_source(config_path).await? {
        return Ok(source);
    }

    if allowed.is_empty() {
        return Err(GatewayServiceError::NoConfigSource {
            hint: "Provide --config <file> or --allow <url> (ALLOWED_DESTINATIONS).\n  \
                   Run 'webhook-gateway init' to create a config file."
                .into(),
        });
    }

    Ok(Box::new(sources::env::EnvSource::new(allowed.to_vec())))
}

async fn resolve_file_source(
    explicit: Option<&std::path::Path>,
) -> Result<Option<Box<dyn ConfigSource>>, GatewayServiceError> {
    if let Some(path) = explicit {
        return create_file_source(path).map(Some);
    }

    // Auto-detect in current directory
    let candidates = [
        "gateway.yaml",
        "gateway.yml",
        "gateway.json",
        "gateway.toml",
    ];

    for name in &candidates {
        let path = PathBuf::from(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(path = %path.display(), "auto-detected config file");
            return create_file_source(&path).map(Some);
        }
    }

    Ok(None)
}

fn create_file_source(path: &std::path::Path) -> Result<Box<dyn ConfigSource>, GatewayServiceError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => Ok(Box::new(sources::yaml::new(path.to_path_buf()))),

        #[cfg(feature = "json")]
        "json" => Ok(Box::new(sources::json::new(path.to_path_buf()))),

        #[cfg(feature = "toml")]
        "toml" => Ok(Box::new(sources::toml_source::new(path.to_path_buf()))),

        other => Err(GatewayServiceError::UnsupportedFormat(other.to_string())),
    }
}
