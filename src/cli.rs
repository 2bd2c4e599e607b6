//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (run, init, validate, health), and their associated
//! argument structs. Every `run` flag has an environment variable
//! equivalent for container deployments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "webhook-gateway",
    version,
    about = "Allow-listed webhook relay with credential injection and lead fan-out",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        webhook-gateway init                          Create a starter config\n  \
        GATEWAY_API_KEY=... webhook-gateway run       Start with ./gateway.yaml\n  \
        webhook-gateway run --allow https://hook/...  Start without a config file"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the gateway server
    Run(Box<RunArgs>),

    /// Generate a starter config file
    Init(InitArgs),

    /// Validate a config file without starting
    Validate(ValidateArgs),

    /// Check health of a running instance
    Health(HealthArgs),
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        webhook-gateway run                                  Auto-detect config\n  \
        webhook-gateway run -c gateway.yaml -p 8080 --pretty Local dev mode\n  \
        webhook-gateway run --allow https://a --allow https://b   No config file")]
pub struct RunArgs {
    /// Config file path (.yaml, .json, .toml)
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Additional allowed destination (repeatable, comma-separated in env)
    #[arg(long = "allow", env = "ALLOWED_DESTINATIONS", value_delimiter = ',')]
    pub allow: Vec<String>,

    /// Credential injected into every forwarded request
    #[arg(long, env = "GATEWAY_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Header carrying the credential (overrides the config file)
    #[arg(long, env = "GATEWAY_CREDENTIAL_HEADER")]
    pub credential_header: Option<String>,

    /// Listen port
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Listen address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,

    // -- Observability --
    /// Sentry DSN (enables error tracking)
    #[cfg(feature = "sentry-integration")]
    #[arg(long, env = "SENTRY_DSN", help_heading = "Observability")]
    pub sentry_dsn: Option<String>,

    /// Sentry environment tag
    #[cfg(feature = "sentry-integration")]
    #[arg(long, env = "SENTRY_ENVIRONMENT", help_heading = "Observability")]
    pub sentry_environment: Option<String>,

    // -- Tuning --
    /// Destination timeout in milliseconds (overrides the config file)
    #[arg(long, env = "REQUEST_TIMEOUT_MS", help_heading = "Tuning")]
    pub timeout: Option<u64>,

    /// Max request body size in bytes
    #[arg(
        long,
        env = "MAX_BODY_SIZE",
        default_value_t = crate::server::DEFAULT_MAX_BODY,
        help_heading = "Tuning"
    )]
    pub max_body: usize,
}

impl RunArgs {
    /// `--allow` entries with surrounding whitespace removed and blanks dropped.
    #[must_use]
    pub fn allowed_destinations(&self) -> Vec<String> {
        self.allow
            .iter()
            .map(|d| d.trim())
            .filter(|d| !d.is_empty())
            .map(String::from)
            .collect()
    }

    /// Credential header name: the CLI/env value when given, else `configured`.
    #[must_use]
    pub fn credential_header_or<'a>(&'a self, configured: &'a str) -> &'a str {
        self.credential_header
            .as_deref()
            .filter(|h| !h.is_empty())
            .unwrap_or(configured)
    }
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        webhook-gateway init                           Quick start config (yaml)\n  \
        webhook-gateway init --full                    All options, documented\n  \
        webhook-gateway init -f toml -o gateway.toml   TOML format")]
pub struct InitArgs {
    /// Output format
    #[arg(short, long, default_value = "yaml")]
    pub format: ConfigFormat,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Include every option with its default
    #[arg(long)]
    pub full: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Config file to validate
    #[arg(default_value = "gateway.yaml")]
    pub config: PathBuf,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ValidateFormat,
}

#[derive(Args)]
pub struct HealthArgs {
    /// URL of the running instance
    #[arg(default_value = "http://localhost:3000")]
    pub url: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ValidateFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> RunArgs {
        let mut argv = vec!["webhook-gateway", "run"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Some(Commands::Run(args)) => *args,
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn allow_accepts_repeats_and_commas() {
        let args = parse(&[
            "--api-key",
            "k",
            "--allow",
            "https://a.example,https://b.example",
            "--allow",
            "https://c.example",
        ]);
        assert_eq!(
            args.allow,
            vec!["https://a.example", "https://b.example", "https://c.example"]
        );
    }

    #[test]
    fn allow_entries_are_trimmed() {
        let args = parse(&["--api-key", "k", "--allow", "https://a.example, https://b.example,"]);
        assert_eq!(
            args.allowed_destinations(),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn run_defaults() {
        let args = parse(&["--api-key", "k"]);
        assert_eq!(args.port, 3000);
        assert_eq!(args.max_body, 2 * 1024 * 1024);
        assert!(args.timeout.is_none());
    }

    #[test]
    fn credential_header_precedence() {
        let args = parse(&["--api-key", "k"]);
        assert_eq!(args.credential_header_or("x-from-config"), "x-from-config");

        let args = parse(&["--api-key", "k", "--credential-header", "x-cli"]);
        assert_eq!(args.credential_header_or("x-from-config"), "x-cli");
    }
}
