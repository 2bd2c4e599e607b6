//! `webhook-gateway init`: generate a starter configuration file.
//!
//! Creates a YAML, JSON, or TOML config file with either minimal
//! or fully documented templates.

use std::path::PathBuf;

use crate::cli::{ConfigFormat, InitArgs};
use crate::error::GatewayServiceError;

pub fn execute(args: &InitArgs) -> Result<(), GatewayServiceError> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("gateway.{}", args.format.extension())));

    if output.exists() {
        return Err(GatewayServiceError::FileExists { path: output });
    }

    std::fs::write(&output, template(&args.format, args.full))?;
    println!("Created {}", output.display());
    println!("Set GATEWAY_API_KEY and run: webhook-gateway run -c {}", output.display());
    Ok(())
}

#[must_use]
pub const fn template(format: &ConfigFormat, full: bool) -> &'static str {
    match (format, full) {
        (ConfigFormat::Yaml, false) => YAML_MINIMAL,
        (ConfigFormat::Yaml, true) => YAML_FULL,
        (ConfigFormat::Json, false) => JSON_MINIMAL,
        (ConfigFormat::Json, true) => JSON_FULL,
        (ConfigFormat::Toml, false) => TOML_MINIMAL,
        (ConfigFormat::Toml, true) => TOML_FULL,
    }
}

const YAML_MINIMAL: &str = r#"# webhook-gateway config

destinations:
  - "https://hook.eu1.make.com/your-scenario-id"
"#;

const YAML_FULL: &str = r#"# webhook-gateway config
#
# All values shown are defaults. Uncomment and modify as needed.
# The credential itself is never stored here: set GATEWAY_API_KEY.

# Exact URLs callers may target via X-Target-Webhook.
destinations:
  - "https://hook.eu1.make.com/your-scenario-id"

forwarding:
  # timeout: 25000                      # Destination deadline in ms
  # user_agent: "webhook-gateway/0.1"   # Sent on every forwarded request
  # credential_header: "x-make-apikey"  # Header carrying GATEWAY_API_KEY

# Lead copies sent to X-Google-Sheets-URL
# fanout:
#   timeout: 10000                      # Unset means no deadline

# Marker merged into raw and empty response wrappers
# responses:
#   raw_marker:
#     field: "success"
#     value: true
"#;

const JSON_MINIMAL: &str = r#"{
  "destinations": [
    "https://hook.eu1.make.com/your-scenario-id"
  ]
}
"#;

const JSON_FULL: &str = r#"{
  "destinations": [
    "https://hook.eu1.make.com/your-scenario-id"
  ],
  "forwarding": {
    "timeout": 25000,
    "credential_header": "x-make-apikey"
  },
  "fanout": {
    "timeout": 10000
  },
  "responses": {
    "raw_marker": { "field": "success", "value": true }
  }
}
"#;

const TOML_MINIMAL: &str = r#"# webhook-gateway config

destinations = ["https://hook.eu1.make.com/your-scenario-id"]
"#;

const TOML_FULL: &str = r#"# webhook-gateway config
#
# All values shown are defaults. Uncomment and modify as needed.
# The credential itself is never stored here: set GATEWAY_API_KEY.

destinations = ["https://hook.eu1.make.com/your-scenario-id"]

[forwarding]
# timeout = 25000
# user_agent = "webhook-gateway/0.1"
# credential_header = "x-make-apikey"

# [fanout]
# timeout = 10000

# [responses.raw_marker]
# field = "success"
# value = true
"#;
