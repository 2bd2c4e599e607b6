//! Concrete [`ConfigSource`](super::ConfigSource) implementations.
//!
//! Provides file-based sources (YAML, JSON, TOML) gated by feature flags,
//! the [`env::EnvSource`] built from `--allow` / `ALLOWED_DESTINATIONS`,
//! and the [`parse_config_str`] helper for format-specific deserialization.

pub mod env;
pub mod file_source;

#[cfg(feature = "yaml")]
pub mod yaml;

#[cfg(feature = "json")]
pub mod json;

#[cfg(feature = "toml")]
pub mod toml_source;

use sha2::{Digest, Sha256};

use crate::config::model::Config;
use crate::error::GatewayServiceError;

/// Parse a config string based on file extension.
pub fn parse_config_str(
    ext: &str,
    content: &str,
    path_display: &str,
) -> Result<Config, GatewayServiceError> {
    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => {
            serde_yml::from_str(content).map_err(|e| GatewayServiceError::ConfigParse {
                path: path_display.to_string(),
                source: Box::new(e),
            })
        }

        #[cfg(feature = "json")]
        "json" => serde_json::from_str(content).map_err(|e| GatewayServiceError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "toml")]
        "toml" => toml::from_str(content).map_err(|e| GatewayServiceError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        other => Err(GatewayServiceError::UnsupportedFormat(other.to_string())),
    }
}

/// Compute a lowercase hex-encoded SHA-256 digest.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_is_stable() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let err = parse_config_str("ini", "", "gateway.ini").unwrap_err();
        assert!(matches!(err, GatewayServiceError::UnsupportedFormat(ref e) if e == "ini"));
    }
}
