//! Generic async file-based config source with SHA-256 versioning.
//!
//! [`FileSource`] implements [`ConfigSource`] for any file format by
//! accepting a deserialization function at construction time. It reads the
//! file asynchronously via Tokio and hashes the raw content so the health
//! endpoint can report exactly which file revision is being served.
//! Validation happens after CLI-supplied destinations are merged in.

use std::path::PathBuf;

use async_trait::async_trait;

use super::sha256_hex;
use crate::config::model::Config;
use crate::config::{ConfigSource, ConfigVersion};
use crate::error::GatewayServiceError;

type Deserializer = fn(&str) -> Result<Config, Box<dyn std::error::Error + Send + Sync>>;

pub struct FileSource {
    path: PathBuf,
    name: &'static str,
    deserialize: Deserializer,
}

impl FileSource {
    #[must_use]
    pub fn new(path: PathBuf, name: &'static str, deserialize: Deserializer) -> Self {
        Self {
            path,
            name,
            deserialize,
        }
    }

    async fn read_content(&self) -> Result<String, GatewayServiceError> {
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GatewayServiceError::ConfigFileNotFound {
                    path: self.path.clone(),
                }
            } else {
                GatewayServiceError::Io(e)
            }
        })
    }
}

#[async_trait]
impl ConfigSource for FileSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn load(&self) -> Result<(Config, ConfigVersion), GatewayServiceError> {
        let content = self.read_content().await?;

        let config = (self.deserialize)(&content).map_err(|e| GatewayServiceError::ConfigParse {
            path: self.path.display().to_string(),
            source: e,
        })?;

        let hash = sha256_hex(content.as_bytes());
        Ok((config, ConfigVersion::Hash(hash)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_source(path: PathBuf) -> FileSource {
        FileSource::new(path, "json", |content| {
            serde_json::from_str::<Config>(content)
                .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
        })
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let source = json_source(PathBuf::from("/nonexistent/gateway.json"));
        let err = source.load().await.unwrap_err();
        assert!(matches!(err, GatewayServiceError::ConfigFileNotFound { .. }));
    }

    #[tokio::test]
    async fn loads_and_hashes_content() {
        let path = std::env::temp_dir().join(format!("gateway-{}.json", uuid::Uuid::new_v4()));
        let content = r#"{"destinations": ["https://a.example/hook"]}"#;
        tokio::fs::write(&path, content).await.unwrap();

        let (config, version) = json_source(path.clone()).load().await.unwrap();
        assert_eq!(config.destinations.len(), 1);
        assert_eq!(version, ConfigVersion::Hash(sha256_hex(content.as_bytes())));

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn parse_error_names_the_file() {
        let path = std::env::temp_dir().join(format!("gateway-{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, "{not json").await.unwrap();

        let err = json_source(path.clone()).load().await.unwrap_err();
        match err {
            GatewayServiceError::ConfigParse { path: shown, .. } => {
                assert_eq!(shown, path.display().to_string());
            }
            other => panic!("unexpected error: {other}"),
        }

        let _ = tokio::fs::remove_file(&path).await;
    }
}
