//! Config source for deployments without a config file.
//!
//! Builds a default [`Config`] whose allow-list is the destinations given
//! on the command line or in `ALLOWED_DESTINATIONS`. The version hash is
//! computed over the newline-joined list.

use async_trait::async_trait;

use super::sha256_hex;
use crate::config::model::Config;
use crate::config::{ConfigSource, ConfigVersion};
use crate::error::GatewayServiceError;

pub struct EnvSource {
    destinations: Vec<String>,
}

impl EnvSource {
    #[must_use]
    pub const fn new(destinations: Vec<String>) -> Self {
        Self { destinations }
    }
}

#[async_trait]
impl ConfigSource for EnvSource {
    fn name(&self) -> &'static str {
        "env"
    }

    async fn load(&self) -> Result<(Config, ConfigVersion), GatewayServiceError> {
        let hash = sha256_hex(self.destinations.join("\n").as_bytes());
        Ok((
            Config::with_destinations(self.destinations.clone()),
            ConfigVersion::Hash(hash),
        ))
    }
}
