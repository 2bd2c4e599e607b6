//! Configuration loading and validation.
//!
//! Defines the [`ConfigSource`] trait for pluggable config backends and the
//! [`ConfigVersion`] enum identifying what was loaded. Configuration is read
//! once at startup; the resulting allow-list and forwarding settings are
//! immutable for the life of the process. Submodules provide the data
//! model, validation logic, and concrete source implementations.

pub mod model;
pub mod sources;
pub mod validation;

use async_trait::async_trait;

use crate::error::GatewayServiceError;
use model::Config;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigVersion {
    Hash(String),
}

impl ConfigVersion {
    /// Short form used in health output and startup logs.
    #[must_use]
    pub fn short(&self) -> &str {
        match self {
            Self::Hash(h) => h.get(..8).unwrap_or(h),
        }
    }
}

// async_trait is required here because ConfigSource is used as Box<dyn ConfigSource>
// and native async fn in traits does not support dyn dispatch.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn load(&self) -> Result<(Config, ConfigVersion), GatewayServiceError>;
}

/// Load from `source`, merge extra allow-list entries, apply `overrides`,
/// and validate the result.
pub async fn load_with_overrides<F>(
    source: &dyn ConfigSource,
    extra_destinations: &[String],
    overrides: F,
) -> Result<(Config, ConfigVersion), GatewayServiceError>
where
    F: FnOnce(&mut Config),
{
    let (mut config, version) = source.load().await?;
    config.extend_destinations(extra_destinations.iter().cloned());
    overrides(&mut config);

    if let Err(errors) = validation::validate(&config) {
        return Err(GatewayServiceError::ConfigValidation { errors });
    }

    Ok((config, version))
}
