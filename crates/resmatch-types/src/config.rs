//! Configuration for a ResourceMatch marketplace instance.

use serde::{Deserialize, Serialize};

use crate::{RegionKey, ResmatchError, Result, constants};

/// Marketplace-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Seconds added after a consumed window before the provider is
    /// matchable again.
    pub match_buffer_secs: u64,
    /// Region addressed by calls that omit one (e.g. `head()`).
    pub default_region: String,
    /// Sweep expired providers from a region before inserting into it.
    pub sweep_on_insert: bool,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            match_buffer_secs: constants::DEFAULT_MATCH_BUFFER_SECS,
            default_region: constants::DEFAULT_REGION.to_string(),
            sweep_on_insert: constants::DEFAULT_SWEEP_ON_INSERT,
        }
    }
}

impl MarketConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.default_region.trim().is_empty() {
            return Err(ResmatchError::Configuration(
                "default_region must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn default_region_key(&self) -> RegionKey {
        RegionKey::new(self.default_region.clone())
    }

    /// Builder-style override of the match buffer.
    #[must_use]
    pub fn with_match_buffer(mut self, secs: u64) -> Self {
        self.match_buffer_secs = secs;
        self
    }

    /// Builder-style override of the insert-time sweep.
    #[must_use]
    pub fn with_sweep_on_insert(mut self, enabled: bool) -> Self {
        self.sweep_on_insert = enabled;
        self
    }
}
