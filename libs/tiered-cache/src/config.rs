use std::time::Duration;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ttl_secs for {tier} must be positive")]
    NonPositiveTtl { tier: String },
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, serde::Deserialize, PartialEq, Eq)]
pub struct CacheConfig {
    /// Entry count above which inserts trigger proactive cleanup.
    #[serde(default = "default_high_water_mark")]
    pub high_water_mark: usize,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

/// Staleness tolerance of one tier.
#[derive(Debug, Clone, Copy, serde::Deserialize, PartialEq, Eq)]
pub struct TierConfig {
    pub ttl_secs: u64,
}

fn default_high_water_mark() -> usize { 10_000 }
fn default_sweep_interval_secs() -> u64 { 60 }

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            high_water_mark: default_high_water_mark(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl CacheConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.high_water_mark == 0 {
            return Err(ConfigError::Invalid {
                field: "high_water_mark",
                reason: "must be at least 1".into(),
            });
        }
        if self.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "sweep_interval_secs",
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }
}

impl TierConfig {
    pub fn new(tier: &str, ttl_secs: u64) -> Result<Self, ConfigError> {
        let config = Self { ttl_secs };
        config.validate(tier)?;
        Ok(config)
    }

    pub fn ttl(&self) -> Duration { Duration::from_secs(self.ttl_secs) }

    pub fn validate(&self, tier: &str) -> Result<(), ConfigError> {
        if self.ttl_secs == 0 {
            return Err(ConfigError::NonPositiveTtl {
                tier: tier.to_string(),
            });
        }
        Ok(())
    }
}
