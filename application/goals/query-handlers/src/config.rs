use goals_errors::GoalsError;
use goals_models::{GoalsPolicy, Tier};
use serde::Deserialize;
use tiered_cache::{CacheConfig, ConfigError, TierConfig};

fn default_static() -> TierConfig { TierConfig { ttl_secs: 1_800 } }
fn default_periodic() -> TierConfig { TierConfig { ttl_secs: 300 } }
fn default_live() -> TierConfig { TierConfig { ttl_secs: 60 } }

/// Time-to-live of each tier, ordered from least to most volatile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TierTtls {
    #[serde(rename = "static", default = "default_static")]
    pub static_tier: TierConfig,
    #[serde(rename = "periodic", default = "default_periodic")]
    pub periodic_tier: TierConfig,
    #[serde(rename = "live", default = "default_live")]
    pub live_tier: TierConfig,
}

impl Default for TierTtls {
    fn default() -> Self {
        Self {
            static_tier: default_static(),
            periodic_tier: default_periodic(),
            live_tier: default_live(),
        }
    }
}

impl TierTtls {
    pub fn get(&self, tier: Tier) -> TierConfig {
        match tier {
            Tier::Static => self.static_tier,
            Tier::Periodic => self.periodic_tier,
            Tier::Live => self.live_tier,
        }
    }

    pub fn set(&mut self, tier: Tier, config: TierConfig) {
        match tier {
            Tier::Static => self.static_tier = config,
            Tier::Periodic => self.periodic_tier = config,
            Tier::Live => self.live_tier = config,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        Tier::ALL
            .into_iter()
            .try_for_each(|tier| self.get(tier).validate(tier.as_str()))
    }
}

/// What a request does when one tier cannot be computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Serve the tier as empty and flag the response as degraded.
    #[default]
    Degrade,
    FailRequest,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GoalsConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub tiers: TierTtls,
    #[serde(default)]
    pub policy: GoalsPolicy,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl GoalsConfig {
    pub fn validate(&self) -> Result<(), GoalsError> {
        self.cache.validate()?;
        self.tiers.validate()?;
        self.policy.validate()?;
        Ok(())
    }

    pub fn ttl_env_var(tier: Tier) -> &'static str {
        match tier {
            Tier::Static => "GOALS_STATIC_TTL_SECS",
            Tier::Periodic => "GOALS_PERIODIC_TTL_SECS",
            Tier::Live => "GOALS_LIVE_TTL_SECS",
        }
    }

    /// Replaces tier TTLs with the values of their `GOALS_*_TTL_SECS`
    /// variables, read through `lookup`.
    pub fn apply_env_overrides(
        &mut self, lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        for tier in Tier::ALL {
            let var = Self::ttl_env_var(tier);
            let Some(raw) = lookup(var) else {
                continue;
            };
            let ttl_secs = raw.trim().parse::<u64>().map_err(|err| {
                ConfigError::Invalid {
                    field: var,
                    reason: err.to_string(),
                }
            })?;
            self.tiers.set(tier, TierConfig::new(tier.as_str(), ttl_secs)?);
        }
        Ok(())
    }
}
