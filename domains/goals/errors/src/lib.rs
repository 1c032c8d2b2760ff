use goals_models::{ParseOrderError, PolicyError, Tier};
use thiserror::Error;
use tiered_cache::{CacheError, ConfigError};

#[derive(Debug, Error)]
pub enum GoalsError {
    #[error("invalid scope: {field} {reason}")]
    InvalidScope { field: &'static str, reason: String },
    #[error("Invalid ranking order: {0}")]
    InvalidOrder(#[from] ParseOrderError),
    #[error("{tier} tier failed: {source}")]
    Tier {
        tier: Tier,
        #[source]
        source: CacheError,
    },
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),
}

impl GoalsError {
    pub fn invalid_scope(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidScope {
            field,
            reason: reason.into(),
        }
    }

    /// Whether the error stems from the request rather than a data source.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidScope { .. } | Self::InvalidOrder(_)
        )
    }
}
