use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[error("invalid policy value for {field}: {value}")]
pub struct PolicyError {
    pub field: &'static str,
    pub value: f64,
}

/// Business constants applied after the tiers are merged.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GoalsPolicy {
    /// Number of sub-periods the period target is spread over. This is a
    /// policy value; it does not track the calendar.
    #[serde(default = "default_sub_period_divisor")]
    pub sub_period_divisor: f64,
    /// Fraction of the target below which a customer is critical.
    #[serde(default = "default_warn_ratio")]
    pub warn_ratio: f64,
    /// Open pipeline required per unit of remaining gap.
    #[serde(default = "default_pipeline_multiplier")]
    pub pipeline_multiplier: f64,
}

fn default_sub_period_divisor() -> f64 { 11.0 }
fn default_warn_ratio() -> f64 { 0.8 }
fn default_pipeline_multiplier() -> f64 { 1.2 }

impl Default for GoalsPolicy {
    fn default() -> Self {
        Self {
            sub_period_divisor: default_sub_period_divisor(),
            warn_ratio: default_warn_ratio(),
            pipeline_multiplier: default_pipeline_multiplier(),
        }
    }
}

impl GoalsPolicy {
    pub fn validate(&self) -> Result<(), PolicyError> {
        if !(self.sub_period_divisor.is_finite() && self.sub_period_divisor > 0.0) {
            return Err(PolicyError {
                field: "sub_period_divisor",
                value: self.sub_period_divisor,
            });
        }
        if !(self.warn_ratio > 0.0 && self.warn_ratio <= 1.0) {
            return Err(PolicyError {
                field: "warn_ratio",
                value: self.warn_ratio,
            });
        }
        if !(self.pipeline_multiplier.is_finite() && self.pipeline_multiplier >= 1.0) {
            return Err(PolicyError {
                field: "pipeline_multiplier",
                value: self.pipeline_multiplier,
            });
        }
        Ok(())
    }
}
