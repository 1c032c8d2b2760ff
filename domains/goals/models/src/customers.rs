use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Customer identifier as issued by the CRM.
pub type EntityId = String;

/// Commercial classification of a customer within a seller's portfolio.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
)]
pub enum CustomerClass {
    A,
    B,
    C,
    #[serde(rename = "INACTIVE")]
    Inactive,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown customer class `{0}`")]
pub struct ParseClassError(pub String);

impl CustomerClass {
    pub const ALL: [CustomerClass; 4] = [Self::A, Self::B, Self::C, Self::Inactive];

    /// Position in the follow-up order; lower comes first.
    pub fn priority(self) -> u8 {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::Inactive => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::Inactive => "INACTIVE",
        }
    }
}

impl fmt::Display for CustomerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CustomerClass {
    type Err = ParseClassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            "INACTIVE" | "I" => Ok(Self::Inactive),
            _ => Err(ParseClassError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_follows_class_order() {
        let mut classes = CustomerClass::ALL;
        classes.reverse();
        classes.sort_by_key(|class| class.priority());

        assert_eq!(classes, CustomerClass::ALL);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("b".parse(), Ok(CustomerClass::B));
        assert_eq!("inactive".parse(), Ok(CustomerClass::Inactive));
        assert_eq!(
            "Z".parse::<CustomerClass>(),
            Err(ParseClassError("Z".into()))
        );
    }
}
