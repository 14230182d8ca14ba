//! Apportionment policy
//!
//! A household-scoped configuration that controls how shared expenses are
//! rounded and how members without income are treated.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::InputError;

/// How a member's ideal (fractional) share is turned into an integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMode {
    /// Nearest integer, ties away from zero
    #[default]
    Round,
    Floor,
    Ceiling,
    /// Nearest integer, ties to even
    Bankers,
}

impl RoundingMode {
    /// Parse a rounding mode from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "round" | "nearest" => Some(Self::Round),
            "floor" | "down" => Some(Self::Floor),
            "ceiling" | "ceil" | "up" => Some(Self::Ceiling),
            "bankers" | "banker" | "half-even" | "half_even" => Some(Self::Bankers),
            _ => None,
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Round => write!(f, "round"),
            Self::Floor => write!(f, "floor"),
            Self::Ceiling => write!(f, "ceiling"),
            Self::Bankers => write!(f, "bankers"),
        }
    }
}

/// What happens to members whose allocatable income is zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ZeroIncomePolicy {
    /// Zero-income members pay nothing toward household expenses
    #[default]
    Exclude,
    /// Zero-income members pay a fixed percentage of the total
    MinShare,
}

impl ZeroIncomePolicy {
    /// Parse a zero-income policy from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "exclude" => Some(Self::Exclude),
            "min_share" | "min-share" | "minshare" => Some(Self::MinShare),
            _ => None,
        }
    }
}

impl fmt::Display for ZeroIncomePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exclude => write!(f, "exclude"),
            Self::MinShare => write!(f, "min_share"),
        }
    }
}

/// Household apportionment policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Policy {
    #[serde(default)]
    pub rounding_mode: RoundingMode,
    #[serde(default)]
    pub zero_income_policy: ZeroIncomePolicy,
    /// Only consulted under [`ZeroIncomePolicy::MinShare`]
    #[serde(default)]
    pub min_share_percent: u8,
}

impl Policy {
    pub fn new(
        rounding_mode: RoundingMode,
        zero_income_policy: ZeroIncomePolicy,
        min_share_percent: u8,
    ) -> Self {
        Self {
            rounding_mode,
            zero_income_policy,
            min_share_percent,
        }
    }

    /// Minimum-share policy at the given percentage with default rounding
    pub fn min_share(percent: u8) -> Self {
        Self::new(RoundingMode::default(), ZeroIncomePolicy::MinShare, percent)
    }

    pub fn with_rounding(mut self, rounding_mode: RoundingMode) -> Self {
        self.rounding_mode = rounding_mode;
        self
    }

    pub fn validate(&self) -> Result<(), InputError> {
        if self.min_share_percent > 100 {
            return Err(InputError::MinSharePercentOutOfRange(
                self.min_share_percent,
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.zero_income_policy {
            ZeroIncomePolicy::Exclude => write!(f, "{}, exclude", self.rounding_mode),
            ZeroIncomePolicy::MinShare => write!(
                f,
                "{}, min_share {}%",
                self.rounding_mode, self.min_share_percent
            ),
        }
    }
}
