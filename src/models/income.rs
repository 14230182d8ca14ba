//! Income record model
//!
//! A member's allocatable income for one month. The amount is computed outside
//! this crate (gross minus deductions) and taken as ground truth by the
//! settlement engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{HouseholdId, IncomeId, MemberId};
use super::money::Money;
use super::month::Month;

/// Validation errors for income records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncomeValidationError {
    NegativeAmount,
}

impl std::fmt::Display for IncomeValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeAmount => write!(f, "Allocatable income cannot be negative"),
        }
    }
}

impl std::error::Error for IncomeValidationError {}

/// Allocatable income of one member for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeRecord {
    pub id: IncomeId,
    pub household_id: HouseholdId,
    pub member_id: MemberId,
    pub month: Month,
    pub allocatable_amount: Money,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IncomeRecord {
    pub fn new(
        household_id: HouseholdId,
        member_id: MemberId,
        month: Month,
        allocatable_amount: Money,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: IncomeId::new(),
            household_id,
            member_id,
            month,
            allocatable_amount,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_amount(&mut self, amount: Money) {
        self.allocatable_amount = amount;
        self.updated_at = Utc::now();
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), IncomeValidationError> {
        if self.allocatable_amount.is_negative() {
            return Err(IncomeValidationError::NegativeAmount);
        }
        Ok(())
    }
}
