//! Expense model
//!
//! An expense is paid by one member and is either shared by the household
//! (apportioned by income) or owed in full by a single member.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{ExpenseId, HouseholdId, MemberId};
use super::money::Money;
use super::month::Month;

/// Who is responsible for an expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Responsibility {
    /// Shared across all members in proportion to income
    #[default]
    Household,
    /// Owed entirely by one member, regardless of who paid
    Personal { owing_member_id: MemberId },
}

impl Responsibility {
    pub fn is_household(&self) -> bool {
        matches!(self, Self::Household)
    }

    pub fn owing_member(&self) -> Option<MemberId> {
        match self {
            Self::Household => None,
            Self::Personal { owing_member_id } => Some(*owing_member_id),
        }
    }
}

impl fmt::Display for Responsibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Household => write!(f, "Household"),
            Self::Personal { owing_member_id } => write!(f, "Personal ({})", owing_member_id),
        }
    }
}

/// Validation errors for expenses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseValidationError {
    NonPositiveAmount,
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount => write!(f, "Expense amount must be positive"),
        }
    }
}

impl std::error::Error for ExpenseValidationError {}

/// A single expense paid by a household member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseEntry {
    pub id: ExpenseId,
    pub household_id: HouseholdId,
    pub payer_id: MemberId,
    pub date: NaiveDate,
    pub amount: Money,
    #[serde(default)]
    pub responsibility: Responsibility,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl ExpenseEntry {
    pub fn new(
        household_id: HouseholdId,
        payer_id: MemberId,
        date: NaiveDate,
        amount: Money,
        responsibility: Responsibility,
    ) -> Self {
        Self {
            id: ExpenseId::new(),
            household_id,
            payer_id,
            date,
            amount,
            responsibility,
            description: String::new(),
            created_at: Utc::now(),
        }
    }

    /// Shared household expense
    pub fn household(
        household_id: HouseholdId,
        payer_id: MemberId,
        date: NaiveDate,
        amount: Money,
    ) -> Self {
        Self::new(household_id, payer_id, date, amount, Responsibility::Household)
    }

    /// Expense owed entirely by `owing_member_id`
    pub fn personal(
        household_id: HouseholdId,
        payer_id: MemberId,
        owing_member_id: MemberId,
        date: NaiveDate,
        amount: Money,
    ) -> Self {
        Self::new(
            household_id,
            payer_id,
            date,
            amount,
            Responsibility::Personal { owing_member_id },
        )
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The settlement month this expense belongs to
    pub fn month(&self) -> Month {
        Month::of(self.date)
    }

    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        if !self.amount.is_positive() {
            return Err(ExpenseValidationError::NonPositiveAmount);
        }
        Ok(())
    }
}
