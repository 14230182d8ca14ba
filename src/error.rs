//! Custom error types for household-settle
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions. Errors fall into three groups:
//!
//! - recoverable input problems ([`InputError`], wrapped as
//!   [`HouseholdError::InvalidInput`]),
//! - refused lifecycle moves ([`HouseholdError::IllegalTransition`]),
//! - internal invariant violations, which indicate a logic error and are
//!   surfaced to users as an opaque failure.

use thiserror::Error;

use crate::models::{ExpenseId, Money, MemberId, SettlementId, SettlementStatus, Transition};

/// Invalid data handed to the settlement core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// No income records exist for the period, so there is nobody to apportion to
    #[error("no income records were supplied")]
    EmptyIncomes,

    /// An amount that must be non-negative was negative
    #[error("{what} for {id} cannot be negative (got {amount})")]
    NegativeAmount {
        what: &'static str,
        id: String,
        amount: Money,
    },

    /// An expense amount must be strictly positive
    #[error("expense {expense_id} must have a positive amount (got {amount})")]
    NonPositiveExpense { expense_id: ExpenseId, amount: Money },

    /// The minimum share percentage must lie in 0..=100
    #[error("minimum share percent must be between 0 and 100 (got {0})")]
    MinSharePercentOutOfRange(u8),

    /// Every member has zero income, so there is no proportional base
    #[error("cannot apportion {total}: every member has zero allocatable income")]
    NoIncomeBase { total: Money },

    /// The guaranteed minimum shares add up to more than the total
    #[error("minimum shares ({reserved}) exceed the total being apportioned ({total})")]
    MinSharesExceedTotal { reserved: Money, total: Money },

    /// The same member appears more than once
    #[error("member {0} appears more than once")]
    DuplicateMember(MemberId),

    /// A member referenced by an expense has no income record for the period
    #[error("member {member_id} referenced by {context} has no income record for the period")]
    UnknownMember {
        member_id: MemberId,
        context: String,
    },

    /// Adding up amounts went past the representable range
    #[error("amounts overflow while totalling {context}")]
    AmountOverflow { context: String },

    /// Balances passed to netting do not sum to zero
    #[error("balances must sum to zero (sum is {sum})")]
    UnbalancedBalances { sum: Money },
}

/// The main error type for household-settle operations
#[derive(Error, Debug)]
pub enum HouseholdError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid input to the settlement core
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InputError),

    /// A settlement lifecycle transition that is not allowed from its status
    #[error("Cannot {transition} settlement {settlement_id}: it is {from}")]
    IllegalTransition {
        settlement_id: SettlementId,
        from: SettlementStatus,
        transition: Transition,
    },

    /// An internal invariant was broken
    ///
    /// The detail is logged through tracing when the error is raised; the
    /// message shown to users stays generic.
    #[error("internal error: settlement computation failed a consistency check")]
    InvariantViolation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Data belongs to a month whose settlement is finalized
    #[error("Period is locked: {0}")]
    Locked(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl HouseholdError {
    /// Create a "not found" error for households
    pub fn household_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Household",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for members
    pub fn member_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Member",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for income records
    pub fn income_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Income",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for expenses
    pub fn expense_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Expense",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for settlements
    pub fn settlement_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Settlement",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an invalid input error
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Check if this is a refused lifecycle transition
    pub fn is_illegal_transition(&self) -> bool {
        matches!(self, Self::IllegalTransition { .. })
    }

    /// Check if this is an internal invariant violation
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::InvariantViolation(_))
    }
}

impl From<std::io::Error> for HouseholdError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for HouseholdError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for household-settle operations
pub type HouseholdResult<T> = Result<T, HouseholdError>;
