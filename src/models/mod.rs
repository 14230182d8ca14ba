//! Core data models for household-settle
//!
//! This module contains the data structures of the household domain:
//! households, members, monthly incomes, expenses, and the settlements
//! computed from them.

pub mod expense;
pub mod household;
pub mod ids;
pub mod income;
pub mod money;
pub mod month;
pub mod policy;
pub mod settlement;

pub use expense::{ExpenseEntry, Responsibility};
pub use household::{Household, Member};
pub use ids::{ExpenseId, HouseholdId, IncomeId, MemberId, SettlementId};
pub use income::IncomeRecord;
pub use money::Money;
pub use month::Month;
pub use policy::{Policy, RoundingMode, ZeroIncomePolicy};
pub use settlement::{
    MemberShare, NetBalance, Settlement, SettlementComputation, SettlementStatus,
    SettlementSummary, Transfer, Transition,
};
