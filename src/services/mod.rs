//! Service layer for household-settle
//!
//! Business logic on top of the storage layer: validation, the finalized-month
//! lock, audit logging, and settlement computation.

pub mod expense;
pub mod household;
pub mod income;
pub mod settlement;

pub use expense::{ExpenseService, NewExpense};
pub use household::HouseholdService;
pub use income::IncomeService;
pub use settlement::SettlementService;
