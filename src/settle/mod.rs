//! Monthly settlement computation
//!
//! The pieces run in order: [`apportion`] splits the household expense total
//! by income, [`aggregate`] folds shares, personal expenses and payments into
//! per-member balances, and [`net`] turns balances into transfers. [`compute`]
//! wires them together over a [`LedgerSource`].

pub mod apportion;
pub mod balance;
pub mod engine;
pub mod netting;

pub use apportion::apportion;
pub use balance::aggregate;
pub use engine::{compute, compute_from_records, LedgerSource};
pub use netting::{net, remaining_after};
