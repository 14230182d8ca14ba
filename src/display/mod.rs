//! Display formatting for terminal output
//!
//! Plain-text tables for households, members, the monthly ledger and
//! settlements.

pub mod household;
pub mod ledger;
pub mod settlement;

pub use household::{format_household_list, format_member_list, MemberNames};
pub use ledger::{format_expense_list, format_income_list};
pub use settlement::{format_settlement_details, format_settlement_list};
