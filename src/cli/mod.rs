//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod expense;
pub mod history;
pub mod household;
pub mod income;
pub mod member;
pub mod settle;

pub use expense::{handle_expense_command, ExpenseCommands};
pub use history::handle_history_command;
pub use household::{handle_household_command, HouseholdCommands};
pub use income::{handle_income_command, IncomeCommands};
pub use member::{handle_member_command, MemberCommands};
pub use settle::{handle_settle_command, SettleCommands};

use chrono::NaiveDate;
use clap::Args;

use crate::config::settings::Settings;
use crate::display::MemberNames;
use crate::error::{HouseholdError, HouseholdResult};
use crate::models::{Household, Member, Money, Month, Policy, RoundingMode, ZeroIncomePolicy};
use crate::services::HouseholdService;
use crate::storage::Storage;

/// Policy flags shared by `household create`, `household policy` and `settle compute`
#[derive(Args, Debug, Default, Clone)]
pub struct PolicyArgs {
    /// Rounding mode (round, floor, ceiling, bankers)
    #[arg(long)]
    pub rounding: Option<String>,
    /// Treatment of members without income (exclude, min_share)
    #[arg(long)]
    pub zero_income: Option<String>,
    /// Share of the total charged to each zero-income member, in percent
    #[arg(long)]
    pub min_share: Option<u8>,
}

impl PolicyArgs {
    pub fn is_empty(&self) -> bool {
        self.rounding.is_none() && self.zero_income.is_none() && self.min_share.is_none()
    }

    /// Apply the given flags on top of `base`
    ///
    /// `--min-share` alone implies the min_share zero-income policy.
    pub fn apply(&self, base: Policy) -> HouseholdResult<Policy> {
        let mut policy = base;

        if let Some(rounding) = &self.rounding {
            policy.rounding_mode = RoundingMode::parse(rounding).ok_or_else(|| {
                HouseholdError::Validation(format!(
                    "Invalid rounding mode: '{}'. Valid modes: round, floor, ceiling, bankers",
                    rounding
                ))
            })?;
        }

        if let Some(zero_income) = &self.zero_income {
            policy.zero_income_policy = ZeroIncomePolicy::parse(zero_income).ok_or_else(|| {
                HouseholdError::Validation(format!(
                    "Invalid zero-income policy: '{}'. Valid policies: exclude, min_share",
                    zero_income
                ))
            })?;
        }

        if let Some(percent) = self.min_share {
            policy.min_share_percent = percent;
            if self.zero_income.is_none() {
                policy.zero_income_policy = ZeroIncomePolicy::MinShare;
            }
        }

        policy.validate()?;
        Ok(policy)
    }
}

/// The household a command acts on: the one named, else the active one
pub fn resolve_household(
    storage: &Storage,
    settings: &Settings,
    identifier: Option<&str>,
) -> HouseholdResult<Household> {
    let service = HouseholdService::new(storage);

    match identifier {
        Some(identifier) => service
            .find(identifier)?
            .ok_or_else(|| HouseholdError::household_not_found(identifier)),
        None => {
            let id = settings.active_household.ok_or_else(|| {
                HouseholdError::Validation(
                    "No active household. Run 'household household use <NAME>' or pass --household."
                        .into(),
                )
            })?;
            service
                .get(id)?
                .ok_or_else(|| HouseholdError::household_not_found(id.to_string()))
        }
    }
}

/// Find a member of `household` by name or ID
pub fn resolve_member(
    storage: &Storage,
    household: &Household,
    identifier: &str,
) -> HouseholdResult<Member> {
    HouseholdService::new(storage)
        .find_member(household.id, identifier)?
        .ok_or_else(|| HouseholdError::member_not_found(identifier))
}

/// Name lookup for every member of a household
pub fn member_names(storage: &Storage, household: &Household) -> HouseholdResult<MemberNames> {
    let members = HouseholdService::new(storage).list_members(household.id)?;
    Ok(MemberNames::new(&members))
}

/// Parse an optional `YYYY-MM`, defaulting to the current month
pub fn parse_month(month: Option<&str>) -> HouseholdResult<Month> {
    match month {
        Some(s) => Month::parse(s).map_err(|e| HouseholdError::Validation(e.to_string())),
        None => Ok(Month::current()),
    }
}

pub fn parse_amount(amount: &str) -> HouseholdResult<Money> {
    Money::parse(amount).map_err(|e| {
        HouseholdError::Validation(format!(
            "Invalid amount: '{}'. Use format like '12.50' or '12'. Error: {}",
            amount, e
        ))
    })
}

/// Parse an optional `YYYY-MM-DD`, defaulting to today
pub fn parse_date(date: Option<&str>) -> HouseholdResult<NaiveDate> {
    match date {
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            HouseholdError::Validation(format!("Invalid date: '{}'. Use YYYY-MM-DD", s))
        }),
        None => Ok(chrono::Local::now().date_naive()),
    }
}
