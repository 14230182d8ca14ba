//! Income CLI commands

use clap::Subcommand;

use super::{member_names, parse_amount, parse_month, resolve_household, resolve_member};
use crate::config::settings::Settings;
use crate::display::format_income_list;
use crate::error::HouseholdResult;
use crate::services::IncomeService;
use crate::storage::Storage;

/// Income subcommands
#[derive(Subcommand)]
pub enum IncomeCommands {
    /// Set a member's allocatable income for a month
    Set {
        /// Member name or ID
        member: String,
        /// Amount after deductions (e.g., "3000.00")
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
        /// Notes
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List the incomes of a month
    List {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Remove a member's income for a month
    Remove {
        /// Member name or ID
        member: String,
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },
}

/// Handle an income command
pub fn handle_income_command(
    storage: &Storage,
    settings: &Settings,
    household: Option<&str>,
    cmd: IncomeCommands,
) -> HouseholdResult<()> {
    let household = resolve_household(storage, settings, household)?;
    let service = IncomeService::new(storage);

    match cmd {
        IncomeCommands::Set {
            member,
            amount,
            month,
            notes,
        } => {
            let member = resolve_member(storage, &household, &member)?;
            let month = parse_month(month.as_deref())?;
            let amount = parse_amount(&amount)?;

            let record = service.set_income(member.id, month, amount, notes)?;
            println!(
                "Set {} income for {} to {}",
                member.name,
                month,
                record
                    .allocatable_amount
                    .format_with_symbol(&settings.currency_symbol)
            );
        }

        IncomeCommands::List { month } => {
            let month = parse_month(month.as_deref())?;
            let incomes = service.list_for_month(household.id, month)?;
            let names = member_names(storage, &household)?;
            print!(
                "{}",
                format_income_list(month, &incomes, &names, &settings.currency_symbol)
            );
        }

        IncomeCommands::Remove { member, month } => {
            let member = resolve_member(storage, &household, &member)?;
            let month = parse_month(month.as_deref())?;

            if service.remove_income(member.id, month)? {
                println!("Removed {} income for {}", member.name, month);
            } else {
                println!("{} has no income recorded for {}", member.name, month);
            }
        }
    }

    Ok(())
}
