//! Expense CLI commands

use clap::Subcommand;

use super::{
    member_names, parse_amount, parse_date, parse_month, resolve_household, resolve_member,
};
use crate::config::settings::Settings;
use crate::display::format_expense_list;
use crate::error::{HouseholdError, HouseholdResult};
use crate::models::Responsibility;
use crate::services::{ExpenseService, NewExpense};
use crate::storage::Storage;

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record an expense
    Add {
        /// Amount paid (e.g., "42.10")
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Member who paid (name or ID)
        #[arg(short, long)]
        payer: String,
        /// Date paid (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Charge the whole amount to this member instead of the household
        #[arg(long, value_name = "MEMBER")]
        personal: Option<String>,
        /// Description
        #[arg(short = 'm', long)]
        description: Option<String>,
    },
    /// List the expenses of a month
    List {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Remove an expense
    Remove {
        /// Expense ID as shown by 'expense list'
        expense: String,
        /// Month the expense belongs to (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },
}

/// Handle an expense command
pub fn handle_expense_command(
    storage: &Storage,
    settings: &Settings,
    household: Option<&str>,
    cmd: ExpenseCommands,
) -> HouseholdResult<()> {
    let household = resolve_household(storage, settings, household)?;
    let service = ExpenseService::new(storage);

    match cmd {
        ExpenseCommands::Add {
            amount,
            payer,
            date,
            personal,
            description,
        } => {
            let payer = resolve_member(storage, &household, &payer)?;
            let responsibility = match personal {
                Some(owing) => Responsibility::Personal {
                    owing_member_id: resolve_member(storage, &household, &owing)?.id,
                },
                None => Responsibility::Household,
            };

            let expense = service.add(
                household.id,
                NewExpense {
                    payer_id: payer.id,
                    date: parse_date(date.as_deref())?,
                    amount: parse_amount(&amount)?,
                    responsibility,
                    description: description.unwrap_or_default(),
                },
            )?;

            println!(
                "Recorded {} paid by {} on {}",
                expense.amount.format_with_symbol(&settings.currency_symbol),
                payer.name,
                expense.date
            );
            println!("  ID: {}", expense.id);
        }

        ExpenseCommands::List { month } => {
            let month = parse_month(month.as_deref())?;
            let expenses = service.list_for_month(household.id, month)?;
            let names = member_names(storage, &household)?;
            print!(
                "{}",
                format_expense_list(month, &expenses, &names, &settings.currency_symbol)
            );
        }

        ExpenseCommands::Remove { expense, month } => {
            let month = parse_month(month.as_deref())?;
            let found = service
                .find(household.id, month, &expense)?
                .ok_or_else(|| HouseholdError::expense_not_found(&expense))?;

            let removed = service.remove(found.id)?;
            println!(
                "Removed expense {} ({})",
                removed.id,
                removed.amount.format_with_symbol(&settings.currency_symbol)
            );
        }
    }

    Ok(())
}
