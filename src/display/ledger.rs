//! Income and expense display formatting

use crate::models::{ExpenseEntry, IncomeRecord, Money, Month, Responsibility};

use super::household::MemberNames;

/// Format a month's income records
pub fn format_income_list(
    month: Month,
    incomes: &[IncomeRecord],
    names: &MemberNames,
    symbol: &str,
) -> String {
    if incomes.is_empty() {
        return format!("No income recorded for {}.\n", month);
    }

    let rows: Vec<(String, String, &str)> = incomes
        .iter()
        .map(|r| {
            (
                names.name(r.member_id),
                r.allocatable_amount.format_with_symbol(symbol),
                r.notes.as_str(),
            )
        })
        .collect();

    let name_width = rows.iter().map(|r| r.0.chars().count()).max().unwrap_or(6).max(6);

    let mut output = format!("Allocatable income for {}\n", month);
    output.push_str(&format!(
        "{:<name_width$}  {:>14}  {}\n",
        "Member",
        "Income",
        "Notes",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:->14}  {:-<10}\n",
        "",
        "",
        "",
        name_width = name_width,
    ));
    for (name, amount, notes) in &rows {
        output.push_str(&format!(
            "{:<name_width$}  {:>14}  {}\n",
            name,
            amount,
            notes,
            name_width = name_width,
        ));
    }

    let total: Money = incomes.iter().map(|r| r.allocatable_amount).sum();
    output.push_str(&format!(
        "{:<name_width$}  {:>14}\n",
        "TOTAL",
        total.format_with_symbol(symbol),
        name_width = name_width,
    ));

    output
}

/// Format a month's expenses
pub fn format_expense_list(
    month: Month,
    expenses: &[ExpenseEntry],
    names: &MemberNames,
    symbol: &str,
) -> String {
    if expenses.is_empty() {
        return format!("No expenses recorded for {}.\n", month);
    }

    let payer_width = expenses
        .iter()
        .map(|e| names.name(e.payer_id).chars().count())
        .max()
        .unwrap_or(5)
        .max(5);

    let mut output = format!("Expenses for {}\n", month);
    output.push_str(&format!(
        "{:<12}  {:<10}  {:<payer_width$}  {:>12}  {:<16}  {}\n",
        "ID",
        "Date",
        "Payer",
        "Amount",
        "Owed by",
        "Description",
        payer_width = payer_width,
    ));
    output.push_str(&format!(
        "{:-<12}  {:-<10}  {:-<payer_width$}  {:->12}  {:-<16}  {:-<12}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        payer_width = payer_width,
    ));

    for expense in expenses {
        let owed_by = match expense.responsibility {
            Responsibility::Household => "household".to_string(),
            Responsibility::Personal { owing_member_id } => names.name(owing_member_id),
        };
        output.push_str(&format!(
            "{:<12}  {:<10}  {:<payer_width$}  {:>12}  {:<16}  {}\n",
            expense.id.to_string(),
            expense.date.format("%Y-%m-%d").to_string(),
            names.name(expense.payer_id),
            expense.amount.format_with_symbol(symbol),
            owed_by,
            expense.description,
            payer_width = payer_width,
        ));
    }

    let (shared, personal): (Vec<&ExpenseEntry>, Vec<&ExpenseEntry>) = expenses
        .iter()
        .partition(|e| e.responsibility.is_household());
    let shared_total: Money = shared.iter().map(|e| e.amount).sum();
    let personal_total: Money = personal.iter().map(|e| e.amount).sum();
    output.push_str(&format!(
        "\nHousehold: {}   Personal: {}\n",
        shared_total.format_with_symbol(symbol),
        personal_total.format_with_symbol(symbol),
    ));

    output
}
