//! Settlement display formatting

use crate::models::{Money, Settlement};

use super::household::MemberNames;

/// Format a settlement: header, per-member breakdown and transfers
pub fn format_settlement_details(
    settlement: &Settlement,
    names: &MemberNames,
    symbol: &str,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Settlement {} ({})\n", settlement.month, settlement.id));
    output.push_str(&format!("  Status:         {}\n", settlement.status));
    output.push_str(&format!("  Policy:         {}\n", settlement.policy));
    output.push_str(&format!(
        "  Computed:       {}\n",
        settlement.computed_at.format("%Y-%m-%d %H:%M")
    ));
    if let (Some(by), Some(at)) = (settlement.finalized_by, settlement.finalized_at) {
        output.push_str(&format!(
            "  Finalized:      {} by {}\n",
            at.format("%Y-%m-%d %H:%M"),
            names.name(by)
        ));
    }
    output.push_str(&format!(
        "  Household:      {}\n",
        settlement.summary.total_household_expense.format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "  Personal:       {}\n",
        settlement.summary.total_personal_expense.format_with_symbol(symbol)
    ));
    output.push('\n');

    let name_width = settlement
        .balances
        .iter()
        .map(|b| names.name(b.member_id).chars().count())
        .max()
        .unwrap_or(6)
        .max(6);

    output.push_str(&format!(
        "{:<name_width$}  {:>12}  {:>12}\n",
        "Member",
        "Share",
        "Balance",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:->12}  {:->12}\n",
        "",
        "",
        "",
        name_width = name_width,
    ));
    for balance in &settlement.balances {
        let share = settlement
            .share_for(balance.member_id)
            .map(|s| s.format_with_symbol(symbol))
            .unwrap_or_else(|| "-".to_string());
        output.push_str(&format!(
            "{:<name_width$}  {:>12}  {:>12}\n",
            names.name(balance.member_id),
            share,
            balance.balance.format_with_symbol(symbol),
            name_width = name_width,
        ));
    }
    output.push('\n');

    if settlement.lines.is_empty() {
        output.push_str("Nothing to settle.\n");
        return output;
    }

    output.push_str("Transfers:\n");
    for line in &settlement.lines {
        output.push_str(&format!(
            "  {} pays {} {}\n",
            names.name(line.from_member_id),
            names.name(line.to_member_id),
            line.amount.format_with_symbol(symbol)
        ));
    }

    output
}

/// Format a household's settlements, one line per month
pub fn format_settlement_list(settlements: &[Settlement], symbol: &str) -> String {
    if settlements.is_empty() {
        return "No settlements found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<7}  {:<12}  {:<9}  {:>12}  {:>9}\n",
        "Month", "ID", "Status", "Household", "Transfers"
    ));
    output.push_str(&format!(
        "{:-<7}  {:-<12}  {:-<9}  {:->12}  {:->9}\n",
        "", "", "", "", ""
    ));

    for settlement in settlements {
        output.push_str(&format!(
            "{:<7}  {:<12}  {:<9}  {:>12}  {:>9}\n",
            settlement.month.to_string(),
            settlement.id.to_string(),
            settlement.status.to_string(),
            settlement
                .summary
                .total_household_expense
                .format_with_symbol(symbol),
            settlement.summary.transfer_count,
        ));
    }

    let moved: Money = settlements
        .iter()
        .flat_map(|s| s.lines.iter())
        .map(|t| t.amount)
        .sum();
    output.push_str(&format!("\nTotal transferred: {}\n", moved.format_with_symbol(symbol)));

    output
}
