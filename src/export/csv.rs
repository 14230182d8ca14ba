//! CSV export of settlement transfers and member balances

use std::io::Write;

use crate::display::MemberNames;
use crate::error::{HouseholdError, HouseholdResult};
use crate::models::{Money, Settlement, SettlementId};
use crate::storage::Storage;

fn csv_err(e: csv::Error) -> HouseholdError {
    HouseholdError::Export(e.to_string())
}

fn amount(money: Money) -> String {
    money.format_with_symbol("")
}

fn load(storage: &Storage, settlement_id: SettlementId) -> HouseholdResult<(Settlement, MemberNames)> {
    let settlement = storage
        .settlements
        .get(settlement_id)?
        .ok_or_else(|| HouseholdError::settlement_not_found(settlement_id.to_string()))?;
    let members = storage.members.get_by_household(settlement.household_id)?;
    Ok((settlement, MemberNames::new(&members)))
}

/// Export a settlement's transfers, one row per transfer
pub fn export_transfers_csv<W: Write>(
    storage: &Storage,
    settlement_id: SettlementId,
    writer: W,
) -> HouseholdResult<()> {
    let (settlement, names) = load(storage, settlement_id)?;
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(["Month", "Status", "From", "To", "Amount"])
        .map_err(csv_err)?;

    for line in &settlement.lines {
        csv_writer
            .write_record([
                settlement.month.to_string(),
                settlement.status.to_string(),
                names.name(line.from_member_id),
                names.name(line.to_member_id),
                amount(line.amount),
            ])
            .map_err(csv_err)?;
    }

    csv_writer
        .flush()
        .map_err(|e| HouseholdError::Export(e.to_string()))?;
    Ok(())
}

/// Export a settlement's per-member share and balance
pub fn export_balances_csv<W: Write>(
    storage: &Storage,
    settlement_id: SettlementId,
    writer: W,
) -> HouseholdResult<()> {
    let (settlement, names) = load(storage, settlement_id)?;
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(["Month", "Member", "Share", "Balance"])
        .map_err(csv_err)?;

    for balance in &settlement.balances {
        let share = settlement.share_for(balance.member_id).unwrap_or_default();
        csv_writer
            .write_record([
                settlement.month.to_string(),
                names.name(balance.member_id),
                amount(share),
                amount(balance.balance),
            ])
            .map_err(csv_err)?;
    }

    csv_writer
        .flush()
        .map_err(|e| HouseholdError::Export(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::json::tests::storage_with_settlement;

    #[test]
    fn test_transfers_csv() {
        let (_temp_dir, storage, id) = storage_with_settlement();

        let mut buffer = Vec::new();
        export_transfers_csv(&storage, id, &mut buffer).unwrap();
        let csv = String::from_utf8(buffer).unwrap();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Month,Status,From,To,Amount");
        // Names containing commas are quoted.
        assert_eq!(lines[1], "2025-03,draft,\"Bo, Jr.\",Ana,200.00");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_balances_csv() {
        let (_temp_dir, storage, id) = storage_with_settlement();

        let mut buffer = Vec::new();
        export_balances_csv(&storage, id, &mut buffer).unwrap();
        let csv = String::from_utf8(buffer).unwrap();

        assert!(csv.starts_with("Month,Member,Share,Balance\n"));
        assert!(csv.contains("Ana,300.00,200.00"));
        assert!(csv.contains("\"Bo, Jr.\",200.00,-200.00"));
    }

    #[test]
    fn test_unknown_settlement() {
        let (_temp_dir, storage, _) = storage_with_settlement();
        let err = export_transfers_csv(&storage, SettlementId::new(), Vec::new()).unwrap_err();
        assert!(err.is_not_found());
    }
}
