//! JSON export of a settlement
//!
//! A settlement is exported together with its household and members so the
//! file can be read without the rest of the data directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;

use crate::error::{HouseholdError, HouseholdResult};
use crate::models::{Household, Member, Settlement, SettlementId};
use crate::storage::Storage;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// A settlement with the context needed to read it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementExport {
    pub schema_version: String,
    pub exported_at: DateTime<Utc>,
    pub app_version: String,
    pub household: Household,
    pub members: Vec<Member>,
    pub settlement: Settlement,
}

impl SettlementExport {
    /// Gather a settlement, its household and members from storage
    pub fn from_storage(storage: &Storage, settlement_id: SettlementId) -> HouseholdResult<Self> {
        let settlement = storage
            .settlements
            .get(settlement_id)?
            .ok_or_else(|| HouseholdError::settlement_not_found(settlement_id.to_string()))?;
        let household = storage
            .households
            .get(settlement.household_id)?
            .ok_or_else(|| HouseholdError::household_not_found(settlement.household_id.to_string()))?;
        let members = storage.members.get_by_household(household.id)?;

        let export = Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            household,
            members,
            settlement,
        };
        export.validate().map_err(HouseholdError::Export)?;
        Ok(export)
    }

    /// Check the schema version and that every referenced member is present
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }

        if self.settlement.household_id != self.household.id {
            return Err(format!(
                "Settlement {} belongs to another household",
                self.settlement.id
            ));
        }

        let member_ids: HashSet<_> = self.members.iter().map(|m| m.id).collect();
        let referenced = self
            .settlement
            .balances
            .iter()
            .map(|b| b.member_id)
            .chain(self.settlement.shares.iter().map(|s| s.member_id))
            .chain(
                self.settlement
                    .lines
                    .iter()
                    .flat_map(|t| [t.from_member_id, t.to_member_id]),
            );
        for member_id in referenced {
            if !member_ids.contains(&member_id) {
                return Err(format!(
                    "Settlement {} references unknown member {}",
                    self.settlement.id, member_id
                ));
            }
        }

        Ok(())
    }
}

/// Export a settlement to JSON
pub fn export_settlement_json<W: Write>(
    storage: &Storage,
    settlement_id: SettlementId,
    writer: &mut W,
    pretty: bool,
) -> HouseholdResult<()> {
    let export = SettlementExport::from_storage(storage, settlement_id)?;

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| HouseholdError::Export(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::paths::HouseholdPaths;
    use crate::models::{Money, Month, Policy};
    use crate::services::{HouseholdService, IncomeService, SettlementService};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn read_back(json: &str) -> HouseholdResult<SettlementExport> {
        let export: SettlementExport =
            serde_json::from_str(json).map_err(|e| HouseholdError::Export(e.to_string()))?;
        export.validate().map_err(HouseholdError::Export)?;
        Ok(export)
    }

    /// Storage holding one computed settlement with a single transfer
    pub(crate) fn storage_with_settlement() -> (TempDir, Storage, SettlementId) {
        let temp_dir = TempDir::new().unwrap();
        let paths = HouseholdPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let march = Month::new(2025, 3).unwrap();
        let households = HouseholdService::new(&storage);
        let household = households.create("Home", Policy::default()).unwrap();
        let ana = households.add_member(household.id, "Ana").unwrap();
        let bo = households.add_member(household.id, "Bo, Jr.").unwrap();

        let incomes = IncomeService::new(&storage);
        incomes
            .set_income(ana.id, march, Money::from_cents(300000), None)
            .unwrap();
        incomes
            .set_income(bo.id, march, Money::from_cents(200000), None)
            .unwrap();

        crate::services::ExpenseService::new(&storage)
            .add(
                household.id,
                crate::services::NewExpense {
                    payer_id: ana.id,
                    date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                    amount: Money::from_cents(50000),
                    responsibility: crate::models::Responsibility::Household,
                    description: "rent".into(),
                },
            )
            .unwrap();

        let settlement = SettlementService::new(&storage)
            .compute(household.id, march, None)
            .unwrap();
        (temp_dir, storage, settlement.id)
    }

    #[test]
    fn test_json_export_and_import() {
        let (_temp_dir, storage, id) = storage_with_settlement();

        let mut buffer = Vec::new();
        export_settlement_json(&storage, id, &mut buffer, true).unwrap();

        let json = String::from_utf8(buffer).unwrap();
        let imported = read_back(&json).unwrap();
        assert_eq!(imported.settlement.id, id);
        assert_eq!(imported.members.len(), 2);
        assert_eq!(imported.household.name, "Home");
    }

    #[test]
    fn test_read_back_rejects_missing_member() {
        let (_temp_dir, storage, id) = storage_with_settlement();
        let mut export = SettlementExport::from_storage(&storage, id).unwrap();
        export.members.pop();

        let json = serde_json::to_string(&export).unwrap();
        assert!(read_back(&json).is_err());
    }

    #[test]
    fn test_schema_version_mismatch_rejected() {
        let (_temp_dir, storage, id) = storage_with_settlement();
        let mut export = SettlementExport::from_storage(&storage, id).unwrap();
        export.schema_version = "0.9.0".into();

        let err = export.validate().unwrap_err();
        assert!(err.contains("Schema version mismatch"));
    }

    #[test]
    fn test_export_unknown_settlement() {
        let (_temp_dir, storage, _) = storage_with_settlement();
        let mut buffer = Vec::new();
        let err = export_settlement_json(&storage, SettlementId::new(), &mut buffer, false)
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
