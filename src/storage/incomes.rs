//! Income record repository
//!
//! Handles persistence of monthly allocatable income to incomes.json. There
//! is at most one record per member and month.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::HouseholdError;
use crate::models::{HouseholdId, IncomeId, IncomeRecord, MemberId, Month};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct IncomeData {
    #[serde(default)]
    incomes: Vec<IncomeRecord>,
}

/// Repository for income records
pub struct IncomeRepository {
    path: PathBuf,
    incomes: RwLock<HashMap<IncomeId, IncomeRecord>>,
}

impl IncomeRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            incomes: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), HouseholdError> {
        let file_data: IncomeData = read_json(&self.path)?;

        let mut incomes = self
            .incomes
            .write()
            .map_err(|e| HouseholdError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        incomes.clear();
        for record in file_data.incomes {
            incomes.insert(record.id, record);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), HouseholdError> {
        let incomes = self
            .incomes
            .read()
            .map_err(|e| HouseholdError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = incomes.values().cloned().collect();
        list.sort_by(|a, b| {
            a.month
                .cmp(&b.month)
                .then(a.member_id.cmp(&b.member_id))
        });

        write_json_atomic(&self.path, &IncomeData { incomes: list })
    }

    pub fn get(&self, id: IncomeId) -> Result<Option<IncomeRecord>, HouseholdError> {
        let incomes = self
            .incomes
            .read()
            .map_err(|e| HouseholdError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(incomes.get(&id).cloned())
    }

    /// The record of one member for one month
    pub fn get_for_member(
        &self,
        member_id: MemberId,
        month: Month,
    ) -> Result<Option<IncomeRecord>, HouseholdError> {
        let incomes = self
            .incomes
            .read()
            .map_err(|e| HouseholdError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(incomes
            .values()
            .find(|r| r.member_id == member_id && r.month == month)
            .cloned())
    }

    /// All records of a household for a month, ordered by member id
    pub fn get_for_month(
        &self,
        household_id: HouseholdId,
        month: Month,
    ) -> Result<Vec<IncomeRecord>, HouseholdError> {
        let incomes = self
            .incomes
            .read()
            .map_err(|e| HouseholdError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = incomes
            .values()
            .filter(|r| r.household_id == household_id && r.month == month)
            .cloned()
            .collect();
        list.sort_by(|a, b| a.member_id.cmp(&b.member_id));
        Ok(list)
    }

    /// Insert or update a record
    ///
    /// A record for the same member and month under a different id is
    /// replaced.
    pub fn upsert(&self, record: IncomeRecord) -> Result<(), HouseholdError> {
        let mut incomes = self
            .incomes
            .write()
            .map_err(|e| HouseholdError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        incomes.retain(|id, r| {
            *id == record.id || !(r.member_id == record.member_id && r.month == record.month)
        });
        incomes.insert(record.id, record);
        Ok(())
    }

    pub fn delete(&self, id: IncomeId) -> Result<Option<IncomeRecord>, HouseholdError> {
        let mut incomes = self
            .incomes
            .write()
            .map_err(|e| HouseholdError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(incomes.remove(&id))
    }

    /// Check if any record belongs to a member
    pub fn references_member(&self, member_id: MemberId) -> Result<bool, HouseholdError> {
        let incomes = self
            .incomes
            .read()
            .map_err(|e| HouseholdError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(incomes.values().any(|r| r.member_id == member_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use tempfile::TempDir;

    fn march() -> Month {
        Month::new(2025, 3).unwrap()
    }

    #[test]
    fn test_upsert_and_get_for_member() {
        let temp_dir = TempDir::new().unwrap();
        let repo = IncomeRepository::new(temp_dir.path().join("incomes.json"));
        let household = HouseholdId::new();
        let member = MemberId::new();

        repo.upsert(IncomeRecord::new(household, member, march(), Money::from_cents(500000)))
            .unwrap();

        let record = repo.get_for_member(member, march()).unwrap().unwrap();
        assert_eq!(record.allocatable_amount.cents(), 500000);
        assert!(repo.get_for_member(member, march().next()).unwrap().is_none());
    }

    #[test]
    fn test_one_record_per_member_and_month() {
        let temp_dir = TempDir::new().unwrap();
        let repo = IncomeRepository::new(temp_dir.path().join("incomes.json"));
        let household = HouseholdId::new();
        let member = MemberId::new();

        repo.upsert(IncomeRecord::new(household, member, march(), Money::from_cents(1)))
            .unwrap();
        repo.upsert(IncomeRecord::new(household, member, march(), Money::from_cents(2)))
            .unwrap();

        let records = repo.get_for_month(household, march()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].allocatable_amount.cents(), 2);
    }

    #[test]
    fn test_get_for_month_filters_household_and_month() {
        let temp_dir = TempDir::new().unwrap();
        let repo = IncomeRepository::new(temp_dir.path().join("incomes.json"));
        let household = HouseholdId::new();
        let member = MemberId::new();

        repo.upsert(IncomeRecord::new(household, member, march(), Money::from_cents(1)))
            .unwrap();
        repo.upsert(IncomeRecord::new(household, member, march().prev(), Money::from_cents(1)))
            .unwrap();
        repo.upsert(IncomeRecord::new(HouseholdId::new(), MemberId::new(), march(), Money::from_cents(1)))
            .unwrap();

        assert_eq!(repo.get_for_month(household, march()).unwrap().len(), 1);
        assert!(repo.references_member(member).unwrap());
        assert!(!repo.references_member(MemberId::new()).unwrap());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("incomes.json");
        let household = HouseholdId::new();
        let record = IncomeRecord::new(household, MemberId::new(), march(), Money::from_cents(42));
        let id = record.id;

        {
            let repo = IncomeRepository::new(path.clone());
            repo.upsert(record).unwrap();
            repo.save().unwrap();
        }

        let repo = IncomeRepository::new(path);
        repo.load().unwrap();
        assert_eq!(repo.get(id).unwrap().unwrap().allocatable_amount.cents(), 42);
        assert!(repo.delete(id).unwrap().is_some());
        assert!(repo.get(id).unwrap().is_none());
    }
}
