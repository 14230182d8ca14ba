//! Settlement repository for JSON storage
//!
//! Holds at most one settlement per household and month. Status changes are
//! checked and applied under the repository's write lock, so of two
//! concurrent finalize calls on the same draft exactly one succeeds.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::error::HouseholdError;
use crate::models::{
    HouseholdId, MemberId, Month, Policy, Settlement, SettlementComputation, SettlementId,
};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct SettlementData {
    #[serde(default)]
    settlements: Vec<Settlement>,
}

/// Repository for settlement persistence
pub struct SettlementRepository {
    path: PathBuf,
    data: RwLock<HashMap<SettlementId, Settlement>>,
}

impl SettlementRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), HouseholdError> {
        let file_data: SettlementData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.clear();
        for settlement in file_data.settlements {
            data.insert(settlement.id, settlement);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), HouseholdError> {
        let data = self.data.read().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut settlements: Vec<_> = data.values().cloned().collect();
        settlements.sort_by(|a, b| {
            a.household_id
                .cmp(&b.household_id)
                .then(a.month.cmp(&b.month))
        });

        write_json_atomic(&self.path, &SettlementData { settlements })
    }

    pub fn get(&self, id: SettlementId) -> Result<Option<Settlement>, HouseholdError> {
        let data = self.data.read().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.get(&id).cloned())
    }

    /// The settlement of a household for a month, if one exists
    pub fn get_for_month(
        &self,
        household_id: HouseholdId,
        month: Month,
    ) -> Result<Option<Settlement>, HouseholdError> {
        let data = self.data.read().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data
            .values()
            .find(|s| s.household_id == household_id && s.month == month)
            .cloned())
    }

    /// Settlements of a household, most recent month first
    pub fn get_by_household(
        &self,
        household_id: HouseholdId,
    ) -> Result<Vec<Settlement>, HouseholdError> {
        let data = self.data.read().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut settlements: Vec<_> = data
            .values()
            .filter(|s| s.household_id == household_id)
            .cloned()
            .collect();
        settlements.sort_by(|a, b| b.month.cmp(&a.month));
        Ok(settlements)
    }

    /// Check if a household's month has a finalized settlement
    pub fn is_finalized(&self, household_id: HouseholdId, month: Month) -> Result<bool, HouseholdError> {
        Ok(self
            .get_for_month(household_id, month)?
            .is_some_and(|s| s.is_finalized()))
    }

    /// Store a computation as the month's draft
    ///
    /// An existing draft for the same household and month is recomputed in
    /// place and keeps its id. Fails with `IllegalTransition` when the month
    /// is already finalized.
    pub fn put_draft(
        &self,
        household_id: HouseholdId,
        month: Month,
        policy: Policy,
        computation: SettlementComputation,
        computed_at: DateTime<Utc>,
    ) -> Result<Settlement, HouseholdError> {
        let mut data = self.data.write().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let existing = data
            .values_mut()
            .find(|s| s.household_id == household_id && s.month == month);

        if let Some(existing) = existing {
            existing.recompute(policy, computation, computed_at)?;
            return Ok(existing.clone());
        }

        let settlement = Settlement::draft(household_id, month, policy, computation, computed_at);
        data.insert(settlement.id, settlement.clone());
        Ok(settlement)
    }

    /// DRAFT -> FINALIZED as a single check-and-set
    pub fn finalize(
        &self,
        id: SettlementId,
        acting_member_id: MemberId,
        finalized_at: DateTime<Utc>,
    ) -> Result<Settlement, HouseholdError> {
        let mut data = self.data.write().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let settlement = data
            .get_mut(&id)
            .ok_or_else(|| HouseholdError::settlement_not_found(id.to_string()))?;

        settlement.finalize(acting_member_id, finalized_at)?;
        Ok(settlement.clone())
    }

    /// Delete a draft settlement
    pub fn delete(&self, id: SettlementId) -> Result<Settlement, HouseholdError> {
        let mut data = self.data.write().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let settlement = data
            .get(&id)
            .ok_or_else(|| HouseholdError::settlement_not_found(id.to_string()))?;
        settlement.ensure_deletable()?;

        data.remove(&id)
            .ok_or_else(|| HouseholdError::settlement_not_found(id.to_string()))
    }
}
