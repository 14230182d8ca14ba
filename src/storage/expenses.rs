//! Expense repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::HouseholdError;
use crate::models::{ExpenseEntry, ExpenseId, HouseholdId, MemberId, Month};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ExpenseData {
    #[serde(default)]
    expenses: Vec<ExpenseEntry>,
}

/// Repository for expense persistence
pub struct ExpenseRepository {
    path: PathBuf,
    data: RwLock<HashMap<ExpenseId, ExpenseEntry>>,
}

impl ExpenseRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), HouseholdError> {
        let file_data: ExpenseData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.clear();
        for expense in file_data.expenses {
            data.insert(expense.id, expense);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), HouseholdError> {
        let data = self.data.read().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut expenses: Vec<_> = data.values().cloned().collect();
        expenses.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));

        write_json_atomic(&self.path, &ExpenseData { expenses })
    }

    pub fn get(&self, id: ExpenseId) -> Result<Option<ExpenseEntry>, HouseholdError> {
        let data = self.data.read().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.get(&id).cloned())
    }

    /// Expenses of a household dated within `month`, ordered by date
    pub fn get_for_month(
        &self,
        household_id: HouseholdId,
        month: Month,
    ) -> Result<Vec<ExpenseEntry>, HouseholdError> {
        let data = self.data.read().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut expenses: Vec<_> = data
            .values()
            .filter(|e| e.household_id == household_id && month.contains(e.date))
            .cloned()
            .collect();
        expenses.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        Ok(expenses)
    }

    pub fn upsert(&self, expense: ExpenseEntry) -> Result<(), HouseholdError> {
        let mut data = self.data.write().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.insert(expense.id, expense);
        Ok(())
    }

    pub fn delete(&self, id: ExpenseId) -> Result<Option<ExpenseEntry>, HouseholdError> {
        let mut data = self.data.write().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        Ok(data.remove(&id))
    }

    /// Check if a member paid for, or owes, any expense
    pub fn references_member(&self, member_id: MemberId) -> Result<bool, HouseholdError> {
        let data = self.data.read().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.values().any(|e| {
            e.payer_id == member_id || e.responsibility.owing_member() == Some(member_id)
        }))
    }
}
