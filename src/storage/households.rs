//! Household repository for JSON storage
//!
//! Manages loading and saving households to households.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::HouseholdError;
use crate::models::{Household, HouseholdId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct HouseholdData {
    #[serde(default)]
    households: Vec<Household>,
}

/// Repository for household persistence
pub struct HouseholdRepository {
    path: PathBuf,
    data: RwLock<HashMap<HouseholdId, Household>>,
}

impl HouseholdRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load households from disk
    pub fn load(&self) -> Result<(), HouseholdError> {
        let file_data: HouseholdData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.clear();
        for household in file_data.households {
            data.insert(household.id, household);
        }

        Ok(())
    }

    /// Save households to disk
    pub fn save(&self) -> Result<(), HouseholdError> {
        let data = self.data.read().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut households: Vec<_> = data.values().cloned().collect();
        households.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        write_json_atomic(&self.path, &HouseholdData { households })
    }

    pub fn get(&self, id: HouseholdId) -> Result<Option<Household>, HouseholdError> {
        let data = self.data.read().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.get(&id).cloned())
    }

    /// Get all households, sorted by name
    pub fn get_all(&self) -> Result<Vec<Household>, HouseholdError> {
        let data = self.data.read().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut households: Vec<_> = data.values().cloned().collect();
        households.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(households)
    }

    /// Get a household by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> Result<Option<Household>, HouseholdError> {
        let data = self.data.read().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let name_lower = name.to_lowercase();
        Ok(data
            .values()
            .find(|h| h.name.to_lowercase() == name_lower)
            .cloned())
    }

    /// Insert or update a household
    pub fn upsert(&self, household: Household) -> Result<(), HouseholdError> {
        let mut data = self.data.write().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.insert(household.id, household);
        Ok(())
    }

    /// Check if a household name is already taken
    pub fn name_exists(&self, name: &str) -> Result<bool, HouseholdError> {
        Ok(self.get_by_name(name)?.is_some())
    }

    pub fn count(&self) -> Result<usize, HouseholdError> {
        let data = self.data.read().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.len())
    }
}
