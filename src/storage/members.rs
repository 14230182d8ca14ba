//! Member repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::HouseholdError;
use crate::models::{HouseholdId, Member, MemberId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct MemberData {
    #[serde(default)]
    members: Vec<Member>,
}

/// Repository for member persistence
pub struct MemberRepository {
    path: PathBuf,
    data: RwLock<HashMap<MemberId, Member>>,
}

impl MemberRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), HouseholdError> {
        let file_data: MemberData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.clear();
        for member in file_data.members {
            data.insert(member.id, member);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), HouseholdError> {
        let data = self.data.read().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut members: Vec<_> = data.values().cloned().collect();
        members.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        write_json_atomic(&self.path, &MemberData { members })
    }

    pub fn get(&self, id: MemberId) -> Result<Option<Member>, HouseholdError> {
        let data = self.data.read().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.get(&id).cloned())
    }

    /// Members of a household, sorted by name
    pub fn get_by_household(&self, household_id: HouseholdId) -> Result<Vec<Member>, HouseholdError> {
        let data = self.data.read().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut members: Vec<_> = data
            .values()
            .filter(|m| m.household_id == household_id)
            .cloned()
            .collect();
        members.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(members)
    }

    /// Find a household member by name (case-insensitive)
    pub fn get_by_name(
        &self,
        household_id: HouseholdId,
        name: &str,
    ) -> Result<Option<Member>, HouseholdError> {
        let name_lower = name.to_lowercase();
        Ok(self
            .get_by_household(household_id)?
            .into_iter()
            .find(|m| m.name.to_lowercase() == name_lower))
    }

    pub fn upsert(&self, member: Member) -> Result<(), HouseholdError> {
        let mut data = self.data.write().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.insert(member.id, member);
        Ok(())
    }

    pub fn delete(&self, id: MemberId) -> Result<bool, HouseholdError> {
        let mut data = self.data.write().map_err(|e| {
            HouseholdError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        Ok(data.remove(&id).is_some())
    }

    /// Check if a name is taken within a household
    pub fn name_exists(
        &self,
        household_id: HouseholdId,
        name: &str,
        exclude_id: Option<MemberId>,
    ) -> Result<bool, HouseholdError> {
        let name_lower = name.to_lowercase();
        Ok(self
            .get_by_household(household_id)?
            .iter()
            .any(|m| m.name.to_lowercase() == name_lower && Some(m.id) != exclude_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, MemberRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = MemberRepository::new(temp_dir.path().join("members.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_members_scoped_to_household() {
        let (_temp_dir, repo) = create_test_repo();
        let home = HouseholdId::new();
        let other = HouseholdId::new();

        repo.upsert(Member::new(home, "Bea")).unwrap();
        repo.upsert(Member::new(home, "Ana")).unwrap();
        repo.upsert(Member::new(other, "Cy")).unwrap();

        let names: Vec<String> = repo
            .get_by_household(home)
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["Ana", "Bea"]);
    }

    #[test]
    fn test_name_lookup_and_uniqueness() {
        let (_temp_dir, repo) = create_test_repo();
        let home = HouseholdId::new();
        let ana = Member::new(home, "Ana");
        let ana_id = ana.id;
        repo.upsert(ana).unwrap();

        assert_eq!(repo.get_by_name(home, "ana").unwrap().unwrap().id, ana_id);
        assert!(repo.name_exists(home, "ANA", None).unwrap());
        assert!(!repo.name_exists(home, "Ana", Some(ana_id)).unwrap());
        assert!(!repo.name_exists(HouseholdId::new(), "Ana", None).unwrap());
    }

    #[test]
    fn test_delete_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let home = HouseholdId::new();
        let keep = Member::new(home, "Keep");
        let gone = Member::new(home, "Gone");
        let (keep_id, gone_id) = (keep.id, gone.id);
        repo.upsert(keep).unwrap();
        repo.upsert(gone).unwrap();

        assert!(repo.delete(gone_id).unwrap());
        assert!(!repo.delete(gone_id).unwrap());
        repo.save().unwrap();

        let reloaded = MemberRepository::new(temp_dir.path().join("members.json"));
        reloaded.load().unwrap();
        assert!(reloaded.get(keep_id).unwrap().is_some());
        assert!(reloaded.get(gone_id).unwrap().is_none());
    }
}
