//! Household service
//!
//! Households, their settlement policy, and their members.

use crate::audit::EntityType;
use crate::error::{HouseholdError, HouseholdResult};
use crate::models::{Household, HouseholdId, Member, MemberId, Policy};
use crate::storage::Storage;

/// Service for household and member management
pub struct HouseholdService<'a> {
    storage: &'a Storage,
}

impl<'a> HouseholdService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new household with the given settlement policy
    pub fn create(&self, name: &str, policy: Policy) -> HouseholdResult<Household> {
        let name = name.trim();

        if self.storage.households.name_exists(name)? {
            return Err(HouseholdError::Duplicate {
                entity_type: "Household",
                identifier: name.to_string(),
            });
        }

        policy.validate()?;

        let household = Household::new(name, policy);
        household
            .validate()
            .map_err(|e| HouseholdError::Validation(e.to_string()))?;

        self.storage.households.upsert(household.clone())?;
        self.storage.households.save()?;

        self.storage.log_create(
            EntityType::Household,
            household.id.to_string(),
            Some(household.name.clone()),
            &household,
        )?;

        Ok(household)
    }

    pub fn get(&self, id: HouseholdId) -> HouseholdResult<Option<Household>> {
        self.storage.households.get(id)
    }

    /// Find a household by name or ID string
    pub fn find(&self, identifier: &str) -> HouseholdResult<Option<Household>> {
        if let Some(household) = self.storage.households.get_by_name(identifier)? {
            return Ok(Some(household));
        }

        if let Ok(id) = identifier.parse::<HouseholdId>() {
            return self.storage.households.get(id);
        }

        Ok(None)
    }

    pub fn list(&self) -> HouseholdResult<Vec<Household>> {
        self.storage.households.get_all()
    }

    /// Replace a household's settlement policy
    ///
    /// Only affects settlements computed afterwards.
    pub fn set_policy(&self, id: HouseholdId, policy: Policy) -> HouseholdResult<Household> {
        policy.validate()?;

        let mut household = self
            .storage
            .households
            .get(id)?
            .ok_or_else(|| HouseholdError::household_not_found(id.to_string()))?;

        let before = household.clone();
        household.set_policy(policy);

        self.storage.households.upsert(household.clone())?;
        self.storage.households.save()?;

        self.storage.log_update(
            EntityType::Household,
            household.id.to_string(),
            Some(household.name.clone()),
            &before,
            &household,
        )?;

        Ok(household)
    }

    /// Add a member to a household
    pub fn add_member(&self, household_id: HouseholdId, name: &str) -> HouseholdResult<Member> {
        let name = name.trim();

        if self.storage.households.get(household_id)?.is_none() {
            return Err(HouseholdError::household_not_found(household_id.to_string()));
        }

        if self.storage.members.name_exists(household_id, name, None)? {
            return Err(HouseholdError::Duplicate {
                entity_type: "Member",
                identifier: name.to_string(),
            });
        }

        let member = Member::new(household_id, name);
        member
            .validate()
            .map_err(|e| HouseholdError::Validation(e.to_string()))?;

        self.storage.members.upsert(member.clone())?;
        self.storage.members.save()?;

        self.storage.log_create(
            EntityType::Member,
            member.id.to_string(),
            Some(member.name.clone()),
            &member,
        )?;

        Ok(member)
    }

    /// Find a household member by name or ID string
    pub fn find_member(
        &self,
        household_id: HouseholdId,
        identifier: &str,
    ) -> HouseholdResult<Option<Member>> {
        if let Some(member) = self.storage.members.get_by_name(household_id, identifier)? {
            return Ok(Some(member));
        }

        if let Ok(id) = identifier.parse::<MemberId>() {
            return Ok(self
                .storage
                .members
                .get(id)?
                .filter(|m| m.household_id == household_id));
        }

        Ok(None)
    }

    pub fn list_members(&self, household_id: HouseholdId) -> HouseholdResult<Vec<Member>> {
        self.storage.members.get_by_household(household_id)
    }

    pub fn rename_member(&self, id: MemberId, name: &str) -> HouseholdResult<Member> {
        let name = name.trim();

        let mut member = self
            .storage
            .members
            .get(id)?
            .ok_or_else(|| HouseholdError::member_not_found(id.to_string()))?;

        if self
            .storage
            .members
            .name_exists(member.household_id, name, Some(id))?
        {
            return Err(HouseholdError::Duplicate {
                entity_type: "Member",
                identifier: name.to_string(),
            });
        }

        let before = member.clone();
        member.rename(name);
        member
            .validate()
            .map_err(|e| HouseholdError::Validation(e.to_string()))?;

        self.storage.members.upsert(member.clone())?;
        self.storage.members.save()?;

        self.storage.log_update(
            EntityType::Member,
            member.id.to_string(),
            Some(member.name.clone()),
            &before,
            &member,
        )?;

        Ok(member)
    }

    /// Remove a member that no income or expense refers to
    pub fn remove_member(&self, id: MemberId) -> HouseholdResult<Member> {
        let member = self
            .storage
            .members
            .get(id)?
            .ok_or_else(|| HouseholdError::member_not_found(id.to_string()))?;

        if self.storage.incomes.references_member(id)?
            || self.storage.expenses.references_member(id)?
        {
            return Err(HouseholdError::Validation(format!(
                "Member '{}' still has income or expense records. Remove those first.",
                member.name
            )));
        }

        self.storage.members.delete(id)?;
        self.storage.members.save()?;

        self.storage.log_delete(
            EntityType::Member,
            member.id.to_string(),
            Some(member.name.clone()),
            &member,
        )?;

        Ok(member)
    }
}
