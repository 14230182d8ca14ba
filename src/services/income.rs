//! Income service
//!
//! Maintains each member's allocatable income per month. Months whose
//! settlement is finalized are read-only.

use crate::audit::EntityType;
use crate::error::{HouseholdError, HouseholdResult};
use crate::models::{HouseholdId, IncomeRecord, Member, MemberId, Money, Month};
use crate::storage::Storage;

/// Service for income record management
pub struct IncomeService<'a> {
    storage: &'a Storage,
}

impl<'a> IncomeService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Set a member's allocatable income for a month (insert or update)
    pub fn set_income(
        &self,
        member_id: MemberId,
        month: Month,
        amount: Money,
        notes: Option<String>,
    ) -> HouseholdResult<IncomeRecord> {
        let member = self.member(member_id)?;
        self.storage.ensure_month_open(member.household_id, month)?;

        let label = Some(format!("{} income for {}", member.name, month));

        if let Some(existing) = self.storage.incomes.get_for_member(member_id, month)? {
            let before = existing.clone();
            let mut updated = existing;
            updated.set_amount(amount);
            if let Some(n) = notes {
                updated.set_notes(n);
            }

            updated
                .validate()
                .map_err(|e| HouseholdError::Validation(e.to_string()))?;

            self.storage.incomes.upsert(updated.clone())?;
            self.storage.incomes.save()?;

            self.storage.log_update(
                EntityType::Income,
                updated.id.to_string(),
                label,
                &before,
                &updated,
            )?;

            Ok(updated)
        } else {
            let mut record = IncomeRecord::new(member.household_id, member_id, month, amount);
            if let Some(n) = notes {
                record.set_notes(n);
            }

            record
                .validate()
                .map_err(|e| HouseholdError::Validation(e.to_string()))?;

            self.storage.incomes.upsert(record.clone())?;
            self.storage.incomes.save()?;

            self.storage.log_create(EntityType::Income, record.id.to_string(), label, &record)?;

            Ok(record)
        }
    }

    pub fn get_income(
        &self,
        member_id: MemberId,
        month: Month,
    ) -> HouseholdResult<Option<IncomeRecord>> {
        self.storage.incomes.get_for_member(member_id, month)
    }

    /// All income records of a household for a month
    pub fn list_for_month(
        &self,
        household_id: HouseholdId,
        month: Month,
    ) -> HouseholdResult<Vec<IncomeRecord>> {
        self.storage.incomes.get_for_month(household_id, month)
    }

    /// Remove a member's income record for a month
    ///
    /// Returns false when there was no record.
    pub fn remove_income(&self, member_id: MemberId, month: Month) -> HouseholdResult<bool> {
        let member = self.member(member_id)?;
        self.storage.ensure_month_open(member.household_id, month)?;

        let Some(record) = self.storage.incomes.get_for_member(member_id, month)? else {
            return Ok(false);
        };

        self.storage.incomes.delete(record.id)?;
        self.storage.incomes.save()?;

        self.storage.log_delete(
            EntityType::Income,
            record.id.to_string(),
            Some(format!("{} income for {}", member.name, month)),
            &record,
        )?;

        Ok(true)
    }

    fn member(&self, member_id: MemberId) -> HouseholdResult<Member> {
        self.storage
            .members
            .get(member_id)?
            .ok_or_else(|| HouseholdError::member_not_found(member_id.to_string()))
    }
}
