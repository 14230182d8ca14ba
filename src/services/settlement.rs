//! Settlement service
//!
//! Computes, stores and finalizes monthly settlements. A computation reads the
//! month's incomes and expenses, runs the settlement engine, and writes a
//! DRAFT; running it again replaces that draft in place. Once FINALIZED, a
//! settlement can no longer be recomputed or deleted.

use chrono::Utc;
use tracing::{info, instrument};

use crate::audit::EntityType;
use crate::error::{HouseholdError, HouseholdResult};
use crate::models::{
    Household, HouseholdId, MemberId, Month, Policy, Settlement, SettlementId,
};
use crate::settle;
use crate::storage::Storage;

/// Service for settlement computation and lifecycle
pub struct SettlementService<'a> {
    storage: &'a Storage,
}

impl<'a> SettlementService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Compute (or recompute) the settlement of a household for a month
    ///
    /// `policy` overrides the household's own policy for this computation.
    #[instrument(skip(self, policy), fields(household = %household_id, month = %month))]
    pub fn compute(
        &self,
        household_id: HouseholdId,
        month: Month,
        policy: Option<Policy>,
    ) -> HouseholdResult<Settlement> {
        let _guard = self.storage.lock_settlements()?;

        let household = self.household(household_id)?;
        let policy = policy.unwrap_or(household.policy);

        let existing = self.storage.settlements.get_for_month(household_id, month)?;
        if let Some(existing) = &existing {
            existing.ensure_recomputable()?;
        }

        let computation = settle::compute(self.storage, household_id, month, &policy)?;
        let stored = self.storage.settlements.put_draft(
            household_id,
            month,
            policy,
            computation,
            Utc::now(),
        )?;
        self.storage.settlements.save()?;

        let label = Some(format!("{} {}", household.name, month));
        match existing {
            Some(before) => self.storage.log_update(
                EntityType::Settlement,
                stored.id.to_string(),
                label,
                &before,
                &stored,
            )?,
            None => self.storage.log_create(
                EntityType::Settlement,
                stored.id.to_string(),
                label,
                &stored,
            )?,
        }

        info!(
            settlement = %stored.id,
            transfers = stored.lines.len(),
            "settlement computed"
        );
        Ok(stored)
    }

    pub fn get(&self, id: SettlementId) -> HouseholdResult<Option<Settlement>> {
        self.storage.settlements.get(id)
    }

    pub fn get_for_month(
        &self,
        household_id: HouseholdId,
        month: Month,
    ) -> HouseholdResult<Option<Settlement>> {
        self.storage.settlements.get_for_month(household_id, month)
    }

    /// Settlements of a household, most recent month first
    pub fn list(&self, household_id: HouseholdId) -> HouseholdResult<Vec<Settlement>> {
        self.storage.settlements.get_by_household(household_id)
    }

    /// DRAFT -> FINALIZED on behalf of a household member
    #[instrument(skip(self), fields(settlement = %settlement_id, member = %acting_member_id))]
    pub fn finalize(
        &self,
        settlement_id: SettlementId,
        acting_member_id: MemberId,
    ) -> HouseholdResult<Settlement> {
        let settlement = self
            .storage
            .settlements
            .get(settlement_id)?
            .ok_or_else(|| HouseholdError::settlement_not_found(settlement_id.to_string()))?;

        let member = self
            .storage
            .members
            .get(acting_member_id)?
            .ok_or_else(|| HouseholdError::member_not_found(acting_member_id.to_string()))?;
        if member.household_id != settlement.household_id {
            return Err(HouseholdError::Validation(format!(
                "Member '{}' does not belong to the settlement's household",
                member.name
            )));
        }

        let finalized =
            self.storage
                .settlements
                .finalize(settlement_id, acting_member_id, Utc::now())?;
        self.storage.settlements.save()?;

        self.storage.log_finalize(
            finalized.id.to_string(),
            Some(finalized.month.to_string()),
            &finalized,
            &member.name,
        )?;

        info!("settlement finalized");
        Ok(finalized)
    }

    /// Delete a DRAFT settlement
    pub fn delete(&self, settlement_id: SettlementId) -> HouseholdResult<Settlement> {
        let _guard = self.storage.lock_settlements()?;

        let removed = self.storage.settlements.delete(settlement_id)?;
        self.storage.settlements.save()?;

        self.storage.log_delete(
            EntityType::Settlement,
            removed.id.to_string(),
            Some(removed.month.to_string()),
            &removed,
        )?;

        Ok(removed)
    }

    fn household(&self, id: HouseholdId) -> HouseholdResult<Household> {
        self.storage
            .households
            .get(id)?
            .ok_or_else(|| HouseholdError::household_not_found(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::HouseholdPaths;
    use crate::models::{Member, Money, Responsibility, SettlementStatus, Transition};
    use crate::services::{ExpenseService, HouseholdService, IncomeService, NewExpense};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        storage: Storage,
        household: HouseholdId,
        ana: Member,
        bo: Member,
    }

    fn march() -> Month {
        Month::new(2025, 3).unwrap()
    }

    fn setup() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let paths = HouseholdPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let households = HouseholdService::new(&storage);
        let household = households.create("Home", Policy::default()).unwrap();
        let ana = households.add_member(household.id, "Ana").unwrap();
        let bo = households.add_member(household.id, "Bo").unwrap();

        let incomes = IncomeService::new(&storage);
        incomes
            .set_income(ana.id, march(), Money::from_cents(300000), None)
            .unwrap();
        incomes
            .set_income(bo.id, march(), Money::from_cents(200000), None)
            .unwrap();

        ExpenseService::new(&storage)
            .add(
                household.id,
                NewExpense {
                    payer_id: ana.id,
                    date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                    amount: Money::from_cents(50000),
                    responsibility: Responsibility::Household,
                    description: "rent".into(),
                },
            )
            .unwrap();

        Fixture {
            _temp_dir: temp_dir,
            storage,
            household: household.id,
            ana,
            bo,
        }
    }

    #[test]
    fn test_compute_creates_draft() {
        let fx = setup();
        let service = SettlementService::new(&fx.storage);

        let settlement = service.compute(fx.household, march(), None).unwrap();
        assert_eq!(settlement.status, SettlementStatus::Draft);
        assert_eq!(settlement.summary.total_household_expense.cents(), 50000);
        assert_eq!(settlement.share_for(fx.ana.id), Some(Money::from_cents(30000)));
        assert_eq!(settlement.share_for(fx.bo.id), Some(Money::from_cents(20000)));
        assert_eq!(settlement.lines.len(), 1);
        assert_eq!(settlement.lines[0].from_member_id, fx.bo.id);
        assert_eq!(settlement.lines[0].to_member_id, fx.ana.id);
        assert_eq!(settlement.lines[0].amount.cents(), 20000);
    }

    #[test]
    fn test_recompute_is_idempotent_and_keeps_id() {
        let fx = setup();
        let service = SettlementService::new(&fx.storage);

        let first = service.compute(fx.household, march(), None).unwrap();
        let second = service.compute(fx.household, march(), None).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.lines, second.lines);
        assert_eq!(first.shares, second.shares);
        assert_eq!(first.balances, second.balances);
        assert_eq!(first.summary, second.summary);
        assert_eq!(service.list(fx.household).unwrap().len(), 1);
    }

    #[test]
    fn test_recompute_with_policy_override() {
        let fx = setup();
        let service = SettlementService::new(&fx.storage);

        service.compute(fx.household, march(), None).unwrap();
        let overridden = service
            .compute(fx.household, march(), Some(Policy::min_share(10)))
            .unwrap();
        assert_eq!(overridden.policy, Policy::min_share(10));
    }

    #[test]
    fn test_finalize_then_recompute_is_illegal() {
        let fx = setup();
        let service = SettlementService::new(&fx.storage);
        let draft = service.compute(fx.household, march(), None).unwrap();

        let finalized = service.finalize(draft.id, fx.bo.id).unwrap();
        assert_eq!(finalized.status, SettlementStatus::Finalized);
        assert_eq!(finalized.finalized_by, Some(fx.bo.id));
        assert!(finalized.finalized_at.is_some());

        let err = service.compute(fx.household, march(), None).unwrap_err();
        assert!(matches!(
            err,
            HouseholdError::IllegalTransition {
                transition: Transition::Recompute,
                ..
            }
        ));

        let stored = service.get(draft.id).unwrap().unwrap();
        assert_eq!(stored.lines, finalized.lines);
    }

    #[test]
    fn test_finalize_twice_is_illegal() {
        let fx = setup();
        let service = SettlementService::new(&fx.storage);
        let draft = service.compute(fx.household, march(), None).unwrap();

        service.finalize(draft.id, fx.ana.id).unwrap();
        let err = service.finalize(draft.id, fx.ana.id).unwrap_err();
        assert!(matches!(
            err,
            HouseholdError::IllegalTransition {
                transition: Transition::Finalize,
                from: SettlementStatus::Finalized,
                ..
            }
        ));
    }

    #[test]
    fn test_finalize_requires_household_member() {
        let fx = setup();
        let service = SettlementService::new(&fx.storage);
        let draft = service.compute(fx.household, march(), None).unwrap();

        let households = HouseholdService::new(&fx.storage);
        let other = households.create("Other", Policy::default()).unwrap();
        let outsider = households.add_member(other.id, "Cy").unwrap();

        assert!(matches!(
            service.finalize(draft.id, outsider.id).unwrap_err(),
            HouseholdError::Validation(_)
        ));
        assert!(service
            .finalize(draft.id, MemberId::new())
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_delete_draft_but_not_finalized() {
        let fx = setup();
        let service = SettlementService::new(&fx.storage);

        let draft = service.compute(fx.household, march(), None).unwrap();
        service.delete(draft.id).unwrap();
        assert!(service.get_for_month(fx.household, march()).unwrap().is_none());

        let draft = service.compute(fx.household, march(), None).unwrap();
        service.finalize(draft.id, fx.ana.id).unwrap();
        let err = service.delete(draft.id).unwrap_err();
        assert!(matches!(
            err,
            HouseholdError::IllegalTransition {
                transition: Transition::Delete,
                ..
            }
        ));
        assert!(service.get(draft.id).unwrap().is_some());
    }

    #[test]
    fn test_compute_without_incomes_is_invalid_input() {
        let fx = setup();
        let service = SettlementService::new(&fx.storage);

        let err = service
            .compute(fx.household, march().next(), None)
            .unwrap_err();
        assert!(err.is_invalid_input());
        assert!(service
            .get_for_month(fx.household, march().next())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_compute_unknown_household() {
        let fx = setup();
        let service = SettlementService::new(&fx.storage);

        let err = service.compute(HouseholdId::new(), march(), None).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_audit_trail() {
        let fx = setup();
        let service = SettlementService::new(&fx.storage);
        let draft = service.compute(fx.household, march(), None).unwrap();
        service.compute(fx.household, march(), None).unwrap();
        service.finalize(draft.id, fx.ana.id).unwrap();

        let entries = fx.storage.audit().read_all().unwrap();
        let settlement_ops: Vec<String> = entries
            .iter()
            .filter(|e| e.entity_type == EntityType::Settlement)
            .map(|e| e.operation.to_string())
            .collect();
        assert_eq!(settlement_ops, vec!["CREATE", "UPDATE", "FINALIZE"]);
    }
}
