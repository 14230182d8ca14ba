//! Expense service
//!
//! Records who paid for what, and whether the cost is shared by the household
//! or owed by one member.

use chrono::NaiveDate;

use crate::audit::EntityType;
use crate::error::{HouseholdError, HouseholdResult};
use crate::models::{ExpenseEntry, ExpenseId, HouseholdId, MemberId, Money, Month, Responsibility};
use crate::storage::Storage;

/// Input for recording an expense
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub payer_id: MemberId,
    pub date: NaiveDate,
    pub amount: Money,
    pub responsibility: Responsibility,
    pub description: String,
}

/// Service for expense management
pub struct ExpenseService<'a> {
    storage: &'a Storage,
}

impl<'a> ExpenseService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record an expense for a household
    pub fn add(&self, household_id: HouseholdId, input: NewExpense) -> HouseholdResult<ExpenseEntry> {
        self.ensure_member_of(household_id, input.payer_id)?;
        if let Some(owing) = input.responsibility.owing_member() {
            self.ensure_member_of(household_id, owing)?;
        }

        let expense = ExpenseEntry::new(
            household_id,
            input.payer_id,
            input.date,
            input.amount,
            input.responsibility,
        )
        .with_description(input.description.trim());

        expense
            .validate()
            .map_err(|e| HouseholdError::Validation(e.to_string()))?;

        self.storage.ensure_month_open(household_id, expense.month())?;

        self.storage.expenses.upsert(expense.clone())?;
        self.storage.expenses.save()?;

        self.storage.log_create(
            EntityType::Expense,
            expense.id.to_string(),
            describe(&expense),
            &expense,
        )?;

        Ok(expense)
    }

    pub fn get(&self, id: ExpenseId) -> HouseholdResult<Option<ExpenseEntry>> {
        self.storage.expenses.get(id)
    }

    /// Find an expense of a household by its full or displayed ID
    pub fn find(
        &self,
        household_id: HouseholdId,
        month: Month,
        identifier: &str,
    ) -> HouseholdResult<Option<ExpenseEntry>> {
        if let Ok(id) = identifier.parse::<ExpenseId>() {
            return Ok(self
                .storage
                .expenses
                .get(id)?
                .filter(|e| e.household_id == household_id));
        }

        Ok(self
            .list_for_month(household_id, month)?
            .into_iter()
            .find(|e| e.id.to_string() == identifier))
    }

    /// Expenses of a household dated within a month
    pub fn list_for_month(
        &self,
        household_id: HouseholdId,
        month: Month,
    ) -> HouseholdResult<Vec<ExpenseEntry>> {
        self.storage.expenses.get_for_month(household_id, month)
    }

    /// Remove an expense from a month that is not finalized
    pub fn remove(&self, id: ExpenseId) -> HouseholdResult<ExpenseEntry> {
        let expense = self
            .storage
            .expenses
            .get(id)?
            .ok_or_else(|| HouseholdError::expense_not_found(id.to_string()))?;

        self.storage
            .ensure_month_open(expense.household_id, expense.month())?;

        self.storage.expenses.delete(id)?;
        self.storage.expenses.save()?;

        self.storage.log_delete(
            EntityType::Expense,
            expense.id.to_string(),
            describe(&expense),
            &expense,
        )?;

        Ok(expense)
    }

    fn ensure_member_of(&self, household_id: HouseholdId, member_id: MemberId) -> HouseholdResult<()> {
        match self.storage.members.get(member_id)? {
            Some(member) if member.household_id == household_id => Ok(()),
            _ => Err(HouseholdError::member_not_found(member_id.to_string())),
        }
    }
}

fn describe(expense: &ExpenseEntry) -> Option<String> {
    if expense.description.is_empty() {
        None
    } else {
        Some(expense.description.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::HouseholdPaths;
    use crate::models::{Member, Policy, SettlementComputation, SettlementSummary};
    use crate::services::HouseholdService;
    use chrono::Utc;
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        storage: Storage,
        ana: Member,
        bo: Member,
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
        Fixture {
            _temp_dir: temp_dir,
            storage,
            ana,
            bo,
        }
    }

    fn march(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn shared(payer: MemberId, cents: i64) -> NewExpense {
        NewExpense {
            payer_id: payer,
            date: march(10),
            amount: Money::from_cents(cents),
            responsibility: Responsibility::Household,
            description: "groceries".into(),
        }
    }

    #[test]
    fn test_add_and_list() {
        let fx = setup();
        let service = ExpenseService::new(&fx.storage);
        let household = fx.ana.household_id;

        service.add(household, shared(fx.ana.id, 5000)).unwrap();
        service
            .add(
                household,
                NewExpense {
                    responsibility: Responsibility::Personal {
                        owing_member_id: fx.bo.id,
                    },
                    ..shared(fx.ana.id, 1200)
                },
            )
            .unwrap();

        let listed = service
            .list_for_month(household, Month::new(2025, 3).unwrap())
            .unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let fx = setup();
        let service = ExpenseService::new(&fx.storage);

        let err = service
            .add(fx.ana.household_id, shared(fx.ana.id, 0))
            .unwrap_err();
        assert!(matches!(err, HouseholdError::Validation(_)));
    }

    #[test]
    fn test_member_from_other_household_rejected() {
        let fx = setup();
        let service = ExpenseService::new(&fx.storage);
        let other = HouseholdService::new(&fx.storage)
            .create("Other", Policy::default())
            .unwrap();

        let err = service.add(other.id, shared(fx.ana.id, 100)).unwrap_err();
        assert!(err.is_not_found());

        let err = service
            .add(
                fx.ana.household_id,
                NewExpense {
                    responsibility: Responsibility::Personal {
                        owing_member_id: MemberId::new(),
                    },
                    ..shared(fx.ana.id, 100)
                },
            )
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_find_by_displayed_id() {
        let fx = setup();
        let service = ExpenseService::new(&fx.storage);
        let month = Month::new(2025, 3).unwrap();
        let expense = service.add(fx.ana.household_id, shared(fx.ana.id, 100)).unwrap();

        let found = service
            .find(fx.ana.household_id, month, &expense.id.to_string())
            .unwrap()
            .unwrap();
        assert_eq!(found.id, expense.id);
        assert!(service
            .find(fx.ana.household_id, month.next(), &expense.id.to_string())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_remove_respects_finalized_month() {
        let fx = setup();
        let service = ExpenseService::new(&fx.storage);
        let household = fx.ana.household_id;
        let first = service.add(household, shared(fx.ana.id, 100)).unwrap();
        let second = service.add(household, shared(fx.bo.id, 100)).unwrap();

        service.remove(first.id).unwrap();
        assert!(service.get(first.id).unwrap().is_none());

        let draft = fx
            .storage
            .settlements
            .put_draft(
                household,
                Month::new(2025, 3).unwrap(),
                Policy::default(),
                SettlementComputation {
                    shares: Vec::new(),
                    balances: Vec::new(),
                    transfers: Vec::new(),
                    summary: SettlementSummary::default(),
                },
                Utc::now(),
            )
            .unwrap();
        fx.storage
            .settlements
            .finalize(draft.id, fx.ana.id, Utc::now())
            .unwrap();

        assert!(matches!(
            service.remove(second.id).unwrap_err(),
            HouseholdError::Locked(_)
        ));
        assert!(matches!(
            service.add(household, shared(fx.ana.id, 100)).unwrap_err(),
            HouseholdError::Locked(_)
        ));
    }
}
