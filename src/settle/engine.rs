//! Settlement engine
//!
//! Reads one household-month of incomes and expenses from a [`LedgerSource`]
//! and runs apportionment, aggregation and netting over them. The computation
//! is a pure function of the fetched records: the same records always give
//! the same shares, balances, transfers and summary, whatever order the
//! source returns them in.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, error, instrument};

use super::apportion::apportion;
use super::balance::aggregate;
use super::netting::{net, remaining_after};
use crate::error::{HouseholdError, HouseholdResult, InputError};
use crate::models::{
    ExpenseEntry, HouseholdId, IncomeRecord, MemberId, Money, Month, Policy, Responsibility,
    SettlementComputation, SettlementSummary,
};

/// Read-only feed of the records a settlement is computed from
pub trait LedgerSource {
    /// Income records of every member of `household_id` for `month`
    fn fetch_incomes(
        &self,
        household_id: HouseholdId,
        month: Month,
    ) -> HouseholdResult<Vec<IncomeRecord>>;

    /// Expenses of `household_id` dated within `month`
    fn fetch_expenses(
        &self,
        household_id: HouseholdId,
        month: Month,
    ) -> HouseholdResult<Vec<ExpenseEntry>>;
}

/// Fetch a household-month from `source` and compute its settlement
#[instrument(skip(source, policy), fields(household = %household_id, month = %month))]
pub fn compute<S: LedgerSource + ?Sized>(
    source: &S,
    household_id: HouseholdId,
    month: Month,
    policy: &Policy,
) -> HouseholdResult<SettlementComputation> {
    let incomes = source.fetch_incomes(household_id, month)?;
    let expenses = source.fetch_expenses(household_id, month)?;
    debug!(
        incomes = incomes.len(),
        expenses = expenses.len(),
        "fetched settlement inputs"
    );

    compute_from_records(&incomes, &expenses, policy)
}

/// Compute a settlement from already-fetched records
pub fn compute_from_records(
    incomes: &[IncomeRecord],
    expenses: &[ExpenseEntry],
    policy: &Policy,
) -> HouseholdResult<SettlementComputation> {
    policy.validate()?;

    let mut allocations: BTreeMap<MemberId, Money> = BTreeMap::new();
    for income in incomes {
        if income.allocatable_amount.is_negative() {
            return Err(InputError::NegativeAmount {
                what: "allocatable income",
                id: income.member_id.to_string(),
                amount: income.allocatable_amount,
            }
            .into());
        }
        if allocations
            .insert(income.member_id, income.allocatable_amount)
            .is_some()
        {
            return Err(InputError::DuplicateMember(income.member_id).into());
        }
    }
    if allocations.is_empty() {
        return Err(InputError::EmptyIncomes.into());
    }

    let ledger = Ledger::collect(expenses, &allocations)?;

    // BTreeMap iteration is already sorted by member id.
    let sorted_incomes: Vec<(MemberId, Money)> =
        allocations.iter().map(|(id, amount)| (*id, *amount)).collect();
    let shares = apportion(ledger.household_total, &sorted_incomes, policy)?;
    let balances = aggregate(&shares, &ledger.personal_owed, &ledger.paid, &allocations)?;
    let transfers = net(&balances)?;

    let leftover = remaining_after(&balances, &transfers);
    if leftover.values().any(|m| !m.is_zero()) {
        error!(?balances, ?transfers, ?leftover, "transfers do not settle balances");
        return Err(HouseholdError::InvariantViolation(
            "transfers do not settle every balance".into(),
        ));
    }

    let summary = SettlementSummary {
        total_household_expense: ledger.household_total,
        total_personal_expense: ledger.personal_total,
        participant_count: shares.len(),
        transfer_count: transfers.len(),
    };
    debug!(?summary, "computed settlement");

    Ok(SettlementComputation {
        shares,
        balances,
        transfers,
        summary,
    })
}

/// Expense totals folded per member
#[derive(Debug, Default)]
struct Ledger {
    grand_total: Money,
    household_total: Money,
    personal_total: Money,
    personal_owed: BTreeMap<MemberId, Money>,
    paid: BTreeMap<MemberId, Money>,
}

impl Ledger {
    fn collect(
        expenses: &[ExpenseEntry],
        roster: &BTreeMap<MemberId, Money>,
    ) -> HouseholdResult<Self> {
        let mut ledger = Ledger::default();
        let mut seen = BTreeSet::new();

        for expense in expenses {
            if !seen.insert(expense.id) {
                continue;
            }
            if !expense.amount.is_positive() {
                return Err(InputError::NonPositiveExpense {
                    expense_id: expense.id,
                    amount: expense.amount,
                }
                .into());
            }
            require_member(roster, expense.payer_id, || {
                format!("expense {} (payer)", expense.id)
            })?;

            let add = |slot: &mut Money| -> Result<(), InputError> {
                *slot = slot.checked_add(expense.amount).ok_or_else(|| {
                    InputError::AmountOverflow {
                        context: format!("expense {}", expense.id),
                    }
                })?;
                Ok(())
            };

            // Every per-member sum is bounded by the grand total.
            add(&mut ledger.grand_total)?;
            add(ledger.paid.entry(expense.payer_id).or_default())?;

            match expense.responsibility {
                Responsibility::Household => add(&mut ledger.household_total)?,
                Responsibility::Personal { owing_member_id } => {
                    require_member(roster, owing_member_id, || {
                        format!("expense {} (owing member)", expense.id)
                    })?;
                    add(ledger.personal_owed.entry(owing_member_id).or_default())?;
                    add(&mut ledger.personal_total)?;
                }
            }
        }

        Ok(ledger)
    }
}

fn require_member(
    roster: &BTreeMap<MemberId, Money>,
    member_id: MemberId,
    context: impl FnOnce() -> String,
) -> Result<(), InputError> {
    if roster.contains_key(&member_id) {
        Ok(())
    } else {
        Err(InputError::UnknownMember {
            member_id,
            context: context(),
        })
    }
}
