//! Property-based tests for the settlement engine
//!
//! - Conservation: shares add up to the household expense total
//! - Balances always sum to zero
//! - Applying the transfers zeroes every balance, with no self transfers
//! - The result does not depend on input order
//! - The rounding mode never changes any total

use chrono::NaiveDate;
use household::models::{
    ExpenseEntry, HouseholdId, IncomeRecord, MemberId, Money, Month, NetBalance, Policy,
    RoundingMode,
};
use household::settle::{apportion, compute_from_records, net, remaining_after};
use proptest::prelude::*;
use uuid::Uuid;

fn member(index: usize) -> MemberId {
    MemberId::from_uuid(Uuid::from_u128(index as u128 + 1))
}

fn month() -> Month {
    Month::new(2025, 3).unwrap()
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
}

/// Strategy for rounding modes
fn rounding_strategy() -> impl Strategy<Value = RoundingMode> {
    prop_oneof![
        Just(RoundingMode::Round),
        Just(RoundingMode::Floor),
        Just(RoundingMode::Ceiling),
        Just(RoundingMode::Bankers),
    ]
}

/// Strategy for member incomes with at least one earner
fn incomes_strategy() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(0i64..1_000_000, 1..6)
        .prop_filter("someone must earn", |incomes| incomes.iter().any(|&i| i > 0))
}

/// An expense as (payer index, owing member index if personal, amount)
type RawExpense = (usize, Option<usize>, i64);

fn expenses_strategy() -> impl Strategy<Value = Vec<RawExpense>> {
    prop::collection::vec(
        (0usize..6, prop::option::of(0usize..6), 1i64..100_000),
        0..12,
    )
}

/// Build records for a household, folding member indexes onto the roster
fn records(
    household: HouseholdId,
    incomes: &[i64],
    expenses: &[RawExpense],
) -> (Vec<IncomeRecord>, Vec<ExpenseEntry>) {
    let count = incomes.len();
    let income_records = incomes
        .iter()
        .enumerate()
        .map(|(i, &cents)| IncomeRecord::new(household, member(i), month(), Money::from_cents(cents)))
        .collect();

    let expense_entries = expenses
        .iter()
        .map(|&(payer, owing, cents)| {
            let payer = member(payer % count);
            let amount = Money::from_cents(cents);
            match owing {
                Some(owing) => {
                    ExpenseEntry::personal(household, payer, member(owing % count), day(), amount)
                }
                None => ExpenseEntry::household(household, payer, day(), amount),
            }
        })
        .collect();

    (income_records, expense_entries)
}

proptest! {
    #[test]
    fn prop_settlement_conserves_and_settles(
        incomes in incomes_strategy(),
        expenses in expenses_strategy(),
        rounding in rounding_strategy(),
    ) {
        let household = HouseholdId::new();
        let (income_records, expense_entries) = records(household, &incomes, &expenses);
        let policy = Policy::default().with_rounding(rounding);

        let result = compute_from_records(&income_records, &expense_entries, &policy).unwrap();

        let household_total: i64 = expense_entries
            .iter()
            .filter(|e| e.responsibility.is_household())
            .map(|e| e.amount.cents())
            .sum();
        let share_sum: i64 = result.shares.iter().map(|s| s.share_amount.cents()).sum();
        prop_assert_eq!(share_sum, household_total);
        prop_assert!(result.shares.iter().all(|s| !s.share_amount.is_negative()));

        let balance_sum: i64 = result.balances.iter().map(|b| b.balance.cents()).sum();
        prop_assert_eq!(balance_sum, 0);

        let leftover = remaining_after(&result.balances, &result.transfers);
        prop_assert!(leftover.values().all(|m| m.is_zero()));

        for transfer in &result.transfers {
            prop_assert!(transfer.amount.is_positive());
            prop_assert_ne!(transfer.from_member_id, transfer.to_member_id);
        }

        let nonzero = result.balances.iter().filter(|b| !b.balance.is_zero()).count();
        prop_assert!(result.transfers.len() <= nonzero.saturating_sub(1));
        prop_assert_eq!(result.summary.transfer_count, result.transfers.len());
    }

    #[test]
    fn prop_settlement_ignores_input_order(
        incomes in incomes_strategy(),
        expenses in expenses_strategy(),
    ) {
        let household = HouseholdId::new();
        let (income_records, expense_entries) = records(household, &incomes, &expenses);
        let policy = Policy::default();

        let forward = compute_from_records(&income_records, &expense_entries, &policy).unwrap();

        let reversed_incomes: Vec<_> = income_records.iter().rev().cloned().collect();
        let reversed_expenses: Vec<_> = expense_entries.iter().rev().cloned().collect();
        let backward = compute_from_records(&reversed_incomes, &reversed_expenses, &policy).unwrap();

        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn prop_rounding_mode_keeps_totals(
        incomes in incomes_strategy(),
        total in 0i64..10_000_000,
    ) {
        let roster: Vec<(MemberId, Money)> = incomes
            .iter()
            .enumerate()
            .map(|(i, &cents)| (member(i), Money::from_cents(cents)))
            .collect();
        let income_sum: i128 = incomes.iter().map(|&i| i128::from(i)).sum();

        for rounding in [
            RoundingMode::Round,
            RoundingMode::Floor,
            RoundingMode::Ceiling,
            RoundingMode::Bankers,
        ] {
            let policy = Policy::default().with_rounding(rounding);
            let shares = apportion(Money::from_cents(total), &roster, &policy).unwrap();

            let sum: i64 = shares.iter().map(|s| s.share_amount.cents()).sum();
            prop_assert_eq!(sum, total);

            // Each share stays within two units of its exact proportional value.
            for (share, &(_, income)) in shares.iter().zip(roster.iter()) {
                let exact = i128::from(total) * i128::from(income.cents());
                let actual = i128::from(share.share_amount.cents()) * income_sum;
                prop_assert!((actual - exact).abs() < 2 * income_sum);
                if income.is_zero() {
                    prop_assert!(share.share_amount.is_zero());
                }
            }
        }
    }

    #[test]
    fn prop_min_share_charges_zero_earners(
        earners in prop::collection::vec(1i64..1_000_000, 1..4),
        idle in 1usize..3,
        percent in 0u8..=30,
        total in 0i64..1_000_000,
    ) {
        let mut roster: Vec<(MemberId, Money)> = earners
            .iter()
            .enumerate()
            .map(|(i, &cents)| (member(i), Money::from_cents(cents)))
            .collect();
        for j in 0..idle {
            roster.push((member(earners.len() + j), Money::zero()));
        }

        let shares = apportion(Money::from_cents(total), &roster, &Policy::min_share(percent)).unwrap();
        let minimum = total * i64::from(percent) / 100;

        let sum: i64 = shares.iter().map(|s| s.share_amount.cents()).sum();
        prop_assert_eq!(sum, total);
        for share in &shares {
            let is_idle = roster
                .iter()
                .any(|&(id, income)| id == share.member_id && income.is_zero());
            if is_idle {
                prop_assert_eq!(share.share_amount.cents(), minimum);
            }
        }
    }

    #[test]
    fn prop_netting_settles_any_balanced_set(
        raw in prop::collection::vec(-1_000_000i64..1_000_000, 1..8),
    ) {
        // Force the balances to sum to zero through the last member.
        let mut balances: Vec<NetBalance> = raw
            .iter()
            .enumerate()
            .map(|(i, &cents)| NetBalance::new(member(i), Money::from_cents(cents)))
            .collect();
        let sum: i64 = raw.iter().sum();
        balances.push(NetBalance::new(member(raw.len()), Money::from_cents(-sum)));

        let transfers = net(&balances).unwrap();
        let leftover = remaining_after(&balances, &transfers);
        prop_assert!(leftover.values().all(|m| m.is_zero()));

        let nonzero = balances.iter().filter(|b| !b.balance.is_zero()).count();
        prop_assert!(transfers.len() <= nonzero.saturating_sub(1));
    }
}
