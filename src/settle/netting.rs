//! Transfer netting
//!
//! Turns signed balances into pairwise transfers with greedy
//! largest-magnitude matching: the biggest debtor always pays the biggest
//! creditor as much as both can absorb. This never needs more than `n - 1`
//! transfers for `n` members with a nonzero balance. It is not guaranteed to
//! find the global minimum for every topology.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use tracing::{debug, error};

use crate::error::{HouseholdError, HouseholdResult, InputError};
use crate::models::{MemberId, Money, NetBalance, Transfer};

/// Outstanding amount keyed for the heap: largest amount first, then lowest id
type Party = (i64, Reverse<MemberId>);

/// Compute the transfers that settle `balances`.
///
/// The balances must sum to zero and name each member at most once.
pub fn net(balances: &[NetBalance]) -> HouseholdResult<Vec<Transfer>> {
    let mut seen = BTreeSet::new();
    for entry in balances {
        if !seen.insert(entry.member_id) {
            return Err(InputError::DuplicateMember(entry.member_id).into());
        }
    }

    let sum: i128 = balances
        .iter()
        .map(|b| i128::from(b.balance.cents()))
        .sum();
    if sum != 0 {
        let clamped = sum.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64;
        return Err(InputError::UnbalancedBalances {
            sum: Money::from_cents(clamped),
        }
        .into());
    }

    let mut debtors: BinaryHeap<Party> = BinaryHeap::new();
    let mut creditors: BinaryHeap<Party> = BinaryHeap::new();
    for entry in balances {
        let cents = entry.balance.cents();
        if cents < 0 {
            debtors.push((cents.saturating_neg(), Reverse(entry.member_id)));
        } else if cents > 0 {
            creditors.push((cents, Reverse(entry.member_id)));
        }
    }

    let mut transfers = Vec::with_capacity(debtors.len() + creditors.len());
    while let (Some((debt, Reverse(debtor))), Some((credit, Reverse(creditor)))) =
        (debtors.pop(), creditors.pop())
    {
        let amount = debt.min(credit);
        transfers.push(Transfer {
            from_member_id: debtor,
            to_member_id: creditor,
            amount: Money::from_cents(amount),
        });

        if debt > amount {
            debtors.push((debt - amount, Reverse(debtor)));
        }
        if credit > amount {
            creditors.push((credit - amount, Reverse(creditor)));
        }
    }

    if !debtors.is_empty() || !creditors.is_empty() {
        error!(
            ?balances,
            ?transfers,
            ?debtors,
            ?creditors,
            "netting left unmatched balances"
        );
        return Err(HouseholdError::InvariantViolation(
            "netting left unmatched balances".into(),
        ));
    }

    debug!(
        parties = balances.len(),
        transfers = transfers.len(),
        "netted balances"
    );
    Ok(transfers)
}

/// Apply `transfers` to `balances` and return what remains per member.
///
/// A correct netting leaves every member at zero.
pub fn remaining_after(
    balances: &[NetBalance],
    transfers: &[Transfer],
) -> BTreeMap<MemberId, Money> {
    let mut remaining: BTreeMap<MemberId, Money> = balances
        .iter()
        .map(|b| (b.member_id, b.balance))
        .collect();

    for transfer in transfers {
        *remaining.entry(transfer.from_member_id).or_default() += transfer.amount;
        *remaining.entry(transfer.to_member_id).or_default() -= transfer.amount;
    }

    remaining
}
