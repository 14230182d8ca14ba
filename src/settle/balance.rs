//! Per-member net balances
//!
//! A member's balance is what they actually paid minus what they owe: their
//! share of household expenses plus any personal expenses attributed to them.

use std::collections::{BTreeMap, BTreeSet};

use tracing::error;

use crate::error::{HouseholdError, HouseholdResult, InputError};
use crate::models::{MemberId, MemberShare, Money, NetBalance};

/// Combine shares, personal debts and payments into signed balances.
///
/// Every member present in any input gets a balance; `income_allocations`
/// guarantees income-bearing members appear even when all other terms are zero.
/// The result is ordered by member id and must sum to zero; anything else is
/// an upstream logic error.
pub fn aggregate(
    shares: &[MemberShare],
    personal_owed: &BTreeMap<MemberId, Money>,
    paid: &BTreeMap<MemberId, Money>,
    income_allocations: &BTreeMap<MemberId, Money>,
) -> HouseholdResult<Vec<NetBalance>> {
    let mut household_owed: BTreeMap<MemberId, Money> = BTreeMap::new();
    for share in shares {
        if household_owed
            .insert(share.member_id, share.share_amount)
            .is_some()
        {
            error!(member = %share.member_id, ?shares, "member has more than one share");
            return Err(HouseholdError::InvariantViolation(format!(
                "member {} has more than one household share",
                share.member_id
            )));
        }
    }

    let roster: BTreeSet<MemberId> = household_owed
        .keys()
        .chain(personal_owed.keys())
        .chain(paid.keys())
        .chain(income_allocations.keys())
        .copied()
        .collect();

    let lookup = |map: &BTreeMap<MemberId, Money>, id: &MemberId| {
        map.get(id).copied().unwrap_or_default()
    };

    let balances: Vec<NetBalance> = roster
        .iter()
        .map(|id| {
            lookup(paid, id)
                .checked_sub(lookup(&household_owed, id))
                .and_then(|b| b.checked_sub(lookup(personal_owed, id)))
                .map(|balance| NetBalance::new(*id, balance))
                .ok_or_else(|| InputError::AmountOverflow {
                    context: format!("the balance of member {}", id),
                })
        })
        .collect::<Result<_, _>>()?;

    let sum: i128 = balances
        .iter()
        .map(|b| i128::from(b.balance.cents()))
        .sum();
    if sum != 0 {
        error!(
            ?shares,
            ?personal_owed,
            ?paid,
            ?income_allocations,
            ?balances,
            %sum,
            "net balances do not sum to zero"
        );
        return Err(HouseholdError::InvariantViolation(format!(
            "net balances sum to {} instead of zero",
            sum
        )));
    }

    Ok(balances)
}
