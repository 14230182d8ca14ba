//! Income-proportional apportionment
//!
//! Splits a household expense total across members in proportion to their
//! allocatable income. All arithmetic is exact integer arithmetic; after each
//! member's ideal share is rounded, the leftover units (the residual) are
//! handed out one at a time so the shares always add up to the total.

use std::cmp::{Ordering, Reverse};

use tracing::error;

use crate::error::{HouseholdError, HouseholdResult, InputError};
use crate::models::{MemberId, MemberShare, Money, Policy, RoundingMode, ZeroIncomePolicy};

/// One member's proportional slice before residual distribution
#[derive(Debug, Clone, Copy)]
struct Portion {
    member_id: MemberId,
    /// Integer part of the ideal share
    floor: i128,
    /// Numerator of the fractional part, over the shared denominator
    fraction: i128,
    rounded: i128,
}

/// Split `total` across `incomes` according to `policy`.
///
/// The returned shares are ordered by member id and always sum to `total`.
pub fn apportion(
    total: Money,
    incomes: &[(MemberId, Money)],
    policy: &Policy,
) -> HouseholdResult<Vec<MemberShare>> {
    policy.validate()?;
    let members = validated_incomes(total, incomes)?;

    let shares = if total.is_zero() {
        members.iter().map(|&(id, _)| (id, 0)).collect()
    } else {
        match policy.zero_income_policy {
            ZeroIncomePolicy::Exclude => split_excluding_zero_income(total, &members, policy)?,
            ZeroIncomePolicy::MinShare => split_with_min_share(total, &members, policy)?,
        }
    };

    let shares: Vec<MemberShare> = shares
        .into_iter()
        .map(|(member_id, amount)| MemberShare {
            member_id,
            share_amount: Money::from_cents(amount),
        })
        .collect();

    let sum: Money = shares.iter().map(|s| s.share_amount).sum();
    if sum != total {
        error!(
            ?shares,
            ?incomes,
            ?policy,
            %total,
            %sum,
            "apportioned shares do not add up to the total"
        );
        return Err(HouseholdError::InvariantViolation(format!(
            "shares sum to {} but {} was apportioned",
            sum, total
        )));
    }

    Ok(shares)
}

/// Validate amounts and return `(member, income)` pairs sorted by member id
fn validated_incomes(
    total: Money,
    incomes: &[(MemberId, Money)],
) -> Result<Vec<(MemberId, i64)>, InputError> {
    if incomes.is_empty() {
        return Err(InputError::EmptyIncomes);
    }
    if total.is_negative() {
        return Err(InputError::NegativeAmount {
            what: "apportioned total",
            id: "household".to_string(),
            amount: total,
        });
    }

    let mut members: Vec<(MemberId, i64)> = Vec::with_capacity(incomes.len());
    for &(member_id, amount) in incomes {
        if amount.is_negative() {
            return Err(InputError::NegativeAmount {
                what: "allocatable income",
                id: member_id.to_string(),
                amount,
            });
        }
        members.push((member_id, amount.cents()));
    }

    members.sort_by_key(|&(id, _)| id);
    if let Some(pair) = members.windows(2).find(|pair| pair[0].0 == pair[1].0) {
        return Err(InputError::DuplicateMember(pair[0].0));
    }

    Ok(members)
}

fn split_excluding_zero_income(
    total: Money,
    members: &[(MemberId, i64)],
    policy: &Policy,
) -> HouseholdResult<Vec<(MemberId, i64)>> {
    if members.iter().all(|&(_, income)| income == 0) {
        return Err(InputError::NoIncomeBase { total }.into());
    }

    // Zero-income members carry zero weight, so they drop out of the pool.
    proportional(total.cents(), members, policy.rounding_mode)
}

fn split_with_min_share(
    total: Money,
    members: &[(MemberId, i64)],
    policy: &Policy,
) -> HouseholdResult<Vec<(MemberId, i64)>> {
    let minimum = i128::from(total.cents()) * i128::from(policy.min_share_percent) / 100;
    let zero_count = members.iter().filter(|&&(_, income)| income == 0).count();
    let reserved = minimum * zero_count as i128;

    if reserved > i128::from(total.cents()) {
        return Err(InputError::MinSharesExceedTotal {
            reserved: Money::from_cents(clamp_to_i64(reserved)),
            total,
        }
        .into());
    }
    // Bounded by `total` above, so these fit back into i64.
    let minimum = clamp_to_i64(minimum);
    let remainder = total.cents() - clamp_to_i64(reserved);

    // With nobody earning, the remainder is split evenly.
    let weights: Vec<(MemberId, i64)> = if members.iter().any(|&(_, income)| income > 0) {
        members.to_vec()
    } else {
        members.iter().map(|&(id, _)| (id, 1)).collect()
    };

    let mut shares = proportional(remainder, &weights, policy.rounding_mode)?;
    for (share, &(_, income)) in shares.iter_mut().zip(members) {
        if income == 0 {
            share.1 += minimum;
        }
    }
    Ok(shares)
}

/// Divide `amount` by weight, round, then distribute the residual
fn proportional(
    amount: i64,
    weights: &[(MemberId, i64)],
    mode: RoundingMode,
) -> HouseholdResult<Vec<(MemberId, i64)>> {
    let denominator: i128 = weights.iter().map(|&(_, w)| i128::from(w)).sum();
    if denominator <= 0 {
        return Err(HouseholdError::InvariantViolation(
            "proportional split with no positive weight".into(),
        ));
    }

    let mut portions: Vec<Portion> = weights
        .iter()
        .map(|&(member_id, weight)| {
            let numerator = i128::from(amount) * i128::from(weight);
            let floor = numerator / denominator;
            let fraction = numerator % denominator;
            Portion {
                member_id,
                floor,
                fraction,
                rounded: round(floor, fraction, denominator, mode),
            }
        })
        .collect();

    let allocated: i128 = portions.iter().map(|p| p.rounded).sum();
    distribute_residual(&mut portions, i128::from(amount) - allocated);

    Ok(portions
        .into_iter()
        .map(|p| (p.member_id, clamp_to_i64(p.rounded)))
        .collect())
}

/// Round `floor + fraction / denominator` to an integer (all terms non-negative)
fn round(floor: i128, fraction: i128, denominator: i128, mode: RoundingMode) -> i128 {
    if fraction == 0 {
        return floor;
    }
    let twice = fraction * 2;
    let up = match mode {
        RoundingMode::Floor => false,
        RoundingMode::Ceiling => true,
        RoundingMode::Round => twice >= denominator,
        RoundingMode::Bankers => match twice.cmp(&denominator) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => floor % 2 != 0,
        },
    };
    if up {
        floor + 1
    } else {
        floor
    }
}

/// Hand out (or take back) the residual one unit at a time.
///
/// A positive residual goes to rounded-down members with the largest fractional
/// remainder; a negative one is taken from rounded-up members with the smallest.
/// Ties go to the lower member id in both cases.
fn distribute_residual(portions: &mut [Portion], residual: i128) {
    if residual == 0 {
        return;
    }

    let mut order: Vec<usize> = if residual > 0 {
        (0..portions.len())
            .filter(|&i| portions[i].rounded == portions[i].floor && portions[i].fraction > 0)
            .collect()
    } else {
        (0..portions.len())
            .filter(|&i| portions[i].rounded > portions[i].floor)
            .collect()
    };

    if residual > 0 {
        order.sort_by_key(|&i| (Reverse(portions[i].fraction), portions[i].member_id));
    } else {
        order.sort_by_key(|&i| (portions[i].fraction, portions[i].member_id));
    }

    let step = residual.signum();
    let units = usize::try_from(residual.unsigned_abs()).unwrap_or(usize::MAX);
    for i in order.into_iter().take(units) {
        portions[i].rounded += step;
    }
}

fn clamp_to_i64(value: i128) -> i64 {
    value.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}
