//! Settlement model and lifecycle
//!
//! A settlement is the result of settling one household for one month: the
//! transfers that zero out every member's balance, plus the shares and
//! balances they were derived from.
//!
//! Lifecycle: a settlement is created in [`SettlementStatus::Draft`] and may be
//! recomputed any number of times while it stays a draft. Finalizing it is a
//! one-way move; a finalized settlement can be neither recomputed nor deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{HouseholdId, MemberId, SettlementId};
use super::money::Money;
use super::month::Month;
use super::policy::Policy;
use crate::error::{HouseholdError, HouseholdResult};

/// Lifecycle status of a settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    /// Computed but still open to recomputation
    #[default]
    Draft,
    /// Locked; terminal
    Finalized,
}

impl SettlementStatus {
    pub fn is_finalized(&self) -> bool {
        matches!(self, Self::Finalized)
    }
}

impl fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Finalized => write!(f, "finalized"),
        }
    }
}

/// Lifecycle operations that can be refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Finalize,
    Recompute,
    Delete,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finalize => write!(f, "finalize"),
            Self::Recompute => write!(f, "recompute"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// A member's share of the household expense total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberShare {
    pub member_id: MemberId,
    pub share_amount: Money,
}

/// A member's signed position: positive is owed money, negative owes money
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetBalance {
    pub member_id: MemberId,
    pub balance: Money,
}

impl NetBalance {
    pub fn new(member_id: MemberId, balance: Money) -> Self {
        Self { member_id, balance }
    }
}

/// A payment from one member to another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from_member_id: MemberId,
    pub to_member_id: MemberId,
    pub amount: Money,
}

/// Headline figures for a settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SettlementSummary {
    pub total_household_expense: Money,
    pub total_personal_expense: Money,
    pub participant_count: usize,
    pub transfer_count: usize,
}

/// Everything one engine run produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementComputation {
    pub shares: Vec<MemberShare>,
    pub balances: Vec<NetBalance>,
    pub transfers: Vec<Transfer>,
    pub summary: SettlementSummary,
}

/// The persisted settlement for one household and month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub id: SettlementId,
    pub household_id: HouseholdId,
    pub month: Month,
    #[serde(default)]
    pub status: SettlementStatus,
    /// Policy the current lines were computed under
    pub policy: Policy,
    pub computed_at: DateTime<Utc>,
    pub lines: Vec<Transfer>,
    #[serde(default)]
    pub shares: Vec<MemberShare>,
    #[serde(default)]
    pub balances: Vec<NetBalance>,
    pub summary: SettlementSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finalized_by: Option<MemberId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finalized_at: Option<DateTime<Utc>>,
}

impl Settlement {
    /// Create a draft settlement from a computation
    pub fn draft(
        household_id: HouseholdId,
        month: Month,
        policy: Policy,
        computation: SettlementComputation,
        computed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SettlementId::new(),
            household_id,
            month,
            status: SettlementStatus::Draft,
            policy,
            computed_at,
            lines: computation.transfers,
            shares: computation.shares,
            balances: computation.balances,
            summary: computation.summary,
            finalized_by: None,
            finalized_at: None,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.status.is_finalized()
    }

    fn refuse(&self, transition: Transition) -> HouseholdError {
        HouseholdError::IllegalTransition {
            settlement_id: self.id,
            from: self.status,
            transition,
        }
    }

    /// Fail unless the settlement may be recomputed
    pub fn ensure_recomputable(&self) -> HouseholdResult<()> {
        if self.is_finalized() {
            return Err(self.refuse(Transition::Recompute));
        }
        Ok(())
    }

    /// Fail unless the settlement may be deleted
    pub fn ensure_deletable(&self) -> HouseholdResult<()> {
        if self.is_finalized() {
            return Err(self.refuse(Transition::Delete));
        }
        Ok(())
    }

    /// Replace the lines, shares, balances and summary of a draft
    pub fn recompute(
        &mut self,
        policy: Policy,
        computation: SettlementComputation,
        computed_at: DateTime<Utc>,
    ) -> HouseholdResult<()> {
        self.ensure_recomputable()?;

        self.policy = policy;
        self.lines = computation.transfers;
        self.shares = computation.shares;
        self.balances = computation.balances;
        self.summary = computation.summary;
        self.computed_at = computed_at;
        Ok(())
    }

    /// DRAFT -> FINALIZED, stamping who finalized it and when
    pub fn finalize(
        &mut self,
        acting_member_id: MemberId,
        finalized_at: DateTime<Utc>,
    ) -> HouseholdResult<()> {
        if self.is_finalized() {
            return Err(self.refuse(Transition::Finalize));
        }

        self.status = SettlementStatus::Finalized;
        self.finalized_by = Some(acting_member_id);
        self.finalized_at = Some(finalized_at);
        Ok(())
    }

    /// Share of the household total owed by a member
    pub fn share_for(&self, member_id: MemberId) -> Option<Money> {
        self.shares
            .iter()
            .find(|s| s.member_id == member_id)
            .map(|s| s.share_amount)
    }

    /// Net balance of a member before transfers
    pub fn balance_for(&self, member_id: MemberId) -> Option<Money> {
        self.balances
            .iter()
            .find(|b| b.member_id == member_id)
            .map(|b| b.balance)
    }
}
