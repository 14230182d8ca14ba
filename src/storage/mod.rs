//! Storage layer for household-settle
//!
//! JSON file storage with atomic writes, one repository per entity, and the
//! audit log. [`Storage`] is also the [`LedgerSource`] the settlement engine
//! reads from.

pub mod expenses;
pub mod file_io;
pub mod households;
pub mod incomes;
pub mod init;
pub mod members;
pub mod settlements;

pub use expenses::ExpenseRepository;
pub use file_io::{read_json, write_json_atomic};
pub use households::HouseholdRepository;
pub use incomes::IncomeRepository;
pub use init::initialize_storage;
pub use members::MemberRepository;
pub use settlements::SettlementRepository;

use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

use crate::audit::{summarize_changes, AuditEntry, AuditLogger, EntityType};
use crate::config::paths::HouseholdPaths;
use crate::error::{HouseholdError, HouseholdResult};
use crate::models::{ExpenseEntry, HouseholdId, IncomeRecord, Month};
use crate::settle::LedgerSource;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: HouseholdPaths,
    audit: AuditLogger,
    settlement_guard: Mutex<()>,
    pub households: HouseholdRepository,
    pub members: MemberRepository,
    pub incomes: IncomeRepository,
    pub expenses: ExpenseRepository,
    pub settlements: SettlementRepository,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: HouseholdPaths) -> Result<Self, HouseholdError> {
        paths.ensure_directories()?;

        Ok(Self {
            audit: AuditLogger::new(paths.audit_log()),
            settlement_guard: Mutex::new(()),
            households: HouseholdRepository::new(paths.households_file()),
            members: MemberRepository::new(paths.members_file()),
            incomes: IncomeRepository::new(paths.incomes_file()),
            expenses: ExpenseRepository::new(paths.expenses_file()),
            settlements: SettlementRepository::new(paths.settlements_file()),
            paths,
        })
    }

    pub fn paths(&self) -> &HouseholdPaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), HouseholdError> {
        self.households.load()?;
        self.members.load()?;
        self.incomes.load()?;
        self.expenses.load()?;
        self.settlements.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), HouseholdError> {
        self.households.save()?;
        self.members.save()?;
        self.incomes.save()?;
        self.expenses.save()?;
        self.settlements.save()?;
        Ok(())
    }

    /// Serialize settlement writes
    ///
    /// Held across a whole read-compute-write so two computations never
    /// interleave.
    pub fn lock_settlements(&self) -> HouseholdResult<MutexGuard<'_, ()>> {
        self.settlement_guard
            .lock()
            .map_err(|e| HouseholdError::Storage(format!("Failed to acquire settlement guard: {}", e)))
    }

    /// Fail with `Locked` when the month's settlement is finalized
    pub fn ensure_month_open(&self, household_id: HouseholdId, month: Month) -> HouseholdResult<()> {
        if self.settlements.is_finalized(household_id, month)? {
            return Err(HouseholdError::Locked(format!(
                "The settlement for {} is finalized; its income and expenses can no longer change",
                month
            )));
        }
        Ok(())
    }

    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
        entity: &T,
    ) -> HouseholdResult<()> {
        self.audit
            .log(&AuditEntry::create(entity_type, entity_id, entity_name, entity))
    }

    /// Log an update, summarizing the changed fields
    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> HouseholdResult<()> {
        let diff = match (serde_json::to_value(before), serde_json::to_value(after)) {
            (Ok(old), Ok(new)) => summarize_changes(&old, &new),
            _ => None,
        };
        self.audit.log(&AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
            diff,
        ))
    }

    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
        entity: &T,
    ) -> HouseholdResult<()> {
        self.audit
            .log(&AuditEntry::delete(entity_type, entity_id, entity_name, entity))
    }

    pub fn log_finalize<T: Serialize>(
        &self,
        entity_id: String,
        entity_name: Option<String>,
        entity: &T,
        finalized_by: impl std::fmt::Display,
    ) -> HouseholdResult<()> {
        self.audit.log(&AuditEntry::finalize(
            entity_id,
            entity_name,
            entity,
            finalized_by,
        ))
    }
}

impl LedgerSource for Storage {
    fn fetch_incomes(
        &self,
        household_id: HouseholdId,
        month: Month,
    ) -> HouseholdResult<Vec<IncomeRecord>> {
        self.incomes.get_for_month(household_id, month)
    }

    fn fetch_expenses(
        &self,
        household_id: HouseholdId,
        month: Month,
    ) -> HouseholdResult<Vec<ExpenseEntry>> {
        self.expenses.get_for_month(household_id, month)
    }
}
