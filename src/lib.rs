//! household-settle - household budget tracking with monthly settlements
//!
//! Members of a household record their monthly allocatable income and the
//! expenses they paid. At the end of a month the settlement engine splits the
//! shared expenses in proportion to income, works out what each member is
//! owed or owes, and nets those balances into a short list of transfers.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (households, members, incomes, expenses, settlements)
//! - `settle`: The settlement engine (apportionment, balances, netting)
//! - `storage`: JSON file storage layer
//! - `services`: Business logic layer and the settlement lifecycle
//! - `audit`: Audit logging system
//! - `display`, `export`, `cli`: Terminal output, exports and command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use household::config::paths::HouseholdPaths;
//! use household::services::SettlementService;
//! use household::storage::Storage;
//!
//! let mut storage = Storage::new(HouseholdPaths::new()?)?;
//! storage.load_all()?;
//! let settlement = SettlementService::new(&storage).compute(household_id, month, None)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod settle;
pub mod storage;

pub use error::{HouseholdError, HouseholdResult};
