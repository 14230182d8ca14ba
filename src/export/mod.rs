//! Settlement export
//!
//! - CSV: transfers or member balances (spreadsheet-compatible)
//! - JSON: the full settlement with its household and members
//! - YAML: the same, human-readable

pub mod csv;
pub mod json;
pub mod yaml;

pub use self::csv::{export_balances_csv, export_transfers_csv};
pub use json::{export_settlement_json, SettlementExport, EXPORT_SCHEMA_VERSION};
pub use yaml::export_settlement_yaml;
