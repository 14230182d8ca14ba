//! YAML export of a settlement

use std::io::Write;

use crate::error::{HouseholdError, HouseholdResult};
use crate::export::json::SettlementExport;
use crate::models::SettlementId;
use crate::storage::Storage;

/// Export a settlement to YAML, preceded by a comment header
pub fn export_settlement_yaml<W: Write>(
    storage: &Storage,
    settlement_id: SettlementId,
    writer: &mut W,
) -> HouseholdResult<()> {
    let export = SettlementExport::from_storage(storage, settlement_id)?;
    let io_err = |e: std::io::Error| HouseholdError::Export(e.to_string());

    writeln!(
        writer,
        "# Settlement for {} ({})",
        export.household.name, export.settlement.month
    )
    .map_err(io_err)?;
    writeln!(writer, "# Status: {}", export.settlement.status).map_err(io_err)?;
    writeln!(writer, "# Generated: {}", export.exported_at).map_err(io_err)?;
    writeln!(writer).map_err(io_err)?;

    serde_yaml::to_writer(writer, &export).map_err(|e| HouseholdError::Export(e.to_string()))?;

    Ok(())
}
