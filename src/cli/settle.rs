//! Settlement CLI commands
//!
//! Settlements are addressed by month within the selected household.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};

use super::{member_names, parse_month, resolve_household, resolve_member, PolicyArgs};
use crate::config::settings::Settings;
use crate::display::{format_settlement_details, format_settlement_list};
use crate::error::{HouseholdError, HouseholdResult};
use crate::export::{
    export_balances_csv, export_settlement_json, export_settlement_yaml, export_transfers_csv,
};
use crate::models::{Household, Month, Settlement};
use crate::services::SettlementService;
use crate::storage::Storage;

/// Export formats for `settle export`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Transfers as CSV
    Csv,
    /// Per-member shares and balances as CSV
    Balances,
    Json,
    Yaml,
}

/// Settlement subcommands
#[derive(Subcommand)]
pub enum SettleCommands {
    /// Compute (or recompute) the draft settlement for a month
    Compute {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
        // Overrides the household policy for this computation only.
        #[command(flatten)]
        policy: PolicyArgs,
    },
    /// Show the settlement for a month
    Show {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },
    /// List the household's settlements
    List,
    /// Finalize a draft settlement; it can't be changed afterwards
    Finalize {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
        /// Member finalizing the settlement (name or ID)
        #[arg(long = "as", value_name = "MEMBER")]
        member: String,
    },
    /// Delete a draft settlement
    Delete {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Export a settlement
    Export {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: ExportFormat,
        /// Output file, defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle a settle command
pub fn handle_settle_command(
    storage: &Storage,
    settings: &Settings,
    household: Option<&str>,
    cmd: SettleCommands,
) -> HouseholdResult<()> {
    let household = resolve_household(storage, settings, household)?;
    let service = SettlementService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        SettleCommands::Compute { month, policy } => {
            let month = parse_month(month.as_deref())?;
            let policy = if policy.is_empty() {
                None
            } else {
                Some(policy.apply(household.policy)?)
            };

            let settlement = service.compute(household.id, month, policy)?;
            let names = member_names(storage, &household)?;
            print!("{}", format_settlement_details(&settlement, &names, symbol));
        }

        SettleCommands::Show { month } => {
            let month = parse_month(month.as_deref())?;
            let settlement = settlement_for(&service, &household, month)?;
            let names = member_names(storage, &household)?;
            print!("{}", format_settlement_details(&settlement, &names, symbol));
        }

        SettleCommands::List => {
            let settlements = service.list(household.id)?;
            print!("{}", format_settlement_list(&settlements, symbol));
        }

        SettleCommands::Finalize { month, member } => {
            let month = parse_month(month.as_deref())?;
            let settlement = settlement_for(&service, &household, month)?;
            let member = resolve_member(storage, &household, &member)?;

            let finalized = service.finalize(settlement.id, member.id)?;
            println!(
                "Finalized the {} settlement for {} ({} transfers)",
                finalized.month,
                household.name,
                finalized.lines.len()
            );
        }

        SettleCommands::Delete { month } => {
            let month = parse_month(month.as_deref())?;
            let settlement = settlement_for(&service, &household, month)?;

            let removed = service.delete(settlement.id)?;
            println!("Deleted the draft settlement for {}", removed.month);
        }

        SettleCommands::Export {
            month,
            format,
            output,
        } => {
            let month = parse_month(month.as_deref())?;
            let settlement = settlement_for(&service, &household, month)?;

            match &output {
                Some(path) => {
                    let file = File::create(path).map_err(|e| {
                        HouseholdError::Export(format!(
                            "Failed to create {}: {}",
                            path.display(),
                            e
                        ))
                    })?;
                    write_export(storage, &settlement, format, file)?;
                    println!("Exported the {} settlement to {}", month, path.display());
                }
                None => write_export(storage, &settlement, format, io::stdout().lock())?,
            }
        }
    }

    Ok(())
}

fn settlement_for(
    service: &SettlementService<'_>,
    household: &Household,
    month: Month,
) -> HouseholdResult<Settlement> {
    service
        .get_for_month(household.id, month)?
        .ok_or_else(|| {
            HouseholdError::settlement_not_found(format!("{} {}", household.name, month))
        })
}

fn write_export<W: Write>(
    storage: &Storage,
    settlement: &Settlement,
    format: ExportFormat,
    mut writer: W,
) -> HouseholdResult<()> {
    match format {
        ExportFormat::Csv => export_transfers_csv(storage, settlement.id, &mut writer)?,
        ExportFormat::Balances => export_balances_csv(storage, settlement.id, &mut writer)?,
        ExportFormat::Json => {
            export_settlement_json(storage, settlement.id, &mut writer, true)?;
            writeln!(writer).map_err(|e| HouseholdError::Export(e.to_string()))?;
        }
        ExportFormat::Yaml => export_settlement_yaml(storage, settlement.id, &mut writer)?,
    }
    writer
        .flush()
        .map_err(|e| HouseholdError::Export(e.to_string()))
}
