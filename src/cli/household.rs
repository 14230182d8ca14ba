//! Household CLI commands

use clap::Subcommand;

use super::{resolve_household, PolicyArgs};
use crate::config::{paths::HouseholdPaths, settings::Settings};
use crate::display::format_household_list;
use crate::error::{HouseholdError, HouseholdResult};
use crate::services::HouseholdService;
use crate::storage::Storage;

/// Household subcommands
#[derive(Subcommand)]
pub enum HouseholdCommands {
    /// Create a new household
    Create {
        /// Household name
        name: String,
        #[command(flatten)]
        policy: PolicyArgs,
        /// Don't make the new household the active one
        #[arg(long)]
        no_use: bool,
    },
    /// List all households
    List,
    /// Make a household the active one
    Use {
        /// Household name or ID
        name: String,
    },
    /// Show or change the settlement policy
    Policy {
        #[command(flatten)]
        policy: PolicyArgs,
    },
}

/// Handle a household command
pub fn handle_household_command(
    storage: &Storage,
    paths: &HouseholdPaths,
    settings: &mut Settings,
    household: Option<&str>,
    cmd: HouseholdCommands,
) -> HouseholdResult<()> {
    let service = HouseholdService::new(storage);

    match cmd {
        HouseholdCommands::Create {
            name,
            policy,
            no_use,
        } => {
            let policy = policy.apply(settings.default_policy)?;
            let created = service.create(&name, policy)?;

            println!("Created household: {}", created.name);
            println!("  Policy: {}", created.policy);
            println!("  ID: {}", created.id);

            if !no_use {
                settings.active_household = Some(created.id);
                settings.save(paths)?;
                println!("Now using '{}'.", created.name);
            }
        }

        HouseholdCommands::List => {
            let households = service.list()?;
            print!("{}", format_household_list(&households, settings.active_household));
        }

        HouseholdCommands::Use { name } => {
            let found = service
                .find(&name)?
                .ok_or_else(|| HouseholdError::household_not_found(&name))?;

            settings.active_household = Some(found.id);
            settings.save(paths)?;
            println!("Now using '{}'.", found.name);
        }

        HouseholdCommands::Policy { policy } => {
            let found = resolve_household(storage, settings, household)?;

            if policy.is_empty() {
                println!("{}: {}", found.name, found.policy);
                return Ok(());
            }

            let updated = service.set_policy(found.id, policy.apply(found.policy)?)?;
            println!("Updated policy for {}: {}", updated.name, updated.policy);
            println!("Drafts keep their old policy until recomputed.");
        }
    }

    Ok(())
}
