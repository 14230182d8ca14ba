//! Member CLI commands

use clap::Subcommand;

use super::{resolve_household, resolve_member};
use crate::config::settings::Settings;
use crate::display::format_member_list;
use crate::error::HouseholdResult;
use crate::services::HouseholdService;
use crate::storage::Storage;

/// Member subcommands
#[derive(Subcommand)]
pub enum MemberCommands {
    /// Add a member to the household
    Add {
        /// Member name
        name: String,
    },
    /// List the household's members
    List,
    /// Rename a member
    Rename {
        /// Member name or ID
        member: String,
        /// New name
        new_name: String,
    },
    /// Remove a member without income or expense records
    Remove {
        /// Member name or ID
        member: String,
    },
}

/// Handle a member command
pub fn handle_member_command(
    storage: &Storage,
    settings: &Settings,
    household: Option<&str>,
    cmd: MemberCommands,
) -> HouseholdResult<()> {
    let household = resolve_household(storage, settings, household)?;
    let service = HouseholdService::new(storage);

    match cmd {
        MemberCommands::Add { name } => {
            let member = service.add_member(household.id, &name)?;
            println!("Added {} to {}", member.name, household.name);
            println!("  ID: {}", member.id);
        }

        MemberCommands::List => {
            let members = service.list_members(household.id)?;
            print!("{}", format_member_list(&household, &members));
        }

        MemberCommands::Rename { member, new_name } => {
            let found = resolve_member(storage, &household, &member)?;
            let renamed = service.rename_member(found.id, &new_name)?;
            println!("Renamed {} to {}", found.name, renamed.name);
        }

        MemberCommands::Remove { member } => {
            let found = resolve_member(storage, &household, &member)?;
            let removed = service.remove_member(found.id)?;
            println!("Removed {} from {}", removed.name, household.name);
        }
    }

    Ok(())
}
