//! Household and member display formatting

use std::collections::HashMap;

use crate::models::{Household, HouseholdId, Member, MemberId};

/// Lookup from member id to display name
///
/// Unknown ids fall back to their short id.
pub struct MemberNames(HashMap<MemberId, String>);

impl MemberNames {
    pub fn new(members: &[Member]) -> Self {
        Self(members.iter().map(|m| (m.id, m.name.clone())).collect())
    }

    pub fn name(&self, id: MemberId) -> String {
        self.0.get(&id).cloned().unwrap_or_else(|| id.to_string())
    }
}

/// Format a list of households, marking the active one
pub fn format_household_list(households: &[Household], active: Option<HouseholdId>) -> String {
    if households.is_empty() {
        return "No households found. Create one with 'household household create <NAME>'.\n".to_string();
    }

    let name_width = households
        .iter()
        .map(|h| h.name.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "  {:<name_width$}  {:<11}  {}\n",
        "Name",
        "ID",
        "Policy",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "  {:-<name_width$}  {:-<11}  {:-<20}\n",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for household in households {
        let marker = if Some(household.id) == active { "*" } else { " " };
        output.push_str(&format!(
            "{} {:<name_width$}  {:<11}  {}\n",
            marker,
            household.name,
            household.id.to_string(),
            household.policy,
            name_width = name_width,
        ));
    }

    output
}

/// Format a household's members
pub fn format_member_list(household: &Household, members: &[Member]) -> String {
    let mut output = format!("Members of {}:\n", household.name);

    if members.is_empty() {
        output.push_str("  (none)\n");
        return output;
    }

    for member in members {
        output.push_str(&format!("  {:<12}  {}\n", member.id.to_string(), member.name));
    }

    output
}
