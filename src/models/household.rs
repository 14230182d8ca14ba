//! Household and member models
//!
//! A household groups the members who share expenses. Each household carries
//! its own apportionment policy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{HouseholdId, MemberId};
use super::policy::Policy;

/// Validation errors for households and members
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HouseholdValidationError {
    EmptyName,
    NameTooLong(usize),
}

impl std::fmt::Display for HouseholdValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Name too long ({} chars, max {})", len, MAX_NAME_LEN)
            }
        }
    }
}

impl std::error::Error for HouseholdValidationError {}

const MAX_NAME_LEN: usize = 100;

fn validate_name(name: &str) -> Result<(), HouseholdValidationError> {
    if name.trim().is_empty() {
        return Err(HouseholdValidationError::EmptyName);
    }
    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(HouseholdValidationError::NameTooLong(len));
    }
    Ok(())
}

/// A household sharing expenses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Household {
    pub id: HouseholdId,
    pub name: String,
    #[serde(default)]
    pub policy: Policy,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Household {
    pub fn new(name: impl Into<String>, policy: Policy) -> Self {
        let now = Utc::now();
        Self {
            id: HouseholdId::new(),
            name: name.into(),
            policy,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_policy(&mut self, policy: Policy) {
        self.policy = policy;
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), HouseholdValidationError> {
        validate_name(&self.name)
    }
}

/// A household participant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub household_id: HouseholdId,
    /// Display name, unique within the household
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    pub fn new(household_id: HouseholdId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: MemberId::new(),
            household_id,
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), HouseholdValidationError> {
        validate_name(&self.name)
    }
}
