//! User settings for household-settle
//!
//! Persists the active household, display preferences, the policy new
//! households start with, and the default log filter.

use serde::{Deserialize, Serialize};

use super::paths::HouseholdPaths;
use crate::error::HouseholdError;
use crate::models::{HouseholdId, Policy};

/// User settings for household-settle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Household that commands act on when none is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_household: Option<HouseholdId>,

    /// Default currency symbol
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Policy given to newly created households
    #[serde(default)]
    pub default_policy: Policy,

    /// tracing filter used when `HOUSEHOLD_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            active_household: None,
            currency_symbol: default_currency(),
            default_policy: Policy::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &HouseholdPaths) -> Result<Self, HouseholdError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Don't save yet - let caller decide when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| HouseholdError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| HouseholdError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Save settings to disk
    pub fn save(&self, paths: &HouseholdPaths) -> Result<(), HouseholdError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| HouseholdError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| HouseholdError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RoundingMode;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.currency_symbol, "$");
        assert_eq!(settings.default_policy, Policy::default());
        assert_eq!(settings.log_filter, "warn");
        assert!(settings.active_household.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = HouseholdPaths::with_base_dir(temp_dir.path().to_path_buf());

        let household = HouseholdId::new();
        let settings = Settings {
            active_household: Some(household),
            default_policy: Policy::min_share(10).with_rounding(RoundingMode::Bankers),
            ..Settings::default()
        };
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.active_household, Some(household));
        assert_eq!(loaded.default_policy.min_share_percent, 10);
        assert_eq!(loaded.default_policy.rounding_mode, RoundingMode::Bankers);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let loaded: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(loaded.schema_version, 1);
        assert_eq!(loaded.currency_symbol, "$");
    }

    #[test]
    fn test_corrupt_settings_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let paths = HouseholdPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), "not json").unwrap();

        let err = Settings::load_or_create(&paths).unwrap_err();
        assert!(matches!(err, HouseholdError::Config(_)));
    }
}
