//! Path management for household-settle
//!
//! Provides XDG-compliant path resolution for configuration and data.
//!
//! ## Path Resolution Order
//!
//! 1. `HOUSEHOLD_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/household-settle` or `~/.config/household-settle`
//! 3. Windows: `%APPDATA%\household-settle`

use std::path::PathBuf;

use crate::error::HouseholdError;

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "HOUSEHOLD_DATA_DIR";

const APP_DIR: &str = "household-settle";

/// Manages all paths used by household-settle
#[derive(Debug, Clone)]
pub struct HouseholdPaths {
    /// Base directory for all household-settle data
    base_dir: PathBuf,
}

impl HouseholdPaths {
    /// Create a new HouseholdPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home or application data directory can be determined.
    pub fn new() -> Result<Self, HouseholdError> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create HouseholdPaths with a custom base directory
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (`<base>/data/`)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    pub fn households_file(&self) -> PathBuf {
        self.data_dir().join("households.json")
    }

    pub fn members_file(&self) -> PathBuf {
        self.data_dir().join("members.json")
    }

    pub fn incomes_file(&self) -> PathBuf {
        self.data_dir().join("incomes.json")
    }

    pub fn expenses_file(&self) -> PathBuf {
        self.data_dir().join("expenses.json")
    }

    pub fn settlements_file(&self) -> PathBuf {
        self.data_dir().join("settlements.json")
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), HouseholdError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| HouseholdError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| HouseholdError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if household-settle has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, HouseholdError> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let home = std::env::var("HOME").map_err(|_| {
                HouseholdError::Config("Could not determine HOME directory".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join(APP_DIR))
}

#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, HouseholdError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| HouseholdError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join(APP_DIR))
}
