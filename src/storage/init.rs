//! Storage initialization
//!
//! First-run setup: creates the directory layout and empty data files.

use crate::config::paths::HouseholdPaths;
use crate::error::HouseholdError;

use super::file_io::write_json_atomic;

/// Initialize storage for a fresh installation
///
/// Existing data files are left untouched.
pub fn initialize_storage(paths: &HouseholdPaths) -> Result<(), HouseholdError> {
    paths.ensure_directories()?;

    for file in [
        paths.households_file(),
        paths.members_file(),
        paths.incomes_file(),
        paths.expenses_file(),
        paths.settlements_file(),
    ] {
        if !file.exists() {
            write_json_atomic(&file, &serde_json::json!({}))?;
        }
    }

    Ok(())
}

/// Check if storage needs initialization
pub fn needs_initialization(paths: &HouseholdPaths) -> bool {
    !paths.settings_file().exists() || !paths.households_file().exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_storage() {
        let temp_dir = TempDir::new().unwrap();
        let paths = HouseholdPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert!(needs_initialization(&paths));
        initialize_storage(&paths).unwrap();

        assert!(paths.households_file().exists());
        assert!(paths.settlements_file().exists());
    }

    #[test]
    fn test_doesnt_overwrite_existing() {
        let temp_dir = TempDir::new().unwrap();
        let paths = HouseholdPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        std::fs::write(paths.members_file(), r#"{"members":[]}"#).unwrap();

        initialize_storage(&paths).unwrap();

        let contents = std::fs::read_to_string(paths.members_file()).unwrap();
        assert_eq!(contents, r#"{"members":[]}"#);
    }
}
