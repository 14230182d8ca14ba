//! Configuration module for household-settle
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::HouseholdPaths;
pub use settings::Settings;
