//! Configuration module for github-user-search
//!
//! Handles loading settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable naming an explicit settings file
pub const SETTINGS_PATH_VAR: &str = "GITHUB_USER_SEARCH_SETTINGS_PATH";

/// Load settings from the first file found, or defaults, then apply the environment
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    if let Some(path) = explicit {
        info!("Loading settings from: {}", path.display());
        return from_path(path);
    }

    if let Ok(path) = std::env::var(SETTINGS_PATH_VAR) {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Loading settings from: {}", path.display());
            return from_path(&path);
        }
    }

    for path in default_paths() {
        if path.exists() {
            info!("Loading settings from: {}", path.display());
            return from_path(&path);
        }
    }

    info!("No settings file found, using defaults");
    let mut settings = Settings::default();
    settings.merge_env();
    Ok(settings)
}

fn from_path(path: &Path) -> Result<Settings> {
    let mut settings = Settings::from_file(path)?;
    settings.merge_env();
    Ok(settings)
}

fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("github-user-search/settings.yml"));
    }
    paths
}
