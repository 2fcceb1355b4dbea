use crate::config::presets::PresetBook;
use crate::config::types::{Config, ConfigPaths, MAX_RECENT_PATHS, UserSettings};
use crate::tools::ensure_directory_exists;
use anyhow::{Context, Result};
use std::fs;

pub fn save_settings(paths: &ConfigPaths, settings: &UserSettings) -> Result<()> {
    ensure_directory_exists(paths.dir())?;
    let path = paths.settings_file();
    let content = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

    fs::write(&path, content)
        .with_context(|| format!("Failed to write settings to {}", path.display()))?;

    Ok(())
}

pub fn save_presets(paths: &ConfigPaths, presets: &PresetBook) -> Result<()> {
    ensure_directory_exists(paths.dir())?;
    let path = paths.presets_file();

    fs::write(&path, presets.to_json()?)
        .with_context(|| format!("Failed to write presets to {}", path.display()))?;

    Ok(())
}

impl Config {
    pub fn save(&self) -> Result<()> {
        save_settings(&self.paths, &self.settings)?;
        save_presets(&self.paths, &self.presets)
    }
}

/// Moves `path` to the front of the recent list, deduplicated and capped.
pub fn add_recent_path(settings: &mut UserSettings, path: &str) {
    settings.recent_paths.retain(|p| p != path);
    settings.recent_paths.insert(0, path.to_string());
    settings.recent_paths.truncate(MAX_RECENT_PATHS);
}
