use crate::config::presets::PresetBook;
use crate::config::types::{Config, ConfigPaths, UserSettings};
use anyhow::{Context, Result};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

impl Config {
    pub fn load(paths: ConfigPaths) -> Result<Self> {
        let settings = Self::load_settings(&paths.settings_file()).unwrap_or_else(|e| {
            warn!("Using default settings: {e:#}");
            UserSettings::default()
        });
        let (presets, presets_backup) = Self::load_presets(&paths)?;

        Ok(Self {
            paths,
            settings,
            presets,
            presets_backup,
        })
    }

    fn load_settings(path: &Path) -> Result<UserSettings> {
        if !path.exists() {
            return Ok(UserSettings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }

    /// User presets when the file exists and is not blank, the embedded defaults otherwise.
    /// A file that fails to parse is moved to `presets.json.bak` so saving the
    /// defaults later cannot destroy it.
    fn load_presets(paths: &ConfigPaths) -> Result<(PresetBook, Option<PathBuf>)> {
        let path = paths.presets_file();
        let content = match fs::read_to_string(&path) {
            Ok(content) if !content.trim().is_empty() => content,
            _ => return Ok((PresetBook::defaults()?, None)),
        };

        match PresetBook::from_json(&content) {
            Ok(book) => {
                info!("Loaded presets from {}", path.display());
                for (category, name, e) in book.invalid_presets() {
                    warn!("Preset {category}/{name} will not run: {e}");
                }
                Ok((book, None))
            }
            Err(e) => {
                warn!("Ignoring {}: {e:#}", path.display());
                let backup = paths.presets_backup_file();
                fs::rename(&path, &backup).with_context(|| {
                    format!("Failed to move {} to {}", path.display(), backup.display())
                })?;
                warn!("Unreadable presets moved to {}", backup.display());
                Ok((PresetBook::defaults()?, Some(backup)))
            }
        }
    }
}
