use super::presets::PresetBook;
use crate::tools::{OutputTarget, OverwritePolicy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub const APP_DIR_NAME: &str = "ffqueue";
pub const MAX_RECENT_PATHS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "zh-TW")]
    ZhTw,
}

impl Language {
    pub const ALL: [Self; 2] = [Self::EnUs, Self::ZhTw];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::ZhTw => "zh-TW",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnUs => write!(f, "English"),
            Self::ZhTw => write!(f, "繁體中文"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub language: Language,
    pub category: Option<String>,
    pub preset: Option<String>,
    pub output_folder: Option<PathBuf>,
    pub use_source_folder: bool,
    pub overwrite_existing: bool,
    pub show_tool_output: bool,
    pub ffmpeg_path: Option<PathBuf>,
    pub ffprobe_path: Option<PathBuf>,
    pub recent_paths: Vec<String>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            language: Language::default(),
            category: None,
            preset: None,
            output_folder: None,
            use_source_folder: true,
            overwrite_existing: false,
            show_tool_output: false,
            ffmpeg_path: None,
            ffprobe_path: None,
            recent_paths: Vec::new(),
        }
    }
}

impl UserSettings {
    /// `None` when a folder is required but none has been chosen.
    #[must_use]
    pub fn output_target(&self) -> Option<OutputTarget> {
        if self.use_source_folder {
            return Some(OutputTarget::SourceFolder);
        }
        self.output_folder.clone().map(OutputTarget::Folder)
    }

    #[must_use]
    pub const fn overwrite_policy(&self) -> OverwritePolicy {
        OverwritePolicy::from_overwrite(self.overwrite_existing)
    }
}

/// Locations of the files kept in the per-user config directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    dir: PathBuf,
}

impl ConfigPaths {
    #[must_use]
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// `$XDG_CONFIG_HOME/ffqueue` (or the platform equivalent), falling back to the working directory.
    #[must_use]
    pub fn default_location() -> Self {
        let dir = dirs::config_dir()
            .map_or_else(|| PathBuf::from("."), |dir| dir.join(APP_DIR_NAME));
        Self { dir }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn settings_file(&self) -> PathBuf {
        self.dir.join("settings.json")
    }

    #[must_use]
    pub fn presets_file(&self) -> PathBuf {
        self.dir.join("presets.json")
    }

    #[must_use]
    pub fn presets_backup_file(&self) -> PathBuf {
        self.dir.join("presets.json.bak")
    }

    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.dir.join("ffqueue.log")
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub paths: ConfigPaths,
    pub settings: UserSettings,
    pub presets: PresetBook,
    /// Where an unreadable presets file was moved during loading.
    pub presets_backup: Option<PathBuf>,
}
