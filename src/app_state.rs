use crate::component::converter::{FileQueue, QueuedFile};
use crate::config::{Config, Preset};
use crate::tools::{ProbeCache, ToolPaths, collect_media_files, resolve_tools};
use anyhow::{Result, anyhow};
use log::{info, warn};
use rust_i18n::t;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Warning,
    Error,
}

/// One-line message shown under the main menu header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

/// Everything the interactive screens share.
pub struct AppState {
    pub config: Config,
    pub queue: FileQueue,
    pub tools: Option<ToolPaths>,
    pub probe_cache: ProbeCache,
    pub status: Option<StatusMessage>,
    pub shutdown_signal: Arc<AtomicBool>,
}

impl AppState {
    #[must_use]
    pub fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        let mut state = Self {
            config,
            queue: FileQueue::new(),
            tools: None,
            probe_cache: ProbeCache::new(),
            status: None,
            shutdown_signal,
        };
        state.locate_tools();
        state
    }

    /// Looks the external tools up again, using the configured overrides.
    pub fn locate_tools(&mut self) -> bool {
        let settings = &self.config.settings;
        match resolve_tools(settings.ffmpeg_path.as_deref(), settings.ffprobe_path.as_deref()) {
            Ok(tools) => {
                info!(
                    "Using {} and {}",
                    tools.ffmpeg.display(),
                    tools.ffprobe.display()
                );
                self.tools = Some(tools);
                true
            }
            Err(e) => {
                warn!("{e:#}");
                self.tools = None;
                self.set_error(t!("status.tools_missing"));
                false
            }
        }
    }

    pub fn require_tools(&self) -> Result<ToolPaths> {
        self.tools
            .clone()
            .ok_or_else(|| anyhow!(t!("status.tools_missing").to_string()))
    }

    /// The preset remembered in the settings, if it still exists.
    #[must_use]
    pub fn current_preset(&self) -> Option<Preset> {
        let settings = &self.config.settings;
        let category = settings.category.as_deref()?;
        let name = settings.preset.as_deref()?;
        self.config.presets.get(category, name)
    }

    /// Adds every video or audio file found at `path`. Returns how many were new.
    pub fn add_path(&mut self, path: &Path) -> Result<usize> {
        let tools = self.require_tools()?;
        let files = collect_media_files(path)?;

        let mut added = 0;
        for file in files {
            if self.queue.contains_path(&file.path) {
                continue;
            }
            let duration = self.probe_cache.get(&tools.ffprobe, &file.path).duration;
            if self.queue.push(QueuedFile::new(file, duration)) {
                added += 1;
            }
        }

        info!("Added {added} file(s) from {}", path.display());
        Ok(added)
    }

    pub fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            kind,
            text: text.into(),
        });
    }

    pub fn set_info(&mut self, text: impl Into<String>) {
        self.set_status(StatusKind::Info, text);
    }

    pub fn set_warning(&mut self, text: impl Into<String>) {
        self.set_status(StatusKind::Warning, text);
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.set_status(StatusKind::Error, text);
    }
}
