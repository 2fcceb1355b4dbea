use crate::config::Preset;
use crate::tools::ffmpeg_command::{OverwritePolicy, TemplateError, build_arguments, command_line};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed(String),
    Cancelled,
    Skipped,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "done"),
            Self::Failed(_) => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// One invocation of the external tool.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub input: PathBuf,
    pub output: PathBuf,
    pub label: String,
    pub args: Vec<OsString>,
    pub expected_duration: Option<Duration>,
    pub exact_duration: bool,
}

impl Job {
    #[must_use]
    pub fn new(id: Uuid, input: &Path, output: &Path, label: &str, args: Vec<OsString>) -> Self {
        Self {
            id,
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            label: label.to_string(),
            args,
            expected_duration: None,
            exact_duration: false,
        }
    }

    /// Converts `input` into `output` with the preset's argument template.
    pub fn convert(
        id: Uuid,
        input: &Path,
        output: &Path,
        preset: &Preset,
        overwrite: OverwritePolicy,
    ) -> Result<Self, TemplateError> {
        let args = build_arguments(&preset.params, input, output, overwrite)?;
        Ok(Self::new(id, input, output, &preset.name, args))
    }

    /// Hint used before the tool reports the input duration itself.
    #[must_use]
    pub fn with_expected_duration(mut self, duration: Option<Duration>) -> Self {
        self.expected_duration = duration;
        self.exact_duration = false;
        self
    }

    /// The encoded length is known up front (e.g. a trimmed segment).
    #[must_use]
    pub fn with_exact_duration(mut self, duration: Duration) -> Self {
        self.expected_duration = Some(duration);
        self.exact_duration = true;
        self
    }

    #[must_use]
    pub fn command_line(&self, tool: &Path) -> String {
        command_line(tool, &self.args)
    }

    #[must_use]
    pub fn file_name(&self) -> String {
        self.input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.input.display().to_string())
    }
}
