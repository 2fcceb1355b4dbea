use crate::tools::{
    Job, OutputTarget, OverwritePolicy, format_duration, parse_timestamp, trimmed_output_path,
};
use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrimError {
    #[error("not a valid time: {0:?}")]
    InvalidTime(String),
    #[error("the end must come after the start")]
    EmptyRange,
    #[error("the end ({end}) is past the length of the file ({length})")]
    PastEnd { end: String, length: String },
}

/// A `[start, end)` segment of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimRange {
    pub start: Duration,
    pub end: Duration,
}

impl TrimRange {
    /// Parses both positions and checks them against the probed length, when known.
    pub fn parse(start: &str, end: &str, length: Option<Duration>) -> Result<Self, TrimError> {
        let start_at = parse_timestamp(start).ok_or_else(|| TrimError::InvalidTime(start.to_string()))?;
        let end_at = parse_timestamp(end).ok_or_else(|| TrimError::InvalidTime(end.to_string()))?;

        if end_at <= start_at {
            return Err(TrimError::EmptyRange);
        }
        if let Some(length) = length {
            if end_at > length {
                return Err(TrimError::PastEnd {
                    end: format_duration(end_at),
                    length: format_duration(length),
                });
            }
        }

        Ok(Self {
            start: start_at,
            end: end_at,
        })
    }

    #[must_use]
    pub fn length(&self) -> Duration {
        self.end.saturating_sub(self.start)
    }
}

fn seconds_arg(duration: Duration) -> OsString {
    OsString::from(format!("{:.3}", duration.as_secs_f64()))
}

/// `-i <input> -ss <start> -t <length> <flag> <output>`, written next to the
/// other outputs as `<stem>_CROP.<ext>`.
#[must_use]
pub fn trim_job(
    input: &Path,
    target: &OutputTarget,
    range: TrimRange,
    overwrite: OverwritePolicy,
) -> Job {
    let output = trimmed_output_path(input, target);
    let args = vec![
        OsString::from("-i"),
        input.as_os_str().to_owned(),
        OsString::from("-ss"),
        seconds_arg(range.start),
        OsString::from("-t"),
        seconds_arg(range.length()),
        OsString::from(overwrite.flag()),
        output.as_os_str().to_owned(),
    ];

    Job::new(Uuid::new_v4(), input, &output, "trim", args).with_exact_duration(range.length())
}
