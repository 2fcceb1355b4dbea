use anyhow::{Context, Result, bail};
use log::warn;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// The `format` section of an ffprobe report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaInfo {
    pub duration: Option<Duration>,
    pub fields: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<Map<String, Value>>,
}

impl MediaInfo {
    /// `Key name: value` lines for every string-valued field.
    #[must_use]
    pub fn info_lines(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|(key, value)| format!("{}: {value}", humanize_key(key)))
            .collect()
    }
}

fn humanize_key(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Runs ffprobe and returns the format section of its report.
pub fn probe_media(ffprobe: &Path, path: &Path) -> Result<MediaInfo> {
    let output = Command::new(ffprobe)
        .arg("-i")
        .arg(path)
        .args(["-v", "quiet", "-print_format", "json", "-show_format"])
        .output()
        .with_context(|| format!("Failed to run ffprobe on {}", path.display()))?;

    if !output.status.success() {
        bail!("ffprobe failed on {} ({})", path.display(), output.status);
    }

    parse_probe_output(&String::from_utf8_lossy(&output.stdout))
}

pub fn parse_probe_output(json: &str) -> Result<MediaInfo> {
    let probe: FfprobeOutput =
        serde_json::from_str(json).context("Failed to parse ffprobe output")?;
    let format = probe.format.unwrap_or_default();

    let duration = format
        .get("duration")
        .and_then(Value::as_str)
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .map(Duration::from_secs_f64);

    let fields = format
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(text) => Some((key, text)),
            _ => None,
        })
        .collect();

    Ok(MediaInfo { duration, fields })
}

/// Renders whole seconds as `H:MM:SS`.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Remembers probe results per path; failures are cached as empty info.
#[derive(Debug, Default)]
pub struct ProbeCache {
    entries: HashMap<PathBuf, MediaInfo>,
}

impl ProbeCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, ffprobe: &Path, path: &Path) -> &MediaInfo {
        self.entries.entry(path.to_path_buf()).or_insert_with(|| {
            probe_media(ffprobe, path).unwrap_or_else(|e| {
                warn!("{e:#}");
                MediaInfo::default()
            })
        })
    }

    pub fn forget(&mut self, path: &Path) {
        self.entries.remove(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "format": {
            "filename": "/media/clip.mkv",
            "nb_streams": 2,
            "format_name": "matroska,webm",
            "duration": "95.480000",
            "bit_rate": "1205000",
            "tags": { "ENCODER": "Lavf60" }
        }
    }"#;

    #[test]
    fn test_parse_probe_output() {
        let info = parse_probe_output(SAMPLE).unwrap();
        assert_eq!(info.duration, Some(Duration::from_secs_f64(95.48)));
        assert_eq!(info.fields.get("filename").unwrap(), "/media/clip.mkv");
        assert!(!info.fields.contains_key("nb_streams"));
        assert!(!info.fields.contains_key("tags"));
    }

    #[test]
    fn test_info_lines_are_humanized() {
        let info = parse_probe_output(SAMPLE).unwrap();
        let lines = info.info_lines();
        assert!(lines.contains(&"Format name: matroska,webm".to_string()));
        assert!(lines.contains(&"Bit rate: 1205000".to_string()));
    }

    #[test]
    fn test_missing_format_section() {
        let info = parse_probe_output("{}").unwrap();
        assert_eq!(info, MediaInfo::default());
        assert!(parse_probe_output("not json").is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(0)), "0:00:00");
        assert_eq!(format_duration(Duration::from_secs_f64(95.9)), "0:01:35");
        assert_eq!(format_duration(Duration::from_secs(3 * 3600 + 5)), "3:00:05");
    }
}
