//! Progress parsing for the tool's stderr stream.
//!
//! FFmpeg prints the input header (with `Duration: HH:MM:SS.xx`) once, then
//! rewrites a status line containing `time=HH:MM:SS.xx` separated by `\r`.

use regex::Regex;
use std::io::{self, Read};
use std::sync::LazyLock;
use std::time::Duration;

static DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Duration:\s*(\d{2,}):(\d{2}):(\d{2}(?:\.\d+)?)").expect("Invalid regex")
});

static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"time=\s*(\d{2,}):(\d{2}):(\d{2}(?:\.\d+)?)").expect("Invalid regex")
});

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressUpdate {
    /// Total length of the media being processed.
    Total(Duration),
    Position {
        elapsed: Duration,
        percent: Option<u8>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ProgressParser {
    total: Option<Duration>,
    fixed_total: bool,
}

impl ProgressParser {
    #[must_use]
    pub fn new(total: Option<Duration>) -> Self {
        Self {
            total,
            fixed_total: false,
        }
    }

    /// `Duration:` lines from the header are ignored; used when only part of the input is encoded.
    #[must_use]
    pub fn with_fixed_total(total: Duration) -> Self {
        Self {
            total: Some(total),
            fixed_total: true,
        }
    }

    #[must_use]
    pub const fn total(&self) -> Option<Duration> {
        self.total
    }

    pub fn feed(&mut self, line: &str) -> Option<ProgressUpdate> {
        if let Some(caps) = TIME_PATTERN.captures(line) {
            let elapsed = parse_clock(&caps[1], &caps[2], &caps[3])?;
            let percent = self.total.and_then(|total| percent_of(elapsed, total));
            return Some(ProgressUpdate::Position { elapsed, percent });
        }

        if let Some(caps) = DURATION_PATTERN.captures(line) {
            let total = parse_clock(&caps[1], &caps[2], &caps[3])?;
            if self.fixed_total || total.is_zero() {
                return None;
            }
            self.total = Some(total);
            return Some(ProgressUpdate::Total(total));
        }

        None
    }
}

fn parse_clock(hours: &str, minutes: &str, seconds: &str) -> Option<Duration> {
    let h: u64 = hours.parse().ok()?;
    let m: u64 = minutes.parse().ok()?;
    let s: f64 = seconds.parse().ok()?;
    if m >= 60 || !(0.0..60.0).contains(&s) {
        return None;
    }
    let whole = h.checked_mul(3600)?.checked_add(m * 60)?;
    Duration::from_secs(whole).checked_add(Duration::try_from_secs_f64(s).ok()?)
}

/// Parses `HH:MM:SS[.ff]`, `MM:SS` or plain seconds.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let parts: Vec<&str> = raw.split(':').collect();
    match parts.as_slice() {
        [h, m, s] => parse_clock(h, m, s),
        [m, s] => parse_clock("0", m, s),
        [s] => {
            let secs: f64 = s.parse().ok()?;
            Duration::try_from_secs_f64(secs).ok()
        }
        _ => None,
    }
}

#[must_use]
pub fn percent_of(elapsed: Duration, total: Duration) -> Option<u8> {
    if total.is_zero() {
        return None;
    }
    let percent = elapsed.as_secs_f64() * 100.0 / total.as_secs_f64();
    Some(percent.clamp(0.0, 100.0) as u8)
}

/// Splits a byte stream into lines on either `\r` or `\n`, skipping blank lines.
pub struct OutputLines<R> {
    reader: R,
    pending: Vec<u8>,
    finished: bool,
}

impl<R: Read> OutputLines<R> {
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::new(),
            finished: false,
        }
    }

    fn take_line(bytes: &[u8]) -> Option<String> {
        let text = String::from_utf8_lossy(bytes);
        let text = text.trim_end();
        (!text.trim().is_empty()).then(|| text.to_string())
    }
}

impl<R: Read> Iterator for OutputLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(pos) = self.pending.iter().position(|b| matches!(b, b'\r' | b'\n')) {
                let chunk: Vec<u8> = self.pending.drain(..=pos).collect();
                if let Some(line) = Self::take_line(&chunk[..pos]) {
                    return Some(Ok(line));
                }
                continue;
            }

            if self.finished {
                let rest = std::mem::take(&mut self.pending);
                return Self::take_line(&rest).map(Ok);
            }

            let mut buf = [0u8; 4096];
            match self.reader.read(&mut buf) {
                Ok(0) => self.finished = true,
                Ok(n) => self.pending.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
