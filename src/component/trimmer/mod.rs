//! Segment extraction
//!
//! Copies `[start, end)` of a queued file into a new file with ffmpeg.

mod main;
mod trim_command;

pub use main::Trimmer;
pub use trim_command::{TrimError, TrimRange, trim_job};
