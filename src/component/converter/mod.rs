//! File queue and batch conversion
//!
//! Selected queue entries are turned into jobs with the chosen preset and run
//! one after another through ffmpeg.

mod conversion_plan;
mod file_queue;
mod main;

pub use conversion_plan::{PlanError, build_plan};
pub use file_queue::{FileQueue, QueuedFile};
pub use main::{Converter, print_queue};
