mod ffmpeg_command;
mod ffprobe_info;
mod job;
mod job_runner;
mod media_scanner;
mod output_path;
mod path_validator;
mod progress_parser;
mod tool_locator;

pub use ffmpeg_command::{
    ArgumentTemplate, INPUT_PLACEHOLDER, OUTPUT_PLACEHOLDER, OverwritePolicy, TemplateError,
    build_arguments, build_command, command_line,
};
pub use ffprobe_info::{MediaInfo, ProbeCache, format_duration, parse_probe_output, probe_media};
pub use job::{Job, JobStatus};
pub use job_runner::{CancelToken, JobError, JobRunner, RunSummary, RunnerEvent, RunnerHandle};
pub use media_scanner::{MediaFile, MediaKind, collect_media_files, media_kind};
pub use output_path::{OutputTarget, converted_output_path, trimmed_output_path};
pub use path_validator::{ensure_directory_exists, validate_directory_exists, validate_file_exists};
pub use progress_parser::{
    OutputLines, ProgressParser, ProgressUpdate, parse_timestamp, percent_of,
};
pub use tool_locator::{FFMPEG, FFPROBE, ToolPaths, resolve_tools};
