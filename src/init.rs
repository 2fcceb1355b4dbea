use crate::config::ConfigPaths;
use crate::tools::ensure_directory_exists;
use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use std::fs::OpenOptions;

/// Initialises logging. Without `log_to_file` only errors reach stderr unless
/// `RUST_LOG` says otherwise; with it, `info` and above go to the log file.
pub fn init(paths: &ConfigPaths, log_to_file: bool) -> Result<()> {
    if !log_to_file {
        Builder::from_env(Env::default().default_filter_or("error")).init();
        return Ok(());
    }

    ensure_directory_exists(paths.dir())?;
    let log_path = paths.log_file();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}
