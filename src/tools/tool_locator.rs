use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use which::which;

pub const FFMPEG: &str = "ffmpeg";
pub const FFPROBE: &str = "ffprobe";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

/// Explicit paths win; otherwise both tools are looked up on `PATH`.
pub fn resolve_tools(ffmpeg: Option<&Path>, ffprobe: Option<&Path>) -> Result<ToolPaths> {
    Ok(ToolPaths {
        ffmpeg: resolve_bin(ffmpeg, FFMPEG)?,
        ffprobe: resolve_bin(ffprobe, FFPROBE)?,
    })
}

fn resolve_bin(bin: Option<&Path>, default: &str) -> Result<PathBuf> {
    if let Some(path) = bin {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        bail!("Configured binary not found: {}", path.display());
    }

    which(default)
        .or_else(|_| {
            if cfg!(windows) {
                which(format!("{default}.exe"))
            } else {
                Err(which::Error::CannotFindBinaryPath)
            }
        })
        .with_context(|| format!("`{default}` not found in PATH"))
}
