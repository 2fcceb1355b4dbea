use crate::tools::path_validator::validate_directory_exists;
use anyhow::Result;
use mime_guess::mime;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Video => "▶",
            Self::Audio => "♪",
        }
    }
}

/// Guesses the media kind from the file extension; anything that is not
/// `video/*` or `audio/*` yields `None`.
#[must_use]
pub fn media_kind(path: &Path) -> Option<MediaKind> {
    mime_guess::from_path(path).iter().find_map(|m| {
        if m.type_() == mime::VIDEO {
            Some(MediaKind::Video)
        } else if m.type_() == mime::AUDIO {
            Some(MediaKind::Audio)
        } else {
            None
        }
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    pub kind: MediaKind,
}

/// A single file is accepted when it looks like media; a folder is walked recursively.
pub fn collect_media_files(path: &Path) -> Result<Vec<MediaFile>> {
    if path.is_file() {
        return Ok(media_kind(path)
            .map(|kind| MediaFile {
                path: path.to_path_buf(),
                kind,
            })
            .into_iter()
            .collect());
    }

    validate_directory_exists(path)?;

    let files = WalkDir::new(path)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let kind = media_kind(entry.path())?;
            Some(MediaFile {
                path: entry.into_path(),
                kind,
            })
        })
        .collect();

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_media_kind_by_extension() {
        assert_eq!(media_kind(Path::new("a.mp4")), Some(MediaKind::Video));
        assert_eq!(media_kind(Path::new("a.MKV")), Some(MediaKind::Video));
        assert_eq!(media_kind(Path::new("a.mp3")), Some(MediaKind::Audio));
        assert_eq!(media_kind(Path::new("a.flac")), Some(MediaKind::Audio));
        assert_eq!(media_kind(Path::new("notes.txt")), None);
        assert_eq!(media_kind(Path::new("no_extension")), None);
    }

    #[test]
    fn test_collect_from_folder_skips_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("season1");
        fs::create_dir(&nested).unwrap();
        fs::write(dir.path().join("b.mp4"), b"").unwrap();
        fs::write(dir.path().join("a.txt"), b"").unwrap();
        fs::write(nested.join("c.ogg"), b"").unwrap();

        let files = collect_media_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["b.mp4", "c.ogg"]);
        assert_eq!(files[1].kind, MediaKind::Audio);
    }

    #[test]
    fn test_collect_single_file_and_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let clip = dir.path().join("clip.webm");
        fs::write(&clip, b"").unwrap();

        assert_eq!(collect_media_files(&clip).unwrap().len(), 1);
        assert!(collect_media_files(&dir.path().join("missing.mp4")).is_err());
    }
}
