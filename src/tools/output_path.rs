use std::path::{Path, PathBuf};

const SAME_PATH_PREFIX: &str = "CONVERTED!_";
const TRIM_SUFFIX: &str = "_CROP";

/// Where converted files are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    SourceFolder,
    Folder(PathBuf),
}

impl OutputTarget {
    #[must_use]
    pub fn directory_for(&self, input: &Path) -> PathBuf {
        match self {
            Self::SourceFolder => input
                .parent()
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
            Self::Folder(folder) => folder.clone(),
        }
    }
}

fn file_stem(input: &Path) -> String {
    input
        .file_stem()
        .map_or_else(|| "output".to_string(), |s| s.to_string_lossy().into_owned())
}

/// `<dir>/<stem>.<extension>`, renamed with a prefix when it would overwrite the input.
#[must_use]
pub fn converted_output_path(input: &Path, target: &OutputTarget, extension: &str) -> PathBuf {
    let directory = target.directory_for(input);
    let stem = file_stem(input);
    let candidate = directory.join(format!("{stem}.{extension}"));
    if candidate == input {
        directory.join(format!("{SAME_PATH_PREFIX}{stem}.{extension}"))
    } else {
        candidate
    }
}

/// `<dir>/<stem>_CROP.<original extension>`
#[must_use]
pub fn trimmed_output_path(input: &Path, target: &OutputTarget) -> PathBuf {
    let directory = target.directory_for(input);
    let stem = file_stem(input);
    match input.extension() {
        Some(ext) => directory.join(format!("{stem}{TRIM_SUFFIX}.{}", ext.to_string_lossy())),
        None => directory.join(format!("{stem}{TRIM_SUFFIX}")),
    }
}
