use super::file_queue::FileQueue;
use crate::config::Preset;
use crate::tools::{Job, OutputTarget, OverwritePolicy, TemplateError, converted_output_path};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("no files selected")]
    NothingSelected,
    #[error("output folder is not set")]
    OutputFolderUnset,
    #[error("output folder does not exist: {}", .0.display())]
    OutputFolderMissing(PathBuf),
    #[error("{} and {} would both be written to {}", .first.display(), .second.display(), .output.display())]
    OutputCollision {
        first: PathBuf,
        second: PathBuf,
        output: PathBuf,
    },
    #[error("{} would overwrite another queued input", .0.display())]
    OutputIsInput(PathBuf),
    #[error("{}: {source}", .preset)]
    Template {
        preset: String,
        #[source]
        source: TemplateError,
    },
}

/// Turns the selected queue entries into jobs, in queue order.
pub fn build_plan(
    queue: &FileQueue,
    preset: &Preset,
    target: Option<&OutputTarget>,
    overwrite: OverwritePolicy,
) -> Result<Vec<Job>, PlanError> {
    let target = target.ok_or(PlanError::OutputFolderUnset)?;
    if let OutputTarget::Folder(folder) = target {
        if !folder.is_dir() {
            return Err(PlanError::OutputFolderMissing(folder.clone()));
        }
    }

    let selected = queue.selected();
    if selected.is_empty() {
        return Err(PlanError::NothingSelected);
    }

    let mut outputs: HashMap<PathBuf, &Path> = HashMap::new();
    let mut jobs = Vec::with_capacity(selected.len());

    for file in selected {
        let output = converted_output_path(&file.path, target, &preset.extension);

        if let Some(first) = outputs.get(&output) {
            return Err(PlanError::OutputCollision {
                first: first.to_path_buf(),
                second: file.path.clone(),
                output,
            });
        }
        if queue.contains_path(&output) {
            return Err(PlanError::OutputIsInput(output));
        }

        let job = Job::convert(file.id, &file.path, &output, preset, overwrite)
            .map_err(|source| PlanError::Template {
                preset: preset.name.clone(),
                source,
            })?
            .with_expected_duration(file.duration);

        outputs.insert(output, &file.path);
        jobs.push(job);
    }

    Ok(jobs)
}
