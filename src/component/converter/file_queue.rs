use crate::tools::{JobStatus, MediaFile, MediaKind, RunnerEvent};
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedFile {
    pub id: Uuid,
    pub path: PathBuf,
    pub kind: MediaKind,
    pub duration: Option<Duration>,
    pub selected: bool,
    pub status: JobStatus,
    pub progress: u8,
}

impl QueuedFile {
    #[must_use]
    pub fn new(file: MediaFile, duration: Option<Duration>) -> Self {
        Self {
            id: Uuid::new_v4(),
            path: file.path,
            kind: file.kind,
            duration,
            selected: true,
            status: JobStatus::Pending,
            progress: 0,
        }
    }

    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned())
    }
}

/// The file list shown in the main window. Only the UI thread mutates it.
#[derive(Debug, Default)]
pub struct FileQueue {
    files: Vec<QueuedFile>,
}

impl FileQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    #[must_use]
    pub fn contains_path(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f.path == path)
    }

    /// Appends the file unless its path is already queued.
    pub fn push(&mut self, file: QueuedFile) -> bool {
        if self.contains_path(&file.path) {
            return false;
        }
        self.files.push(file);
        true
    }

    pub fn remove(&mut self, ids: &[Uuid]) -> usize {
        let before = self.files.len();
        self.files.retain(|f| !ids.contains(&f.id));
        before - self.files.len()
    }

    #[must_use]
    pub fn files(&self) -> &[QueuedFile] {
        &self.files
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&QueuedFile> {
        self.files.iter().find(|f| f.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut QueuedFile> {
        self.files.iter_mut().find(|f| f.id == id)
    }

    /// Selects exactly the files whose ids are listed.
    pub fn set_selection(&mut self, ids: &[Uuid]) {
        for file in &mut self.files {
            file.selected = ids.contains(&file.id);
        }
    }

    pub fn select_all(&mut self) {
        for file in &mut self.files {
            file.selected = true;
        }
    }

    #[must_use]
    pub fn selected(&self) -> Vec<&QueuedFile> {
        self.files.iter().filter(|f| f.selected).collect()
    }

    pub fn set_status(&mut self, id: Uuid, status: JobStatus) {
        if let Some(file) = self.get_mut(id) {
            if status == JobStatus::Completed {
                file.progress = 100;
                file.selected = false;
            }
            if status == JobStatus::Running {
                file.progress = 0;
            }
            file.status = status;
        }
    }

    pub fn set_progress(&mut self, id: Uuid, percent: u8) {
        if let Some(file) = self.get_mut(id) {
            file.progress = percent.min(100);
        }
    }

    /// Mirrors a runner event onto the entry sharing the job's id.
    pub fn apply_event(&mut self, event: &RunnerEvent) {
        match event {
            RunnerEvent::Started { job, .. } => self.set_status(*job, JobStatus::Running),
            RunnerEvent::Progress {
                job,
                percent: Some(percent),
                ..
            } => self.set_progress(*job, *percent),
            RunnerEvent::Progress { .. } | RunnerEvent::Output { .. } => {}
            RunnerEvent::Completed { job } => self.set_status(*job, JobStatus::Completed),
            RunnerEvent::Failed { job, error } => {
                self.set_status(*job, JobStatus::Failed(error.to_string()));
            }
            RunnerEvent::Cancelled { job } => self.set_status(*job, JobStatus::Cancelled),
            RunnerEvent::Finished(summary) => {
                for id in &summary.skipped {
                    self.set_status(*id, JobStatus::Skipped);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queued(path: &str) -> QueuedFile {
        QueuedFile::new(
            MediaFile {
                path: PathBuf::from(path),
                kind: MediaKind::Video,
            },
            None,
        )
    }

    #[test]
    fn test_push_ignores_duplicates() {
        let mut queue = FileQueue::new();
        assert!(queue.push(queued("/a.mp4")));
        assert!(!queue.push(queued("/a.mp4")));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_selection_and_remove() {
        let mut queue = FileQueue::new();
        queue.push(queued("/a.mp4"));
        queue.push(queued("/b.mp4"));
        queue.push(queued("/c.mp4"));
        let ids: Vec<Uuid> = queue.files().iter().map(|f| f.id).collect();

        queue.set_selection(&[ids[1]]);
        assert_eq!(queue.selected().len(), 1);
        assert_eq!(queue.selected()[0].path, Path::new("/b.mp4"));

        queue.select_all();
        assert_eq!(queue.selected().len(), 3);

        assert_eq!(queue.remove(&[ids[0], ids[2]]), 2);
        assert_eq!(queue.files()[0].id, ids[1]);
    }

    #[test]
    fn test_completion_unselects_file() {
        let mut queue = FileQueue::new();
        queue.push(queued("/a.mp4"));
        let id = queue.files()[0].id;

        queue.set_status(id, JobStatus::Running);
        queue.set_progress(id, 140);
        assert_eq!(queue.get(id).unwrap().progress, 100);

        queue.set_status(id, JobStatus::Completed);
        let file = queue.get(id).unwrap();
        assert!(!file.selected);
        assert_eq!(file.progress, 100);
    }

    #[test]
    fn test_remove_keeps_finished_entries_not_picked() {
        let mut queue = FileQueue::new();
        queue.push(queued("/a.mp4"));
        queue.push(queued("/b.mp4"));
        let ids: Vec<Uuid> = queue.files().iter().map(|f| f.id).collect();
        queue.set_status(ids[0], JobStatus::Completed);

        assert_eq!(queue.remove(&[ids[1]]), 1);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.get(ids[0]).unwrap().status, JobStatus::Completed);
    }

    #[test]
    fn test_runner_events_update_entries() {
        let mut queue = FileQueue::new();
        queue.push(queued("/a.mp4"));
        queue.push(queued("/b.mp4"));
        queue.push(queued("/c.mp4"));
        let ids: Vec<Uuid> = queue.files().iter().map(|f| f.id).collect();

        queue.apply_event(&RunnerEvent::Started { job: ids[0], pid: 1 });
        queue.apply_event(&RunnerEvent::Progress {
            job: ids[0],
            elapsed: Duration::from_secs(3),
            percent: Some(30),
        });
        assert_eq!(queue.get(ids[0]).unwrap().status, JobStatus::Running);
        assert_eq!(queue.get(ids[0]).unwrap().progress, 30);

        queue.apply_event(&RunnerEvent::Completed { job: ids[0] });
        queue.apply_event(&RunnerEvent::Cancelled { job: ids[1] });
        queue.apply_event(&RunnerEvent::Finished(crate::tools::RunSummary {
            completed: vec![ids[0]],
            failed: Vec::new(),
            cancelled: Some(ids[1]),
            skipped: vec![ids[2]],
        }));

        let statuses: Vec<_> = queue.files().iter().map(|f| f.status.clone()).collect();
        assert_eq!(
            statuses,
            [JobStatus::Completed, JobStatus::Cancelled, JobStatus::Skipped]
        );
        assert!(queue.get(ids[2]).unwrap().selected);
    }
}
