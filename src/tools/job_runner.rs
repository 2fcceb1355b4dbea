//! Sequential job runner
//!
//! Runs jobs one at a time, in submission order, on a worker thread. The
//! caller (the UI thread) receives `RunnerEvent`s over a channel and may
//! cancel the run at any time; cancellation kills and reaps the active child.

use crate::tools::ffmpeg_command::build_command;
use crate::tools::job::Job;
use crate::tools::progress_parser::{OutputLines, ProgressParser, ProgressUpdate};
use log::{error, info, warn};
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ChildStderr, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

const STDERR_TAIL_LINES: usize = 5;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum JobError {
    #[error("{} not found, check that FFmpeg is installed", .0.display())]
    ToolNotFound(PathBuf),
    #[error("failed to start {}: {source}", .tool.display())]
    Spawn {
        tool: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("output folder does not exist: {}", .0.display())]
    OutputFolderMissing(PathBuf),
    #[error("the tool exited with {status}")]
    Exited {
        status: ExitStatus,
        stderr_tail: Vec<String>,
    },
    #[error("lost track of the tool process: {0}")]
    Wait(#[source] io::Error),
}

impl JobError {
    /// Last lines the tool wrote before failing, if any.
    #[must_use]
    pub fn stderr_tail(&self) -> &[String] {
        match self {
            Self::Exited { stderr_tail, .. } => stderr_tail,
            _ => &[],
        }
    }
}

#[derive(Debug)]
pub enum RunnerEvent {
    Started { job: Uuid, pid: u32 },
    Output { job: Uuid, line: String },
    Progress { job: Uuid, elapsed: Duration, percent: Option<u8> },
    Completed { job: Uuid },
    Failed { job: Uuid, error: JobError },
    Cancelled { job: Uuid },
    Finished(RunSummary),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: Vec<Uuid>,
    pub failed: Vec<Uuid>,
    pub cancelled: Option<Uuid>,
    pub skipped: Vec<Uuid>,
}

impl RunSummary {
    #[must_use]
    pub fn was_cancelled(&self) -> bool {
        self.cancelled.is_some() || !self.skipped.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

enum JobOutcome {
    Completed,
    Cancelled,
}

pub struct JobRunner {
    tool: PathBuf,
    poll_interval: Duration,
}

impl JobRunner {
    #[must_use]
    pub fn new(tool: &Path) -> Self {
        Self {
            tool: tool.to_path_buf(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Starts executing `jobs` in order on a worker thread.
    #[must_use]
    pub fn start(&self, jobs: Vec<Job>) -> RunnerHandle {
        let (events, receiver) = mpsc::channel();
        let cancel = CancelToken::new();
        let worker = Worker {
            tool: self.tool.clone(),
            poll_interval: self.poll_interval,
            cancel: cancel.clone(),
            events,
        };

        info!("Starting {} job(s) with {}", jobs.len(), self.tool.display());
        let thread = thread::spawn(move || worker.run(&jobs));

        RunnerHandle {
            events: receiver,
            cancel,
            thread: Some(thread),
        }
    }
}

pub struct RunnerHandle {
    events: Receiver<RunnerEvent>,
    cancel: CancelToken,
    thread: Option<JoinHandle<RunSummary>>,
}

impl RunnerHandle {
    #[must_use]
    pub const fn events(&self) -> &Receiver<RunnerEvent> {
        &self.events
    }

    /// Terminates the active job and skips the rest of the queue.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Waits for the worker to finish.
    pub fn join(mut self) -> RunSummary {
        self.thread
            .take()
            .and_then(|thread| thread.join().ok())
            .unwrap_or_default()
    }
}

impl Drop for RunnerHandle {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.cancel.cancel();
            let _ = thread.join();
        }
    }
}

struct Worker {
    tool: PathBuf,
    poll_interval: Duration,
    cancel: CancelToken,
    events: Sender<RunnerEvent>,
}

impl Worker {
    fn send(&self, event: RunnerEvent) {
        let _ = self.events.send(event);
    }

    fn run(self, jobs: &[Job]) -> RunSummary {
        let mut summary = RunSummary::default();

        for (index, job) in jobs.iter().enumerate() {
            if self.cancel.is_cancelled() {
                summary.skipped.extend(jobs[index..].iter().map(|j| j.id));
                break;
            }

            match self.run_job(job) {
                Ok(JobOutcome::Completed) => {
                    info!("Job finished: {}", job.output.display());
                    summary.completed.push(job.id);
                    self.send(RunnerEvent::Completed { job: job.id });
                }
                Ok(JobOutcome::Cancelled) => {
                    warn!("Job cancelled: {}", job.input.display());
                    summary.cancelled = Some(job.id);
                    summary.skipped.extend(jobs[index + 1..].iter().map(|j| j.id));
                    self.send(RunnerEvent::Cancelled { job: job.id });
                    break;
                }
                Err(e) => {
                    error!("Job failed [{}]: {e}", job.input.display());
                    summary.failed.push(job.id);
                    self.send(RunnerEvent::Failed { job: job.id, error: e });
                }
            }
        }

        info!(
            "Run finished - completed: {}, failed: {}, skipped: {}",
            summary.completed.len(),
            summary.failed.len(),
            summary.skipped.len()
        );
        self.send(RunnerEvent::Finished(summary.clone()));
        summary
    }

    fn run_job(&self, job: &Job) -> Result<JobOutcome, JobError> {
        if let Some(parent) = job.output.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(JobError::OutputFolderMissing(parent.to_path_buf()));
            }
        }

        let output_existed = job.output.exists();

        let mut command = build_command(&self.tool, &job.args);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        // Own process group: a terminal Ctrl-C reaches ffqueue only and is
        // turned into a cancel, instead of also killing the tool directly.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let mut child = command.spawn().map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                JobError::ToolNotFound(self.tool.clone())
            } else {
                JobError::Spawn {
                    tool: self.tool.clone(),
                    source,
                }
            }
        })?;

        let pid = child.id();
        info!(
            "Started [{pid}]: {} -> {}",
            job.input.display(),
            job.output.display()
        );
        self.send(RunnerEvent::Started { job: job.id, pid });

        let reader = child
            .stderr
            .take()
            .map(|stderr| self.spawn_output_reader(job, stderr));

        let status = loop {
            if self.cancel.is_cancelled() {
                warn!("Terminating [{pid}]");
                let _ = child.kill();
                let _ = child.wait();
                if let Some(reader) = reader {
                    let _ = reader.join();
                }
                Self::remove_partial_output(&job.output, output_existed);
                return Ok(JobOutcome::Cancelled);
            }

            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => thread::sleep(self.poll_interval),
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(JobError::Wait(e));
                }
            }
        };

        let stderr_tail = reader
            .and_then(|reader| reader.join().ok())
            .unwrap_or_default();

        if status.success() {
            Ok(JobOutcome::Completed)
        } else {
            Self::remove_partial_output(&job.output, output_existed);
            Err(JobError::Exited {
                status,
                stderr_tail,
            })
        }
    }

    /// Streams stderr into events; returns the last few lines for error reports.
    fn spawn_output_reader(&self, job: &Job, stderr: ChildStderr) -> JoinHandle<Vec<String>> {
        let events = self.events.clone();
        let job_id = job.id;
        let mut parser = match job.expected_duration {
            Some(total) if job.exact_duration => ProgressParser::with_fixed_total(total),
            total => ProgressParser::new(total),
        };

        thread::spawn(move || {
            let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);

            for line in OutputLines::new(stderr) {
                let Ok(line) = line else { break };

                if let Some(ProgressUpdate::Position { elapsed, percent }) = parser.feed(&line) {
                    let _ = events.send(RunnerEvent::Progress {
                        job: job_id,
                        elapsed,
                        percent,
                    });
                }

                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line.clone());
                let _ = events.send(RunnerEvent::Output { job: job_id, line });
            }

            tail.into_iter().collect()
        })
    }

    fn remove_partial_output(output: &Path, existed_before: bool) {
        if existed_before || !output.exists() {
            return;
        }
        match fs::remove_file(output) {
            Ok(()) => info!("Removed partial output: {}", output.display()),
            Err(e) => error!("Failed to remove partial output {}: {e}", output.display()),
        }
    }
}
