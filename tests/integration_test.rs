//! Integration tests: the runner drives a small shell script standing in for ffmpeg.

#![cfg(unix)]

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ffqueue::component::converter::{FileQueue, PlanError, QueuedFile, build_plan};
use ffqueue::component::trimmer::{TrimRange, trim_job};
use ffqueue::config::{Preset, PresetBook};
use ffqueue::tools::{
    Job, JobError, JobRunner, JobStatus, MediaFile, MediaKind, OutputTarget, OverwritePolicy,
    RunnerEvent, RunnerHandle,
};
use tempfile::TempDir;
use uuid::Uuid;

const SHELL: &str = "/bin/sh";

/// Records its input, reports 10 s of progress and creates the output.
/// An input named `bad.mkv` fails with exit code 3.
const CONVERT_SCRIPT: &str = r#"
for last; do :; done
echo "$2" >> "$(dirname "$0")/calls.log"
printf '  Duration: 00:00:10.00, start: 0.000000, bitrate: 1 kb/s\n' >&2
printf 'frame=1 time=00:00:05.00 bitrate=1\rframe=2 time=00:00:10.00 bitrate=1\r' >&2
case "$2" in
  */bad.mkv) echo "bad input: invalid data" >&2; exit 3 ;;
esac
touch "$last"
"#;

/// Starts writing the output and then hangs until killed.
const HANG_SCRIPT: &str = r#"
for last; do :; done
printf '  Duration: 00:01:00.00, start: 0.000000\n' >&2
echo partial >> "$last"
exec sleep 30
"#;

struct Fixture {
    dir: TempDir,
    script: PathBuf,
}

impl Fixture {
    fn new(script: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake-ffmpeg.sh");
        fs::write(&path, script).unwrap();
        Self { dir, script: path }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn input(&self, name: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, b"media").unwrap();
        path
    }

    /// Runs the script through the shell so nothing has to be made executable.
    fn job(&self, input: &Path, output: &Path) -> Job {
        let args = vec![
            OsString::from("-i"),
            input.as_os_str().to_owned(),
            OsString::from("-n"),
            output.as_os_str().to_owned(),
        ];
        self.scripted(Job::new(Uuid::new_v4(), input, output, "test", args))
    }

    fn scripted(&self, mut job: Job) -> Job {
        job.args.insert(0, self.script.clone().into_os_string());
        job
    }

    fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.path("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

fn runner() -> JobRunner {
    JobRunner::new(Path::new(SHELL)).with_poll_interval(Duration::from_millis(10))
}

fn drain(handle: &RunnerHandle) -> Vec<RunnerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = handle.events().recv_timeout(Duration::from_secs(20)) {
        let finished = matches!(event, RunnerEvent::Finished(_));
        events.push(event);
        if finished {
            break;
        }
    }
    events
}

fn started_ids(events: &[RunnerEvent]) -> Vec<Uuid> {
    events
        .iter()
        .filter_map(|e| match e {
            RunnerEvent::Started { job, .. } => Some(*job),
            _ => None,
        })
        .collect()
}

#[test]
fn test_jobs_run_in_submission_order() {
    let fixture = Fixture::new(CONVERT_SCRIPT);
    let jobs: Vec<Job> = ["c.mkv", "a.mkv", "b.mkv"]
        .iter()
        .map(|name| {
            let input = fixture.input(name);
            let output = input.with_extension("mp4");
            fixture.job(&input, &output)
        })
        .collect();
    let ids: Vec<Uuid> = jobs.iter().map(|j| j.id).collect();

    let handle = runner().start(jobs.clone());
    let events = drain(&handle);
    let summary = handle.join();

    assert_eq!(started_ids(&events), ids);
    assert_eq!(summary.completed, ids);
    assert!(summary.failed.is_empty());
    assert!(!summary.was_cancelled());

    let calls = fixture.calls();
    let expected: Vec<String> = jobs.iter().map(|j| j.input.display().to_string()).collect();
    assert_eq!(calls, expected);
    for job in &jobs {
        assert!(job.output.exists());
    }
}

#[test]
fn test_progress_is_parsed_from_carriage_return_lines() {
    let fixture = Fixture::new(CONVERT_SCRIPT);
    let input = fixture.input("clip.mkv");
    let job = fixture.job(&input, &fixture.path("clip.mp4"));

    let handle = runner().start(vec![job]);
    let events = drain(&handle);
    handle.join();

    let percents: Vec<u8> = events
        .iter()
        .filter_map(|e| match e {
            RunnerEvent::Progress {
                percent: Some(p), ..
            } => Some(*p),
            _ => None,
        })
        .collect();
    assert_eq!(percents, [50, 100]);

    let output_lines = events
        .iter()
        .filter(|e| matches!(e, RunnerEvent::Output { .. }))
        .count();
    assert_eq!(output_lines, 3);
}

#[test]
fn test_failed_job_does_not_stop_the_queue() {
    let fixture = Fixture::new(CONVERT_SCRIPT);
    let mut queue = FileQueue::new();
    for name in ["one.mkv", "bad.mkv", "three.mkv"] {
        queue.push(QueuedFile::new(
            MediaFile {
                path: fixture.input(name),
                kind: MediaKind::Video,
            },
            Some(Duration::from_secs(10)),
        ));
    }
    let ids: Vec<Uuid> = queue.files().iter().map(|f| f.id).collect();

    let preset = Preset::new("MP4", "Copy", "-c copy", "mp4");
    let jobs: Vec<Job> = build_plan(
        &queue,
        &preset,
        Some(&OutputTarget::SourceFolder),
        OverwritePolicy::Keep,
    )
    .unwrap()
    .into_iter()
    .map(|job| fixture.scripted(job))
    .collect();

    let handle = runner().start(jobs);
    let events = drain(&handle);
    for event in &events {
        queue.apply_event(event);
    }
    let summary = handle.join();

    assert_eq!(summary.completed, [ids[0], ids[2]]);
    assert_eq!(summary.failed, [ids[1]]);

    let error = events
        .iter()
        .find_map(|e| match e {
            RunnerEvent::Failed { error, .. } => Some(error),
            _ => None,
        })
        .unwrap();
    assert!(matches!(error, JobError::Exited { status, .. } if status.code() == Some(3)));
    assert!(
        error
            .stderr_tail()
            .iter()
            .any(|line| line.contains("bad input"))
    );

    assert_eq!(queue.len(), 3);
    assert_eq!(queue.get(ids[0]).unwrap().status, JobStatus::Completed);
    assert!(matches!(queue.get(ids[1]).unwrap().status, JobStatus::Failed(_)));
    assert_eq!(queue.get(ids[2]).unwrap().status, JobStatus::Completed);
    assert_eq!(queue.selected().len(), 1);
    assert!(!fixture.path("bad.mp4").exists());
}

#[test]
fn test_cancel_kills_the_process_and_skips_the_rest() {
    let fixture = Fixture::new(HANG_SCRIPT);
    let first = fixture.job(&fixture.input("long.mkv"), &fixture.path("long.mp4"));
    let second = fixture.job(&fixture.input("next.mkv"), &fixture.path("next.mp4"));
    let (first_id, second_id) = (first.id, second.id);

    let handle = runner().start(vec![first, second]);

    let pid = loop {
        match handle.events().recv_timeout(Duration::from_secs(10)).unwrap() {
            RunnerEvent::Started { pid, .. } => break pid,
            _ => continue,
        }
    };
    // Give the script time to create its output.
    let output = fixture.path("long.mp4");
    for _ in 0..200 {
        if output.exists() {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    handle.cancel();
    assert!(handle.is_cancelled());
    let events = drain(&handle);
    let summary = handle.join();

    assert_eq!(summary.cancelled, Some(first_id));
    assert_eq!(summary.skipped, [second_id]);
    assert!(summary.completed.is_empty());
    assert!(
        events
            .iter()
            .any(|e| matches!(e, RunnerEvent::Cancelled { job } if *job == first_id))
    );
    assert!(!started_ids(&events).contains(&second_id));

    // Killed and reaped: no process and no zombie entry remain.
    #[cfg(target_os = "linux")]
    assert!(!Path::new(&format!("/proc/{pid}")).exists());
    let _ = pid;

    assert!(!output.exists(), "partial output should be removed");
    assert!(!fixture.path("next.mp4").exists());
}

#[test]
fn test_cancel_keeps_a_file_that_existed_before() {
    let fixture = Fixture::new(HANG_SCRIPT);
    let output = fixture.path("keep.mp4");
    fs::write(&output, b"earlier result").unwrap();
    let job = fixture.job(&fixture.input("keep.mkv"), &output);

    let handle = runner().start(vec![job]);
    loop {
        if let RunnerEvent::Started { .. } = handle.events().recv_timeout(Duration::from_secs(10)).unwrap() {
            break;
        }
    }
    handle.cancel();
    drain(&handle);
    handle.join();

    assert!(output.exists());
}

/// Process group id from `/proc/<pid>/stat` (the fifth field).
#[cfg(target_os = "linux")]
fn process_group_of(pid: u32) -> u32 {
    let stat = fs::read_to_string(format!("/proc/{pid}/stat")).unwrap();
    let after_name = &stat[stat.rfind(')').unwrap() + 1..];
    after_name.split_whitespace().nth(2).unwrap().parse().unwrap()
}

#[cfg(target_os = "linux")]
#[test]
fn test_tool_runs_outside_the_terminal_process_group() {
    let fixture = Fixture::new(HANG_SCRIPT);
    let job = fixture.job(&fixture.input("group.mkv"), &fixture.path("group.mp4"));

    let handle = runner().start(vec![job]);
    let pid = loop {
        if let RunnerEvent::Started { pid, .. } = handle.events().recv_timeout(Duration::from_secs(10)).unwrap() {
            break pid;
        }
    };

    let group = process_group_of(pid);
    handle.cancel();
    drain(&handle);
    let summary = handle.join();

    assert_eq!(group, pid);
    assert_ne!(group, process_group_of(std::process::id()));
    assert!(summary.cancelled.is_some());
}

#[test]
fn test_missing_tool_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("a.mkv");
    fs::write(&input, b"media").unwrap();
    let job = Job::new(Uuid::new_v4(), &input, &dir.path().join("a.mp4"), "test", Vec::new());

    let handle = JobRunner::new(&dir.path().join("no-such-ffmpeg")).start(vec![job]);
    let events = drain(&handle);
    let summary = handle.join();

    assert_eq!(summary.failed.len(), 1);
    assert!(events.iter().any(|e| matches!(
        e,
        RunnerEvent::Failed {
            error: JobError::ToolNotFound(_),
            ..
        }
    )));
}

#[test]
fn test_missing_output_folder_fails_before_spawning() {
    let fixture = Fixture::new(CONVERT_SCRIPT);
    let input = fixture.input("a.mkv");
    let job = fixture.job(&input, &fixture.path("gone/a.mp4"));

    let handle = runner().start(vec![job]);
    let events = drain(&handle);
    handle.join();

    assert!(events.iter().any(|e| matches!(
        e,
        RunnerEvent::Failed {
            error: JobError::OutputFolderMissing(_),
            ..
        }
    )));
    assert!(fixture.calls().is_empty());
}

#[test]
fn test_trim_job_runs_with_segment_length() {
    let fixture = Fixture::new(CONVERT_SCRIPT);
    let input = fixture.input("movie.mkv");
    let range = TrimRange::parse("0:00:02", "0:00:07", Some(Duration::from_secs(10))).unwrap();
    let job = fixture.scripted(trim_job(
        &input,
        &OutputTarget::SourceFolder,
        range,
        OverwritePolicy::Overwrite,
    ));

    let handle = runner().start(vec![job]);
    let events = drain(&handle);
    let summary = handle.join();

    assert_eq!(summary.completed.len(), 1);
    assert!(fixture.path("movie_CROP.mkv").exists());

    // The header reports 10 s but the segment is 5 s long.
    let last_percent = events.iter().rev().find_map(|e| match e {
        RunnerEvent::Progress {
            percent: Some(p), ..
        } => Some(*p),
        _ => None,
    });
    assert_eq!(last_percent, Some(100));
}

#[test]
fn test_default_presets_produce_well_formed_commands() {
    let out = tempfile::tempdir().unwrap();
    let input = Path::new("/media/My Clip.mov");
    let mut queue = FileQueue::new();
    queue.push(QueuedFile::new(
        MediaFile {
            path: input.to_path_buf(),
            kind: MediaKind::Video,
        },
        None,
    ));
    let target = OutputTarget::Folder(out.path().to_path_buf());
    let book = PresetBook::defaults().unwrap();

    for category in book.categories() {
        for name in book.preset_names(category) {
            let preset = book.get(category, name).unwrap();
            let jobs = build_plan(&queue, &preset, Some(&target), OverwritePolicy::Overwrite)
                .unwrap_or_else(|e| panic!("{category}/{name}: {e}"));
            let args = &jobs[0].args;
            let output = out.path().join(format!("My Clip.{}", preset.extension));

            assert_eq!(
                args.iter().filter(|a| a.as_os_str() == input.as_os_str()).count(),
                1,
                "{category}/{name}"
            );
            assert_eq!(
                args.iter().filter(|a| a.as_os_str() == output.as_os_str()).count(),
                1,
                "{category}/{name}"
            );
            assert_eq!(args.last().unwrap(), output.as_os_str());
            assert_eq!(args[args.len() - 2], "-y");
            assert!(args.iter().all(|a| !a.to_string_lossy().contains('{')));
        }
    }
}

#[test]
fn test_collisions_are_rejected_before_running() {
    let out = tempfile::tempdir().unwrap();
    let mut queue = FileQueue::new();
    for path in ["/a/song.flac", "/b/song.wav"] {
        queue.push(QueuedFile::new(
            MediaFile {
                path: PathBuf::from(path),
                kind: MediaKind::Audio,
            },
            None,
        ));
    }
    let preset = Preset::new("Audio", "MP3", "-c:a libmp3lame -b:a 192k", "mp3");
    let target = OutputTarget::Folder(out.path().to_path_buf());

    let err = build_plan(&queue, &preset, Some(&target), OverwritePolicy::Keep).unwrap_err();
    assert!(matches!(err, PlanError::OutputCollision { .. }));

    let ids: Vec<Uuid> = queue.files().iter().map(|f| f.id).collect();
    queue.set_selection(&ids[..1]);
    assert_eq!(
        build_plan(&queue, &preset, Some(&target), OverwritePolicy::Keep)
            .unwrap()
            .len(),
        1
    );
}
