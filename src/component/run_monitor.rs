//! Terminal side of a run: progress bars, tool output and Ctrl-C handling.

use crate::app_state::StatusKind;
use crate::tools::{RunSummary, RunnerEvent, RunnerHandle, format_duration};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use rust_i18n::t;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

pub struct RunMonitor<'a> {
    shutdown_signal: &'a AtomicBool,
    show_tool_output: bool,
    job_count: usize,
}

impl<'a> RunMonitor<'a> {
    #[must_use]
    pub const fn new(shutdown_signal: &'a AtomicBool, show_tool_output: bool, job_count: usize) -> Self {
        Self {
            shutdown_signal,
            show_tool_output,
            job_count,
        }
    }

    /// Renders events until the runner finishes. Every event is handed to
    /// `on_event` first so the caller can update its own state.
    pub fn watch(&self, handle: RunnerHandle, mut on_event: impl FnMut(&RunnerEvent)) -> RunSummary {
        let mut bar: Option<ProgressBar> = None;
        let mut started = 0;
        self.shutdown_signal.store(false, Ordering::SeqCst);

        loop {
            if self.shutdown_signal.swap(false, Ordering::SeqCst) && !handle.is_cancelled() {
                info!("Cancel requested from the terminal");
                handle.cancel();
                print_line(bar.as_ref(), &style(t!("run.cancelling")).yellow().to_string());
            }

            let event = match handle.events().recv_timeout(TICK) {
                Ok(event) => event,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };
            on_event(&event);

            match &event {
                RunnerEvent::Started { .. } => {
                    started += 1;
                    bar = Some(self.job_bar(started));
                }
                RunnerEvent::Output { line, .. } => {
                    if self.show_tool_output {
                        print_line(bar.as_ref(), &style(line).dim().to_string());
                    }
                }
                RunnerEvent::Progress {
                    elapsed, percent, ..
                } => {
                    if let Some(bar) = &bar {
                        if let Some(percent) = percent {
                            bar.set_position(u64::from(*percent));
                        }
                        bar.set_message(format_duration(*elapsed));
                    }
                }
                RunnerEvent::Completed { .. } => {
                    if let Some(bar) = bar.take() {
                        bar.set_position(100);
                        bar.finish_with_message(style(t!("run.job_done")).green().to_string());
                    }
                }
                RunnerEvent::Failed { error, .. } => {
                    if let Some(bar) = bar.take() {
                        bar.abandon_with_message(style(t!("run.job_failed")).red().to_string());
                    }
                    println!("  {} {error}", style("✗").red());
                    for line in error.stderr_tail() {
                        println!("    {}", style(line).dim());
                    }
                }
                RunnerEvent::Cancelled { .. } => {
                    if let Some(bar) = bar.take() {
                        bar.abandon_with_message(style(t!("run.job_cancelled")).yellow().to_string());
                    }
                }
                RunnerEvent::Finished(_) => break,
            }
        }

        handle.join()
    }

    fn job_bar(&self, index: usize) -> ProgressBar {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{prefix:.bold} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("#>-"),
        );
        bar.set_prefix(format!("[{index}/{}]", self.job_count));
        bar.enable_steady_tick(Duration::from_millis(250));
        bar
    }
}

fn print_line(bar: Option<&ProgressBar>, line: &str) {
    match bar {
        Some(bar) => bar.println(line),
        None => println!("{line}"),
    }
}

/// Status line for a finished run: cancelled beats failed beats done.
#[must_use]
pub fn summary_status(summary: &RunSummary) -> (StatusKind, String) {
    if summary.was_cancelled() {
        (StatusKind::Warning, t!("run.task_cancelled").to_string())
    } else if !summary.failed.is_empty() {
        (
            StatusKind::Error,
            t!("run.some_failed", count = summary.failed.len()).to_string(),
        )
    } else {
        (StatusKind::Info, t!("run.all_done").to_string())
    }
}

/// Prints the totals of a finished run.
pub fn print_summary(summary: &RunSummary) {
    println!();
    let (kind, text) = summary_status(summary);
    let headline = match kind {
        StatusKind::Info => style(text).green(),
        StatusKind::Warning => style(text).yellow(),
        StatusKind::Error => style(text).red(),
    };
    println!("{}", headline.bold());
    println!(
        "  {} {}",
        t!("run.completed"),
        style(summary.completed.len()).green()
    );
    if !summary.failed.is_empty() {
        println!("  {} {}", t!("run.failed"), style(summary.failed.len()).red());
    }
    if !summary.skipped.is_empty() {
        println!("  {} {}", t!("run.skipped"), style(summary.skipped.len()).yellow());
    }
}
