use super::trim_command::{TrimRange, trim_job};
use crate::app_state::AppState;
use crate::component::run_monitor::{RunMonitor, print_summary, summary_status};
use crate::pause;
use crate::tools::{JobRunner, format_duration};
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use log::info;
use rust_i18n::t;

/// Cuts a segment out of one queued file into `<stem>_CROP.<ext>`.
pub struct Trimmer<'a> {
    term: &'a Term,
    state: &'a mut AppState,
}

impl<'a> Trimmer<'a> {
    pub const fn new(term: &'a Term, state: &'a mut AppState) -> Self {
        Self { term, state }
    }

    pub fn run(&mut self) -> Result<()> {
        let tools = self.state.require_tools()?;

        let files = self.state.queue.files();
        if files.is_empty() {
            self.state.set_warning(t!("converter.queue_empty"));
            return Ok(());
        }

        self.term.clear_screen()?;
        println!("{}", style(t!("trimmer.title")).cyan().bold());
        println!("{}", style(t!("common.esc_hint")).dim());

        let items: Vec<String> = files.iter().map(|f| f.file_name()).collect();
        let Some(index) = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("trimmer.file_prompt"))
            .items(&items)
            .default(0)
            .interact_on_opt(self.term)?
        else {
            return Ok(());
        };
        let input = files[index].path.clone();
        let length = self.state.probe_cache.get(&tools.ffprobe, &input).duration;

        if let Some(length) = length {
            println!(
                "{} {}",
                style(t!("trimmer.length")).dim(),
                format_duration(length)
            );
        }

        let start: String = Input::new()
            .with_prompt(t!("trimmer.start_prompt"))
            .default("0:00:00".to_string())
            .interact_text_on(self.term)?;
        let mut end_input = Input::new().with_prompt(t!("trimmer.end_prompt"));
        if let Some(length) = length {
            end_input = end_input.default(format_duration(length));
        }
        let end: String = end_input.interact_text_on(self.term)?;

        let range = match TrimRange::parse(&start, &end, length) {
            Ok(range) => range,
            Err(e) => {
                self.state.set_error(e.to_string());
                return Ok(());
            }
        };

        let settings = &self.state.config.settings;
        let Some(target) = settings.output_target() else {
            self.state.set_error(t!("settings.output_folder_unset"));
            return Ok(());
        };
        let job = trim_job(&input, &target, range, settings.overwrite_policy());

        println!("  {}", style(job.command_line(&tools.ffmpeg)).dim());
        let confirmed = Confirm::new()
            .with_prompt(t!("trimmer.confirm", output = job.output.display()))
            .default(true)
            .interact_on(self.term)?;
        if !confirmed {
            return Ok(());
        }

        info!(
            "Trimming {} from {} for {}",
            input.display(),
            format_duration(range.start),
            format_duration(range.length())
        );

        let handle = JobRunner::new(&tools.ffmpeg).start(vec![job]);
        let monitor = RunMonitor::new(
            &self.state.shutdown_signal,
            self.state.config.settings.show_tool_output,
            1,
        );
        let summary = monitor.watch(handle, |_| {});

        print_summary(&summary);
        let (kind, text) = summary_status(&summary);
        self.state.set_status(kind, text);
        pause(self.term)
    }
}
