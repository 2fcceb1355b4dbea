use super::conversion_plan::build_plan;
use super::file_queue::{FileQueue, QueuedFile};
use crate::app_state::AppState;
use crate::component::run_monitor::{RunMonitor, print_summary, summary_status};
use crate::config::{add_recent_path, save_settings};
use crate::pause;
use crate::tools::{JobRunner, JobStatus, format_duration};
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, MultiSelect, Select};
use log::{info, warn};
use rust_i18n::t;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const PREVIEW_COMMANDS: usize = 3;

/// The conversion screens: queue editing, preset choice and running the plan.
pub struct Converter<'a> {
    term: &'a Term,
    state: &'a mut AppState,
}

impl<'a> Converter<'a> {
    pub const fn new(term: &'a Term, state: &'a mut AppState) -> Self {
        Self { term, state }
    }

    pub fn add_files(&mut self) -> Result<()> {
        self.state.require_tools()?;

        let Some(input) = self.prompt_input_path()? else {
            return Ok(());
        };
        let path = PathBuf::from(&input);

        println!("{}", style(t!("converter.scanning")).dim());
        let added = self.state.add_path(&path)?;

        add_recent_path(&mut self.state.config.settings, &input);
        if let Err(e) = save_settings(&self.state.config.paths, &self.state.config.settings) {
            warn!("{e:#}");
        }

        if added == 0 {
            self.state.set_warning(t!("converter.nothing_added"));
        } else {
            self.state.set_info(t!("converter.added", count = added));
        }
        Ok(())
    }

    fn prompt_input_path(&self) -> Result<Option<String>> {
        let recent_paths = &self.state.config.settings.recent_paths;

        if recent_paths.is_empty() {
            let path: String = Input::new()
                .with_prompt(t!("converter.path_prompt"))
                .interact_text_on(self.term)?;
            return Ok(Some(path.trim().to_string()));
        }

        let mut options: Vec<String> = recent_paths
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let indicator = if Path::new(p).exists() { "✓" } else { "✗" };
                format!("{} [{}] {}", i + 1, indicator, p)
            })
            .collect();
        options.push(t!("converter.new_path").to_string());

        println!("{}", style(t!("common.esc_hint")).dim());

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("converter.choose_path"))
            .items(&options)
            .default(0)
            .interact_on_opt(self.term)?;

        match selection {
            None => Ok(None),
            Some(idx) if idx < recent_paths.len() => Ok(Some(recent_paths[idx].clone())),
            Some(_) => {
                let path: String = Input::new()
                    .with_prompt(t!("converter.path_prompt"))
                    .interact_text_on(self.term)?;
                Ok(Some(path.trim().to_string()))
            }
        }
    }

    pub fn remove_files(&mut self) -> Result<()> {
        let Some(ids) = self.pick_files(&t!("converter.remove_prompt"), false)? else {
            return Ok(());
        };

        for id in &ids {
            if let Some(file) = self.state.queue.get(*id) {
                let path = file.path.clone();
                self.state.probe_cache.forget(&path);
            }
        }
        let removed = self.state.queue.remove(&ids);
        self.state.set_info(t!("converter.removed", count = removed));
        Ok(())
    }

    pub fn select_files(&mut self) -> Result<()> {
        if let Some(ids) = self.pick_files(&t!("converter.select_prompt"), true)? {
            self.state.queue.set_selection(&ids);
            self.state
                .set_info(t!("converter.selected", count = ids.len()));
        }
        Ok(())
    }

    /// Multi-select over the queue; `preselect` starts from the current selection.
    fn pick_files(&self, prompt: &str, preselect: bool) -> Result<Option<Vec<Uuid>>> {
        let files = self.state.queue.files();
        if files.is_empty() {
            println!("{}", style(t!("converter.queue_empty")).yellow());
            pause(self.term)?;
            return Ok(None);
        }

        let items: Vec<String> = files.iter().map(queue_label).collect();
        let defaults: Vec<bool> = files.iter().map(|f| preselect && f.selected).collect();

        let picked = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(&items)
            .defaults(&defaults)
            .interact_on_opt(self.term)?;

        Ok(picked.map(|indices| indices.into_iter().map(|i| files[i].id).collect()))
    }

    pub fn show_file_info(&mut self) -> Result<()> {
        let tools = self.state.require_tools()?;
        let files = self.state.queue.files();
        if files.is_empty() {
            println!("{}", style(t!("converter.queue_empty")).yellow());
            return pause(self.term);
        }

        let items: Vec<String> = files.iter().map(queue_label).collect();
        let Some(index) = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("converter.info_prompt"))
            .items(&items)
            .default(0)
            .interact_on_opt(self.term)?
        else {
            return Ok(());
        };

        let path = files[index].path.clone();
        let info = self.state.probe_cache.get(&tools.ffprobe, &path);

        println!();
        println!("{}", style(path.display()).cyan().bold());
        if info.fields.is_empty() {
            println!("{}", style(t!("converter.no_info")).yellow());
        }
        for line in info.info_lines() {
            println!("  {line}");
        }

        pause(self.term)
    }

    /// Category first, then a preset in it. Saves the choice.
    pub fn choose_preset(&mut self) -> Result<()> {
        let presets = &self.state.config.presets;
        let categories = presets.categories();
        if categories.is_empty() {
            self.state.set_warning(t!("converter.no_presets"));
            return Ok(());
        }

        let current_category = self.state.config.settings.category.as_deref();
        let default = current_category
            .and_then(|c| categories.iter().position(|x| *x == c))
            .unwrap_or(0);

        let Some(category_index) = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("converter.category_prompt"))
            .items(&categories)
            .default(default)
            .interact_on_opt(self.term)?
        else {
            return Ok(());
        };
        let category = categories[category_index].to_string();

        let names = presets.preset_names(&category);
        if names.is_empty() {
            self.state
                .set_warning(t!("converter.empty_category", category = category));
            return Ok(());
        }
        let current_preset = self.state.config.settings.preset.as_deref();
        let default = current_preset
            .and_then(|p| names.iter().position(|x| *x == p))
            .unwrap_or(0);

        let Some(preset_index) = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("converter.preset_prompt"))
            .items(&names)
            .default(default)
            .interact_on_opt(self.term)?
        else {
            return Ok(());
        };
        let name = names[preset_index].to_string();

        info!("Preset selected: {category}/{name}");
        let settings = &mut self.state.config.settings;
        settings.category = Some(category);
        settings.preset = Some(name);
        save_settings(&self.state.config.paths, &self.state.config.settings)?;
        Ok(())
    }

    /// Builds the plan from the selected files and runs it after confirmation.
    pub fn start(&mut self) -> Result<()> {
        let tools = self.state.require_tools()?;

        let Some(preset) = self.state.current_preset() else {
            self.state.set_warning(t!("converter.choose_preset_first"));
            return Ok(());
        };
        let settings = &self.state.config.settings;
        let target = settings.output_target();
        let jobs = match build_plan(
            &self.state.queue,
            &preset,
            target.as_ref(),
            settings.overwrite_policy(),
        ) {
            Ok(jobs) => jobs,
            Err(e) => {
                self.state.set_error(e.to_string());
                return Ok(());
            }
        };

        self.term.clear_screen()?;
        println!("{}", style(t!("converter.plan_title")).cyan().bold());
        println!(
            "{} {} / {}",
            style(t!("converter.preset_label")).dim(),
            preset.category,
            preset.name
        );
        for job in jobs.iter().take(PREVIEW_COMMANDS) {
            println!("  {}", style(job.command_line(&tools.ffmpeg)).dim());
        }
        if jobs.len() > PREVIEW_COMMANDS {
            println!(
                "  {}",
                style(t!("converter.more_jobs", count = jobs.len() - PREVIEW_COMMANDS)).dim()
            );
        }
        println!();

        let confirmed = Confirm::new()
            .with_prompt(t!("converter.confirm_start", count = jobs.len()))
            .default(true)
            .interact_on(self.term)?;
        if !confirmed {
            return Ok(());
        }

        let job_count = jobs.len();
        let handle = JobRunner::new(&tools.ffmpeg).start(jobs);
        let monitor = RunMonitor::new(
            &self.state.shutdown_signal,
            self.state.config.settings.show_tool_output,
            job_count,
        );
        let queue = &mut self.state.queue;
        let summary = monitor.watch(handle, |event| queue.apply_event(event));

        print_summary(&summary);
        let (kind, text) = summary_status(&summary);
        self.state.set_status(kind, text);
        pause(self.term)
    }
}

fn queue_label(file: &QueuedFile) -> String {
    let duration = file
        .duration
        .map_or_else(|| "-:--:--".to_string(), format_duration);
    format!("{} {} ({duration})", file.kind.icon(), file.file_name())
}

/// Prints the queue as a table for the main menu header.
pub fn print_queue(queue: &FileQueue) {
    if queue.is_empty() {
        println!("{}", style(t!("converter.queue_empty")).dim());
        return;
    }

    for file in queue.files() {
        let mark = if file.selected { "[x]" } else { "[ ]" };
        let status = match &file.status {
            JobStatus::Running => style(format!("{:>3}%", file.progress)).cyan(),
            JobStatus::Completed => style(file.status.to_string()).green(),
            JobStatus::Failed(_) => style(file.status.to_string()).red(),
            JobStatus::Cancelled | JobStatus::Skipped => style(file.status.to_string()).yellow(),
            JobStatus::Pending => style(file.status.to_string()).dim(),
        };
        println!("  {mark} {} {status}", queue_label(file));
        if let JobStatus::Failed(reason) = &file.status {
            println!("        {}", style(reason).red().dim());
        }
    }
}
