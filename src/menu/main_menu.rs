use crate::app_state::{AppState, StatusKind, StatusMessage};
use crate::component::converter::print_queue;
use crate::config::{Language, save_settings};
use crate::menu::handlers::{
    run_add_files, run_choose_preset, run_conversion, run_file_info, run_preset_editor,
    run_remove_files, run_select_files, run_trimmer,
};
use crate::tools::{OutputTarget, ensure_directory_exists};
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use log::info;
use rust_i18n::t;
use std::path::PathBuf;

#[must_use]
pub fn styled_status(status: &StatusMessage) -> String {
    match status.kind {
        StatusKind::Info => style(&status.text).green().to_string(),
        StatusKind::Warning => style(&status.text).yellow().to_string(),
        StatusKind::Error => style(&status.text).red().bold().to_string(),
    }
}

fn print_header(state: &mut AppState) {
    println!("{}", style(t!("main_menu.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());
    println!();

    let preset = state.current_preset().map_or_else(
        || t!("main_menu.no_preset").to_string(),
        |p| format!("{} / {} (.{})", p.category, p.name, p.extension),
    );
    println!("{} {preset}", style(t!("main_menu.preset")).dim());

    let settings = &state.config.settings;
    let output = match settings.output_target() {
        Some(OutputTarget::SourceFolder) => t!("main_menu.source_folder").to_string(),
        Some(OutputTarget::Folder(folder)) => folder.display().to_string(),
        None => t!("main_menu.no_output").to_string(),
    };
    println!("{} {output}", style(t!("main_menu.output")).dim());
    let overwrite = if settings.overwrite_existing {
        t!("common.yes")
    } else {
        t!("common.no")
    };
    println!("{} {overwrite}", style(t!("main_menu.overwrite")).dim());

    println!();
    println!(
        "{}",
        style(t!("main_menu.queue", count = state.queue.len())).bold()
    );
    print_queue(&state.queue);

    if let Some(status) = state.status.take() {
        println!();
        println!("{}", styled_status(&status));
    }
    println!();
}

pub fn show_main_menu(term: &Term, state: &mut AppState) -> Result<bool> {
    term.clear_screen()?;
    print_header(state);

    let options = vec![
        t!("main_menu.opt_add"),
        t!("main_menu.opt_remove"),
        t!("main_menu.opt_select"),
        t!("main_menu.opt_info"),
        t!("main_menu.opt_preset"),
        t!("main_menu.opt_start"),
        t!("main_menu.opt_trim"),
        t!("main_menu.opt_presets"),
        t!("main_menu.opt_settings"),
        t!("main_menu.exit"),
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("main_menu.prompt"))
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => run_add_files(term, state),
        Some(1) => run_remove_files(term, state),
        Some(2) => run_select_files(term, state),
        Some(3) => run_file_info(term, state),
        Some(4) => run_choose_preset(term, state),
        Some(5) => run_conversion(term, state),
        Some(6) => run_trimmer(term, state),
        Some(7) => run_preset_editor(term, state),
        Some(8) => show_settings_menu(term, state)?,
        Some(9) | None => return Ok(false),
        _ => unreachable!(),
    }

    Ok(true)
}

fn on_off(value: bool) -> String {
    if value {
        t!("common.on").to_string()
    } else {
        t!("common.off").to_string()
    }
}

fn toggle(flag: &mut bool) {
    *flag = !*flag;
}

fn tool_label(path: Option<&PathBuf>) -> String {
    path.map_or_else(|| t!("settings.from_path").to_string(), |p| p.display().to_string())
}

fn show_settings_menu(term: &Term, state: &mut AppState) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style(t!("settings.title")).cyan().bold());
        println!("{}", style(t!("common.esc_hint")).dim());
        if let Some(status) = state.status.take() {
            println!("{}", styled_status(&status));
        }

        let settings = &state.config.settings;
        let folder = settings
            .output_folder
            .as_ref()
            .map_or_else(|| "-".to_string(), |f| f.display().to_string());
        let options = vec![
            format!("{}: {folder}", t!("settings.opt_output_folder")),
            format!(
                "{}: {}",
                t!("settings.opt_source_folder"),
                on_off(settings.use_source_folder)
            ),
            format!(
                "{}: {}",
                t!("settings.opt_overwrite"),
                on_off(settings.overwrite_existing)
            ),
            format!(
                "{}: {}",
                t!("settings.opt_tool_output"),
                on_off(settings.show_tool_output)
            ),
            format!(
                "{}: {}",
                t!("settings.opt_ffmpeg"),
                tool_label(settings.ffmpeg_path.as_ref())
            ),
            format!(
                "{}: {}",
                t!("settings.opt_ffprobe"),
                tool_label(settings.ffprobe_path.as_ref())
            ),
            format!("{}: {}", t!("settings.opt_language"), settings.language),
            t!("settings.back").to_string(),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("settings.prompt"))
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => set_output_folder(term, state)?,
            Some(1) => toggle(&mut state.config.settings.use_source_folder),
            Some(2) => toggle(&mut state.config.settings.overwrite_existing),
            Some(3) => toggle(&mut state.config.settings.show_tool_output),
            Some(4) => {
                state.config.settings.ffmpeg_path =
                    prompt_tool_path(term, &t!("settings.opt_ffmpeg"))?;
                state.locate_tools();
            }
            Some(5) => {
                state.config.settings.ffprobe_path =
                    prompt_tool_path(term, &t!("settings.opt_ffprobe"))?;
                state.locate_tools();
            }
            Some(6) => show_language_menu(term, state)?,
            Some(7) | None => break,
            _ => unreachable!(),
        }

        save_settings(&state.config.paths, &state.config.settings)?;
    }

    Ok(())
}

/// Empty input clears the override so the tool is looked up on `PATH` again.
fn prompt_tool_path(term: &Term, label: &str) -> Result<Option<PathBuf>> {
    let path: String = Input::new()
        .with_prompt(format!("{label} ({})", t!("settings.empty_for_path")))
        .allow_empty(true)
        .interact_text_on(term)?;
    let path = path.trim();
    Ok((!path.is_empty()).then(|| PathBuf::from(path)))
}

fn set_output_folder(term: &Term, state: &mut AppState) -> Result<()> {
    let mut input = Input::<String>::new()
        .with_prompt(t!("settings.output_folder_prompt"))
        .allow_empty(true);
    if let Some(folder) = &state.config.settings.output_folder {
        input = input.with_initial_text(folder.display().to_string());
    }
    let path = input.interact_text_on(term)?;
    let path = path.trim();
    if path.is_empty() {
        return Ok(());
    }

    let folder = PathBuf::from(path);
    if let Err(e) = ensure_directory_exists(&folder) {
        state.set_error(format!("{e:#}"));
        return Ok(());
    }

    info!("Output folder set to {}", folder.display());
    let settings = &mut state.config.settings;
    settings.output_folder = Some(folder);
    settings.use_source_folder = false;
    Ok(())
}

fn show_language_menu(term: &Term, state: &mut AppState) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.language.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let items: Vec<String> = Language::ALL.iter().map(ToString::to_string).collect();
    let default_index = Language::ALL
        .iter()
        .position(|&l| l == state.config.settings.language)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.language.prompt"))
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    let Some(selection) = selection else {
        return Ok(());
    };

    let selected_lang = Language::ALL[selection];
    if selected_lang != state.config.settings.language {
        state.config.settings.language = selected_lang;
        rust_i18n::set_locale(selected_lang.as_str());
        state.set_info(format!("{} {selected_lang}", t!("settings.saved")));
    }

    Ok(())
}
