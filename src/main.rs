use anyhow::Result;
use clap::Parser;
use console::{Term, style};
use ffqueue::app_state::AppState;
use ffqueue::config::{Config, ConfigPaths};
use ffqueue::init;
use ffqueue::menu::show_main_menu;
use ffqueue::signal::setup_shutdown_signal;
use log::{info, warn};
use rust_i18n::t;
use std::path::PathBuf;

rust_i18n::i18n!("locales", fallback = "en-US");

/// Queue media files and convert them with ffmpeg presets.
#[derive(Parser, Debug)]
#[command(name = "ffqueue", version, about)]
struct Cli {
    /// Write a log file to the config directory
    #[arg(short, long)]
    log: bool,

    /// Files or folders to add to the queue on startup
    files: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = ConfigPaths::default_location();
    init::init(&paths, cli.log)?;

    let term = Term::stdout();
    let shutdown_signal = setup_shutdown_signal();

    let config = Config::load(paths)?;
    rust_i18n::set_locale(config.settings.language.as_str());

    let presets_backup = config.presets_backup.clone();
    let mut state = AppState::new(config, shutdown_signal);
    if let Some(backup) = presets_backup {
        state.set_warning(t!("status.presets_backup", path = backup.display()));
    }
    if state.tools.is_some() {
        for path in &cli.files {
            if let Err(e) = state.add_path(path) {
                warn!("{e:#}");
                state.set_error(format!("{e:#}"));
            }
        }
    }

    loop {
        match show_main_menu(&term, &mut state) {
            Ok(true) => {}
            Ok(false) => {
                term.clear_screen()?;
                println!("\n{}", style(t!("main_menu.goodbye")).green().bold());
                info!("Program exited normally");
                break;
            }
            Err(e) => {
                warn!("Program error: {e}");
                eprintln!("{} {}", style(t!("main_menu.error_prefix")).red().bold(), e);
                break;
            }
        }
    }

    state.config.save()
}
