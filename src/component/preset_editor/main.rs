use crate::app_state::AppState;
use crate::config::{PresetBook, PresetError, import_winff_file, save_presets, save_settings};
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use log::{info, warn};
use rust_i18n::t;
use std::path::PathBuf;

/// Add, rename and remove categories and presets, import WinFF files, restore defaults.
pub struct PresetEditor<'a> {
    term: &'a Term,
    state: &'a mut AppState,
}

impl<'a> PresetEditor<'a> {
    pub const fn new(term: &'a Term, state: &'a mut AppState) -> Self {
        Self { term, state }
    }

    pub fn run(&mut self) -> Result<()> {
        loop {
            self.term.clear_screen()?;
            println!("{}", style(t!("presets.title")).cyan().bold());
            println!("{}", style(t!("common.esc_hint")).dim());
            if let Some(status) = self.state.status.take() {
                println!("{}", crate::menu::styled_status(&status));
            }
            println!();

            let options = vec![
                t!("presets.opt_add_category"),
                t!("presets.opt_rename_category"),
                t!("presets.opt_remove_category"),
                t!("presets.opt_add_preset"),
                t!("presets.opt_edit_preset"),
                t!("presets.opt_remove_preset"),
                t!("presets.opt_import"),
                t!("presets.opt_restore"),
                t!("presets.back"),
            ];

            let selection = Select::with_theme(&ColorfulTheme::default())
                .with_prompt(t!("presets.prompt"))
                .items(&options)
                .default(0)
                .interact_on_opt(self.term)?;

            let changed = match selection {
                Some(0) => self.add_category()?,
                Some(1) => self.rename_category()?,
                Some(2) => self.remove_category()?,
                Some(3) => self.add_preset()?,
                Some(4) => self.edit_preset()?,
                Some(5) => self.remove_preset()?,
                Some(6) => self.import_winff()?,
                Some(7) => self.restore_defaults()?,
                Some(8) | None => break,
                _ => unreachable!(),
            };

            if changed {
                self.persist()?;
            }
        }

        Ok(())
    }

    fn persist(&mut self) -> Result<()> {
        save_presets(&self.state.config.paths, &self.state.config.presets)?;

        let settings = &mut self.state.config.settings;
        let presets = &self.state.config.presets;
        let category_gone = settings
            .category
            .as_deref()
            .is_some_and(|c| !presets.contains_category(c));
        let preset_gone = match (&settings.category, &settings.preset) {
            (Some(category), Some(preset)) => presets.get(category, preset).is_none(),
            _ => false,
        };
        if category_gone {
            settings.category = None;
        }
        if category_gone || preset_gone {
            settings.preset = None;
        }
        save_settings(&self.state.config.paths, &self.state.config.settings)
    }

    /// Reports the outcome of a book edit. Returns whether the book changed.
    fn report<T>(&mut self, result: Result<T, PresetError>, done: impl FnOnce(T) -> String) -> bool {
        match result {
            Ok(value) => {
                let message = done(value);
                info!("{message}");
                self.state.set_info(message);
                true
            }
            Err(e) => {
                self.state.set_error(e.to_string());
                false
            }
        }
    }

    fn prompt_text(&self, prompt: &str, initial: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
        if let Some(initial) = initial {
            input = input.with_initial_text(initial);
        }
        Ok(input.interact_text_on(self.term)?.trim().to_string())
    }

    fn pick_category(&self) -> Result<Option<String>> {
        let categories = self.state.config.presets.categories();
        if categories.is_empty() {
            return Ok(None);
        }
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("converter.category_prompt"))
            .items(&categories)
            .default(0)
            .interact_on_opt(self.term)?;
        Ok(selection.map(|i| categories[i].to_string()))
    }

    fn pick_preset(&self, category: &str) -> Result<Option<String>> {
        let names = self.state.config.presets.preset_names(category);
        if names.is_empty() {
            return Ok(None);
        }
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("converter.preset_prompt"))
            .items(&names)
            .default(0)
            .interact_on_opt(self.term)?;
        Ok(selection.map(|i| names[i].to_string()))
    }

    fn confirm(&self, prompt: &str) -> Result<bool> {
        Ok(Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact_on(self.term)?)
    }

    fn add_category(&mut self) -> Result<bool> {
        let name = self.prompt_text(&t!("presets.category_name"), None)?;
        let result = self.state.config.presets.add_category(&name);
        Ok(self.report(result, |name| t!("presets.category_added", name = name).to_string()))
    }

    fn rename_category(&mut self) -> Result<bool> {
        let Some(current) = self.pick_category()? else {
            return Ok(false);
        };
        let new_name = self.prompt_text(&t!("presets.category_name"), Some(current.as_str()))?;
        let result = self.state.config.presets.rename_category(&current, &new_name);

        if let Ok(renamed) = &result {
            let settings = &mut self.state.config.settings;
            if settings.category.as_deref() == Some(current.as_str()) {
                settings.category = Some(renamed.clone());
            }
        }
        Ok(self.report(result, |name| t!("presets.category_renamed", name = name).to_string()))
    }

    fn remove_category(&mut self) -> Result<bool> {
        let Some(category) = self.pick_category()? else {
            return Ok(false);
        };
        if !self.confirm(&t!("presets.confirm_remove_category", name = category))? {
            return Ok(false);
        }
        let result = self.state.config.presets.remove_category(&category);
        Ok(self.report(result, |()| t!("presets.removed", name = category).to_string()))
    }

    fn add_preset(&mut self) -> Result<bool> {
        let Some(category) = self.pick_category()? else {
            self.state.set_warning(t!("converter.no_presets"));
            return Ok(false);
        };
        let name = self.prompt_text(&t!("presets.preset_name"), None)?;
        let params = self.prompt_text(&t!("presets.params"), None)?;
        let extension = self.prompt_text(&t!("presets.extension"), None)?;

        let result = self
            .state
            .config
            .presets
            .add_preset(&category, &name, &params, &extension);
        Ok(self.report(result, |name| t!("presets.preset_added", name = name).to_string()))
    }

    fn edit_preset(&mut self) -> Result<bool> {
        let Some(category) = self.pick_category()? else {
            return Ok(false);
        };
        let Some(current) = self.pick_preset(&category)? else {
            return Ok(false);
        };
        let Some(preset) = self.state.config.presets.get(&category, &current) else {
            return Ok(false);
        };

        let name = self.prompt_text(&t!("presets.preset_name"), Some(preset.name.as_str()))?;
        let params = self.prompt_text(&t!("presets.params"), Some(preset.params.as_str()))?;
        let extension = self.prompt_text(&t!("presets.extension"), Some(preset.extension.as_str()))?;

        let result = self
            .state
            .config
            .presets
            .update_preset(&category, &current, &name, &params, &extension);

        if let Ok(renamed) = &result {
            let settings = &mut self.state.config.settings;
            if settings.category.as_deref() == Some(category.as_str())
                && settings.preset.as_deref() == Some(current.as_str())
            {
                settings.preset = Some(renamed.clone());
            }
        }
        Ok(self.report(result, |name| t!("presets.preset_saved", name = name).to_string()))
    }

    fn remove_preset(&mut self) -> Result<bool> {
        let Some(category) = self.pick_category()? else {
            return Ok(false);
        };
        let Some(name) = self.pick_preset(&category)? else {
            return Ok(false);
        };
        if !self.confirm(&t!("presets.confirm_remove_preset", name = name))? {
            return Ok(false);
        }
        let result = self.state.config.presets.remove_preset(&category, &name);
        Ok(self.report(result, |()| t!("presets.removed", name = name).to_string()))
    }

    fn import_winff(&mut self) -> Result<bool> {
        let path = self.prompt_text(&t!("presets.import_path"), None)?;
        if path.is_empty() {
            return Ok(false);
        }

        let import = match import_winff_file(&PathBuf::from(&path)) {
            Ok(import) => import,
            Err(e) => {
                warn!("{e:#}");
                self.state.set_error(format!("{e:#}"));
                return Ok(false);
            }
        };

        let merged = self.state.config.presets.merge(import.presets);
        info!("Imported {merged} preset(s) from {path}, skipped {}", import.skipped);
        self.state.set_info(t!(
            "presets.imported",
            count = merged,
            skipped = import.skipped
        ));
        Ok(merged > 0)
    }

    fn restore_defaults(&mut self) -> Result<bool> {
        if !self.confirm(&t!("presets.confirm_restore"))? {
            return Ok(false);
        }
        self.state.config.presets = PresetBook::defaults()?;
        info!("Presets restored to defaults");
        self.state.set_info(t!("presets.restored"));
        Ok(true)
    }
}
