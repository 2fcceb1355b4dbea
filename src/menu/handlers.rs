use crate::app_state::AppState;
use crate::component::{Converter, PresetEditor, Trimmer};
use anyhow::Result;
use console::Term;
use log::warn;

/// Errors from a screen end up in the status line instead of ending the program.
fn report(state: &mut AppState, result: Result<()>) {
    if let Err(e) = result {
        warn!("{e:#}");
        state.set_error(format!("{e:#}"));
    }
}

pub fn run_add_files(term: &Term, state: &mut AppState) {
    let result = Converter::new(term, state).add_files();
    report(state, result);
}

pub fn run_remove_files(term: &Term, state: &mut AppState) {
    let result = Converter::new(term, state).remove_files();
    report(state, result);
}

pub fn run_select_files(term: &Term, state: &mut AppState) {
    let result = Converter::new(term, state).select_files();
    report(state, result);
}

pub fn run_file_info(term: &Term, state: &mut AppState) {
    let result = Converter::new(term, state).show_file_info();
    report(state, result);
}

pub fn run_choose_preset(term: &Term, state: &mut AppState) {
    let result = Converter::new(term, state).choose_preset();
    report(state, result);
}

pub fn run_conversion(term: &Term, state: &mut AppState) {
    let result = Converter::new(term, state).start();
    report(state, result);
}

pub fn run_trimmer(term: &Term, state: &mut AppState) {
    let result = Trimmer::new(term, state).run();
    report(state, result);
}

pub fn run_preset_editor(term: &Term, state: &mut AppState) {
    let result = PresetEditor::new(term, state).run();
    report(state, result);
}
