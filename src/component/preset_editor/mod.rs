//! Preset management screens

mod main;

pub use main::PresetEditor;
