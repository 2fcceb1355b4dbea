//! Interactive features
//!
//! Each submodule owns one screen of the application and the logic behind it.

pub mod converter;
pub mod preset_editor;
pub mod run_monitor;
pub mod trimmer;

pub use converter::Converter;
pub use preset_editor::PresetEditor;
pub use trimmer::Trimmer;
