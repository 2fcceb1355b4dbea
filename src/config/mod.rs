pub mod load;
pub mod presets;
pub mod save;
pub mod types;
pub mod winff;

pub use presets::{Preset, PresetBook, PresetEntry, PresetError, validate_entry};
pub use save::{add_recent_path, save_presets, save_settings};
pub use types::{APP_DIR_NAME, Config, ConfigPaths, Language, MAX_RECENT_PATHS, UserSettings};
pub use winff::{WinffImport, import_winff_file, parse_winff_presets};
