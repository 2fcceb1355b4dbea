pub mod handlers;
pub mod main_menu;

pub use main_menu::{show_main_menu, styled_status};
