pub mod ui_manager;

pub use ui_manager::UIManager;
