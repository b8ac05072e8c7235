pub mod banner;
pub mod dashboard;
pub mod file_picker;
pub mod markdown;
pub mod overlay;
pub mod transcript;
pub mod ui;
