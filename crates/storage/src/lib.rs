#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod file;
pub mod json;
pub mod log;
pub mod settings;

pub use file::FileStorage;
pub use settings::{Settings, SettingsRepository};
