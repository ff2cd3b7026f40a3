//! Settings file handling for bitfall.
//!
//! Settings live in a TOML file under the platform config directory. They are
//! turned into an immutable [`bitfall_core::RainConfig`] snapshot for the
//! engine, and a [`ConfigWatcher`] can pick up edits while the app runs.

mod error;
mod settings;
mod watcher;

use std::path::PathBuf;

use directories::ProjectDirs;

pub use error::SettingsError;
pub use settings::Settings;
pub use watcher::ConfigWatcher;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "bitfall")
}

/// Default location of the settings file.
pub fn default_config_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from(".bitfall.toml"))
}

/// Directory for log files.
pub fn log_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_local_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from(".bitfall-logs"))
}
