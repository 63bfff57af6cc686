use std::path::PathBuf;

use datsmith_core::CoreError;
use datsmith_dat::DatError;
use thiserror::Error;

/// Errors from loading inputs, running an operation, or writing outputs.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Dat(#[from] DatError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings file: {0}")]
    SettingsParse(#[from] toml::de::Error),

    #[error("Could not serialize settings: {0}")]
    SettingsWrite(#[from] toml::ser::Error),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// An input argument does not exist.
    #[error("Input not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// A write task produced no result.
    #[error("Timed out writing {}", .0.display())]
    WriteTimeout(PathBuf),
}

impl RunError {
    pub fn missing_input(path: impl Into<PathBuf>) -> Self {
        Self::MissingInput(path.into())
    }
}
