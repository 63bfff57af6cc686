//! User settings (worker count, default output directory).
//!
//! The settings file is `~/.config/datsmith/settings.toml`:
//!
//! ```toml
//! [run]
//! max_parallelism = 8
//! output_dir = "out"
//! ```

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::RunError;

/// Output directory used when neither the CLI nor the settings file name one.
pub const DEFAULT_OUTPUT_DIR: &str = "out";

/// Canonical path to the settings file: `~/.config/datsmith/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("datsmith").join("settings.toml")
}

/// The `[run]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSettings {
    pub max_parallelism: Option<usize>,
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    run: RunSettings,
}

/// Read the `[run]` table from `path`. A missing file yields defaults.
pub fn load_run_settings_from(path: &Path) -> Result<RunSettings, RunError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(RunSettings::default()),
        Err(e) => return Err(e.into()),
    };
    let file: SettingsFile = toml::from_str(&contents)?;
    Ok(file.run)
}

/// Read the `[run]` table from the settings file, falling back to defaults
/// (with a warning) when it cannot be read.
pub fn load_run_settings() -> RunSettings {
    let path = settings_path();
    load_run_settings_from(&path).unwrap_or_else(|e| {
        log::warn!("Ignoring {}: {}", path.display(), e);
        RunSettings::default()
    })
}

/// Resolve the worker count:
///
/// 1. CLI override (if `Some`)
/// 2. `run.max_parallelism` in `settings.toml`
/// 3. Available hardware parallelism
pub fn resolve_parallelism(cli_override: Option<usize>, settings: &RunSettings) -> usize {
    let valid = |n: &usize| *n > 0;
    cli_override
        .filter(valid)
        .or(settings.max_parallelism.filter(valid))
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
}

/// Resolve the output directory: CLI, then settings, then [`DEFAULT_OUTPUT_DIR`].
pub fn resolve_output_dir(cli_override: Option<PathBuf>, settings: &RunSettings) -> PathBuf {
    cli_override
        .or_else(|| settings.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
}

/// Set (or clear) one key of the `[run]` table in the file at `path`.
///
/// Uses `toml::Value` for a surgical update so unrelated tables and keys
/// are preserved.
pub fn save_run_value_at(
    path: &Path,
    key: &str,
    value: Option<toml::Value>,
) -> Result<(), RunError> {
    let mut doc: toml::Value = if let Ok(contents) = std::fs::read_to_string(path) {
        contents
            .parse()
            .unwrap_or_else(|_| toml::Value::Table(Default::default()))
    } else {
        toml::Value::Table(Default::default())
    };

    // Ensure [run] table exists
    let table = doc
        .as_table_mut()
        .ok_or_else(|| io::Error::other("settings.toml root is not a table"))?;
    let run = table
        .entry("run")
        .or_insert_with(|| toml::Value::Table(Default::default()));
    let run_table = run
        .as_table_mut()
        .ok_or_else(|| io::Error::other("[run] is not a table"))?;

    match value {
        Some(v) => {
            run_table.insert(key.to_string(), v);
        }
        None => {
            run_table.remove(key);
        }
    }

    // Write atomically
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let serialized = toml::to_string_pretty(&doc)?;
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, &serialized)?;
    std::fs::rename(&tmp, path)?;

    Ok(())
}

/// Save (or clear with `None`) `run.max_parallelism`.
pub fn save_max_parallelism(n: Option<usize>) -> Result<(), RunError> {
    let value = n.map(|n| toml::Value::Integer(n as i64));
    save_run_value_at(&settings_path(), "max_parallelism", value)
}

/// Save (or clear with `None`) `run.output_dir`.
pub fn save_output_dir(dir: Option<&Path>) -> Result<(), RunError> {
    let value = dir.map(|d| toml::Value::String(d.to_string_lossy().into_owned()));
    save_run_value_at(&settings_path(), "output_dir", value)
}

/// Load the full settings file as a pretty-printed TOML string for display.
pub fn load_settings_string() -> Option<String> {
    let contents = std::fs::read_to_string(settings_path()).ok()?;
    let doc: toml::Value = contents.parse().ok()?;
    toml::to_string_pretty(&doc).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_run_settings_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(settings, RunSettings::default());
    }

    #[test]
    fn surgical_update_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datsmith").join("settings.toml");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[other]\nkeep = true\n\n[run]\noutput_dir = \"dist\"\n").unwrap();

        save_run_value_at(&path, "max_parallelism", Some(toml::Value::Integer(3))).unwrap();
        let settings = load_run_settings_from(&path).unwrap();
        assert_eq!(settings.max_parallelism, Some(3));
        assert_eq!(settings.output_dir, Some(PathBuf::from("dist")));

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("keep = true"));

        save_run_value_at(&path, "output_dir", None).unwrap();
        assert_eq!(load_run_settings_from(&path).unwrap().output_dir, None);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[run]\nmax_parallelism = \"many\"\n").unwrap();
        assert!(matches!(
            load_run_settings_from(&path),
            Err(RunError::SettingsParse(_))
        ));
    }

    #[test]
    fn resolution_order() {
        let settings = RunSettings {
            max_parallelism: Some(6),
            output_dir: Some(PathBuf::from("saved")),
        };
        assert_eq!(resolve_parallelism(Some(2), &settings), 2);
        assert_eq!(resolve_parallelism(None, &settings), 6);
        assert!(resolve_parallelism(None, &RunSettings::default()) >= 1);
        // Zero is not a valid worker count
        assert!(resolve_parallelism(Some(0), &RunSettings::default()) >= 1);
        assert_eq!(resolve_parallelism(Some(0), &settings), 6);

        assert_eq!(
            resolve_output_dir(Some(PathBuf::from("cli")), &settings),
            PathBuf::from("cli")
        );
        assert_eq!(resolve_output_dir(None, &settings), PathBuf::from("saved"));
        assert_eq!(
            resolve_output_dir(None, &RunSettings::default()),
            PathBuf::from(DEFAULT_OUTPUT_DIR)
        );
    }
}
