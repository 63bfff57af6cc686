pub(crate) mod config;
pub(crate) mod diff;
pub(crate) mod merge;
pub(crate) mod stats;

use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use datsmith_lib::RunSettings;
use datsmith_lib::settings::{load_run_settings, resolve_output_dir, resolve_parallelism};

/// Settings shared by every command that loads DATs.
pub(crate) struct RunContext {
    pub parallelism: usize,
    pub settings: RunSettings,
}

impl RunContext {
    pub(crate) fn new(threads: Option<usize>) -> Self {
        let settings = load_run_settings();
        let parallelism = resolve_parallelism(threads, &settings);
        log::debug!("Using {} workers", parallelism);
        Self {
            parallelism,
            settings,
        }
    }

    pub(crate) fn output_dir(&self, cli_override: Option<PathBuf>) -> PathBuf {
        resolve_output_dir(cli_override, &self.settings)
    }
}

/// Log the files a command wrote.
pub(crate) fn report_written(paths: &[PathBuf]) {
    for path in paths {
        log::debug!("  {}", path.display());
    }
    log::info!(
        "{} Wrote {} file{}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        paths.len(),
        if paths.len() == 1 { "" } else { "s" },
    );
}

pub(crate) fn report_written_one(path: &Path) {
    log::info!(
        "{} Wrote {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        path.display().if_supports_color(Stdout, |t| t.cyan()),
    );
}
