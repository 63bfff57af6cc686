use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use datsmith_lib::settings::{
    DEFAULT_OUTPUT_DIR, load_run_settings_from, load_settings_string, save_max_parallelism,
    save_output_dir, settings_path,
};

use crate::error::CliError;

/// Show the settings file and the values it resolves to.
pub(crate) fn run_config_show() -> Result<(), CliError> {
    let path = settings_path();

    log::info!(
        "{}",
        "datsmith Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("");

    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    log::info!("");

    let settings = load_run_settings_from(&path).map_err(|e| CliError::config(e.to_string()))?;
    match settings.max_parallelism {
        Some(n) => log::info!("  max_parallelism: {}", n),
        None => log::info!(
            "  max_parallelism: {}",
            "(default: available cores)".if_supports_color(Stdout, |t| t.dimmed()),
        ),
    }
    match &settings.output_dir {
        Some(dir) => log::info!("  output_dir: {}", dir.display()),
        None => log::info!(
            "  output_dir: {}",
            format!("(default: {})", DEFAULT_OUTPUT_DIR).if_supports_color(Stdout, |t| t.dimmed()),
        ),
    }

    if let Some(contents) = load_settings_string() {
        log::debug!("Raw settings:\n{}", contents);
    }
    Ok(())
}

/// Print the settings file path.
pub(crate) fn run_config_path() {
    println!("{}", settings_path().display());
}

pub(crate) fn run_set_parallelism(n: Option<usize>) -> Result<(), CliError> {
    if n == Some(0) {
        return Err(CliError::config("max_parallelism must be at least 1"));
    }
    save_max_parallelism(n)?;
    match n {
        Some(n) => log::info!(
            "{} max_parallelism set to {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            n
        ),
        None => log::info!(
            "{} max_parallelism cleared",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        ),
    }
    Ok(())
}

pub(crate) fn run_set_output_dir(dir: Option<PathBuf>) -> Result<(), CliError> {
    save_output_dir(dir.as_deref())?;
    match dir {
        Some(dir) => log::info!(
            "{} output_dir set to {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            dir.display()
        ),
        None => log::info!(
            "{} output_dir cleared",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        ),
    }
    Ok(())
}
