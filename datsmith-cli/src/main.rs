//! datsmith CLI
//!
//! Command-line interface for diffing, merging and deduplicating DAT catalogs.

mod cli_types;
mod commands;
mod error;

use std::io::Write;

use clap::Parser;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use cli_types::{Cli, Commands, ConfigAction};
use commands::RunContext;
use error::CliError;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "error:".if_supports_color(Stderr, |t| t.red()), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else if quiet {
        log::LevelFilter::Warn
    } else {
        log::LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .target(env_logger::Target::Stdout)
        .parse_default_env();
    if !verbose {
        // Plain messages; timestamps and levels only in verbose mode
        builder.format(|buf, record| writeln!(buf, "{}", record.args()));
    }
    builder.init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    // Config commands never touch DATs, so they skip the runtime
    let command = match cli.command {
        Commands::Config { action } => return run_config(action),
        command => command,
    };

    let ctx = RunContext::new(cli.threads);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::runtime(e.to_string()))?;

    runtime.block_on(async move {
        match command {
            Commands::Diff {
                inputs,
                no_dupes,
                dupes,
                individuals,
                output_dir,
            } => {
                let modes = commands::diff::modes_from_flags(no_dupes, dupes, individuals);
                commands::diff::run_diff(&ctx, &inputs.inputs, modes, output_dir).await
            }
            Commands::Cascade {
                inputs,
                reverse,
                skip_first,
                inplace,
                output_dir,
            } => {
                commands::diff::run_cascade(
                    &ctx,
                    &inputs.inputs,
                    reverse,
                    skip_first,
                    inplace,
                    output_dir,
                )
                .await
            }
            Commands::Merge {
                inputs,
                dedupe,
                superdat,
                output,
            } => commands::merge::run_merge(&ctx, &inputs.inputs, dedupe, superdat, &output).await,
            Commands::Dedupe {
                input,
                output,
                norename,
            } => commands::merge::run_dedupe(&ctx, &input, &output, norename).await,
            Commands::Stats { inputs, json } => {
                commands::stats::run_stats(&ctx, &inputs.inputs, json).await
            }
            Commands::Config { .. } => Ok(()),
        }
    })
}

fn run_config(action: ConfigAction) -> Result<(), CliError> {
    match action {
        ConfigAction::Show => commands::config::run_config_show(),
        ConfigAction::Path => {
            commands::config::run_config_path();
            Ok(())
        }
        ConfigAction::SetParallelism { n } => commands::config::run_set_parallelism(n),
        ConfigAction::SetOutputDir { dir } => commands::config::run_set_output_dir(dir),
    }
}
