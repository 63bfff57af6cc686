//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "datsmith")]
#[command(about = "Diff, merge and deduplicate ROM DAT catalogs", long_about = None)]
pub(crate) struct Cli {
    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Maximum number of files to load or write at once
    #[arg(short = 'j', long, global = true)]
    pub threads: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

/// DAT files or directories to read, in priority order.
#[derive(Args, Clone)]
pub(crate) struct InputArgs {
    /// DAT files or directories (searched recursively for .dat/.xml)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Split inputs into unique items, shared items and per-input leftovers
    Diff {
        #[command(flatten)]
        inputs: InputArgs,

        /// Write the catalog of items found in exactly one input
        #[arg(long)]
        no_dupes: bool,

        /// Write the catalog of items found in more than one input
        #[arg(long)]
        dupes: bool,

        /// Write one catalog per input with only its unique items
        #[arg(long)]
        individuals: bool,

        /// Output directory (defaults to the configured one, then ./out)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Strip from each input everything an earlier input already has
    Cascade {
        #[command(flatten)]
        inputs: InputArgs,

        /// Give later inputs priority instead of earlier ones
        #[arg(long)]
        reverse: bool,

        /// Do not write the highest-priority input's catalog
        #[arg(long)]
        skip_first: bool,

        /// Write each result next to its input
        #[arg(long, conflicts_with = "output_dir")]
        inplace: bool,

        /// Output directory (defaults to the configured one, then ./out)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Combine inputs into a single DAT
    Merge {
        #[command(flatten)]
        inputs: InputArgs,

        /// Remove duplicate items while merging
        #[arg(long)]
        dedupe: bool,

        /// Prefix machine names with each input's relative path
        #[arg(long)]
        superdat: bool,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Remove duplicate items from a DAT
    Dedupe {
        /// DAT file or directory
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Keep each item's machine name instead of renaming into the first one
        #[arg(long)]
        norename: bool,
    },

    /// Show item, hash and status counts for each input
    Stats {
        #[command(flatten)]
        inputs: InputArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage datsmith settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show current settings
    Show,

    /// Print the settings file path
    Path,

    /// Set the default worker count (omit to clear)
    SetParallelism {
        /// Number of concurrent workers
        n: Option<usize>,
    },

    /// Set the default output directory (omit to clear)
    SetOutputDir {
        /// Output directory
        dir: Option<PathBuf>,
    },
}
