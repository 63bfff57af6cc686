//! Orchestration for datsmith: input discovery, parallel loading, output
//! planning and writing, and user settings.
//!
//! The engine itself (`datsmith-core`) is single-threaded and I/O free.
//! This crate fans file work out over a [`WorkerPool`] and hands the engine
//! its inputs in a fixed order.

pub mod error;
pub mod inputs;
pub mod loader;
pub mod runner;
pub mod settings;
pub mod worker_pool;

pub use error::RunError;
pub use inputs::{InputFile, OutputTarget, expand_inputs, sanitize_file_name};
pub use loader::{load_inputs, load_paths};
pub use runner::{
    InputStats, PlannedOutput, StatsReport, run_cascade, run_dedupe, run_diff, run_merge,
    run_stats, write_outputs,
};
pub use settings::RunSettings;
pub use worker_pool::WorkerPool;
