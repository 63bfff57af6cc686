//! End-to-end operations: load inputs, run the engine, write outputs.

use std::path::{Path, PathBuf};

use datsmith_core::{
    BucketOptions, CascadeOptions, Catalog, DatHeader, DiffModes, PlainMergeOptions, Statistics,
    diff_cascade, diff_no_cascade, merge_plain,
};
use datsmith_dat::write_dat_file;
use serde::Serialize;

use crate::error::RunError;
use crate::inputs::{OutputTarget, expand_inputs, sanitize_file_name};
use crate::loader::{load_inputs, load_paths};
use crate::worker_pool::WorkerPool;

/// A catalog and the file it will be written to.
#[derive(Debug)]
pub struct PlannedOutput {
    pub path: PathBuf,
    pub catalog: Catalog,
}

/// Write every planned output, up to `parallelism` at a time.
///
/// All writes are attempted. Returns the written paths in plan order, or
/// the first error after logging every failure.
pub async fn write_outputs(
    outputs: Vec<PlannedOutput>,
    parallelism: usize,
    norename: bool,
) -> Result<Vec<PathBuf>, RunError> {
    let paths: Vec<PathBuf> = outputs.iter().map(|o| o.path.clone()).collect();

    let pool = WorkerPool::start(parallelism, outputs, move |output: PlannedOutput| async move {
        tokio::task::spawn_blocking(move || write_one(&output.path, &output.catalog, norename))
            .await
    });

    let mut first_error = None;
    for (result, path) in pool.collect_ordered().await.into_iter().zip(&paths) {
        let outcome = match result {
            Some(Ok(outcome)) => outcome,
            Some(Err(e)) => Err(RunError::from(e)),
            None => Err(RunError::WriteTimeout(path.clone())),
        };
        match outcome {
            Ok(()) => log::info!("Wrote {}", path.display()),
            Err(e) => {
                log::error!("Failed to write {}: {}", path.display(), e);
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(paths),
    }
}

fn write_one(path: &Path, catalog: &Catalog, norename: bool) -> Result<(), RunError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    write_dat_file(path, catalog, norename)?;
    Ok(())
}

fn combined_path(dir: &Path, header: &DatHeader) -> PathBuf {
    dir.join(format!("{}.dat", sanitize_file_name(&header.name)))
}

/// No-cascade diff. Combined outputs are named after their headers; per-input
/// outputs mirror the input layout under `out_dir`.
pub async fn run_diff(
    args: &[PathBuf],
    modes: DiffModes,
    out_dir: &Path,
    parallelism: usize,
) -> Result<Vec<PathBuf>, RunError> {
    let files = expand_inputs(args)?;
    let target = OutputTarget::Dir(out_dir.to_path_buf());
    let individual_paths: Vec<PathBuf> = files.iter().map(|f| f.output_path(&target)).collect();

    let inputs = load_inputs(files, parallelism).await;
    let output = diff_no_cascade(&inputs, modes)?;

    let mut planned = Vec::new();
    for catalog in [output.no_dupes, output.dupes].into_iter().flatten() {
        planned.push(PlannedOutput {
            path: combined_path(out_dir, &catalog.header),
            catalog,
        });
    }
    planned.extend(
        output
            .individuals
            .into_iter()
            .zip(individual_paths)
            .map(|(catalog, path)| PlannedOutput { path, catalog }),
    );

    write_outputs(planned, parallelism, true).await
}

/// Cascading diff. Suppressed outputs (`skip_first`) are not written.
pub async fn run_cascade(
    args: &[PathBuf],
    options: CascadeOptions,
    target: &OutputTarget,
    parallelism: usize,
) -> Result<Vec<PathBuf>, RunError> {
    let files = expand_inputs(args)?;
    let paths: Vec<PathBuf> = files.iter().map(|f| f.output_path(target)).collect();

    let inputs = load_inputs(files, parallelism).await;
    let outputs = diff_cascade(&inputs, options)?;

    let planned = outputs
        .into_iter()
        .zip(paths)
        .filter_map(|(catalog, path)| catalog.map(|catalog| PlannedOutput { path, catalog }))
        .collect();

    write_outputs(planned, parallelism, true).await
}

/// Merge every input into the single file `output`.
pub async fn run_merge(
    args: &[PathBuf],
    options: PlainMergeOptions,
    output: &Path,
    parallelism: usize,
) -> Result<PathBuf, RunError> {
    let inputs = load_paths(args, parallelism).await?;
    let catalog = merge_plain(&inputs, options)?;
    log::info!(
        "Merged {} inputs into {} items",
        inputs.len(),
        catalog.item_count()
    );

    let planned = vec![PlannedOutput {
        path: output.to_path_buf(),
        catalog,
    }];
    write_outputs(planned, parallelism, true).await?;
    Ok(output.to_path_buf())
}

/// Remove duplicates from one DAT (or every DAT under one directory).
pub async fn run_dedupe(
    input: &Path,
    output: &Path,
    norename: bool,
    parallelism: usize,
) -> Result<PathBuf, RunError> {
    let inputs = load_paths(&[input.to_path_buf()], parallelism).await?;
    let merged = merge_plain(&inputs, PlainMergeOptions::default())?;
    let before = merged.item_count();

    let best = merged.best_bucket();
    let deduped = merged.bucket_by(
        best,
        BucketOptions {
            dedupe: true,
            norename,
        },
    );
    log::info!(
        "Removed {} duplicates from {} ({} items left, bucketed by {:?})",
        before - deduped.item_count(),
        input.display(),
        deduped.item_count(),
        best
    );

    let planned = vec![PlannedOutput {
        path: output.to_path_buf(),
        catalog: deduped,
    }];
    write_outputs(planned, parallelism, norename).await?;
    Ok(output.to_path_buf())
}

/// Statistics for one input file.
#[derive(Debug, Clone, Serialize)]
pub struct InputStats {
    pub path: PathBuf,
    pub name: String,
    pub stats: Statistics,
}

/// Per-input and combined statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsReport {
    pub inputs: Vec<InputStats>,
    pub total: Statistics,
}

/// Load every input and gather its statistics.
pub async fn run_stats(args: &[PathBuf], parallelism: usize) -> Result<StatsReport, RunError> {
    let inputs = load_paths(args, parallelism).await?;
    let mut report = StatsReport::default();
    for input in inputs {
        report.total.absorb(input.catalog.stats());
        report.inputs.push(InputStats {
            name: input.catalog.header.name.clone(),
            stats: input.catalog.stats().clone(),
            path: input.path,
        });
    }
    Ok(report)
}
