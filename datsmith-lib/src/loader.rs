//! Parallel DAT loading with an ordered, single-threaded hand-off.
//!
//! Every file is parsed in its own blocking task into a private catalog.
//! The catalogs are then returned in `system_id` order, so nothing
//! downstream depends on which parse finished first.

use std::path::PathBuf;

use datsmith_core::{Catalog, DiffInput};
use datsmith_dat::parse_dat_file;

use crate::error::RunError;
use crate::inputs::{InputFile, expand_inputs};
use crate::worker_pool::WorkerPool;

/// Parse `files` with up to `parallelism` concurrent workers.
///
/// The result has one entry per file, in input order. A file that fails to
/// parse or times out is logged and contributes an empty catalog.
pub async fn load_inputs(files: Vec<InputFile>, parallelism: usize) -> Vec<DiffInput> {
    log::info!(
        "Loading {} DAT files with {} workers",
        files.len(),
        parallelism.max(1)
    );

    let locations: Vec<(PathBuf, Option<PathBuf>)> = files
        .iter()
        .map(|f| (f.path.clone(), f.root.clone()))
        .collect();

    let pool = WorkerPool::start(parallelism, files, |file: InputFile| async move {
        tokio::task::spawn_blocking(move || parse_dat_file(&file.path, file.provenance)).await
    });

    pool.collect_ordered()
        .await
        .into_iter()
        .zip(locations)
        .map(|(result, (path, root))| {
            let catalog = match result {
                Some(Ok(Ok(dat))) => dat.catalog,
                Some(Ok(Err(e))) => {
                    log::error!("Failed to load {}: {}", path.display(), e);
                    Catalog::new()
                }
                Some(Err(e)) => {
                    log::error!("Parser task for {} failed: {}", path.display(), e);
                    Catalog::new()
                }
                None => {
                    log::error!("Timed out loading {}", path.display());
                    Catalog::new()
                }
            };
            DiffInput {
                path,
                root,
                catalog,
            }
        })
        .collect()
}

/// Expand input arguments and load every DAT they name.
pub async fn load_paths(args: &[PathBuf], parallelism: usize) -> Result<Vec<DiffInput>, RunError> {
    let files = expand_inputs(args)?;
    Ok(load_inputs(files, parallelism).await)
}
