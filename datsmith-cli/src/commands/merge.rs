use std::path::{Path, PathBuf};

use datsmith_core::PlainMergeOptions;

use super::{RunContext, report_written_one};
use crate::error::CliError;

pub(crate) async fn run_merge(
    ctx: &RunContext,
    inputs: &[PathBuf],
    dedupe: bool,
    superdat: bool,
    output: &Path,
) -> Result<(), CliError> {
    let options = PlainMergeOptions { dedupe, superdat };
    let written = datsmith_lib::run_merge(inputs, options, output, ctx.parallelism).await?;
    report_written_one(&written);
    Ok(())
}

pub(crate) async fn run_dedupe(
    ctx: &RunContext,
    input: &Path,
    output: &Path,
    norename: bool,
) -> Result<(), CliError> {
    let written = datsmith_lib::run_dedupe(input, output, norename, ctx.parallelism).await?;
    report_written_one(&written);
    Ok(())
}
