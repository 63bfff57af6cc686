use std::path::PathBuf;

use datsmith_core::{CascadeOptions, DiffModes};
use datsmith_lib::OutputTarget;

use super::{RunContext, report_written};
use crate::error::CliError;

/// Turn the mode flags into a mode set. No flags means every output.
pub(crate) fn modes_from_flags(no_dupes: bool, dupes: bool, individuals: bool) -> DiffModes {
    let mut modes = DiffModes::empty();
    modes.set(DiffModes::NO_DUPES, no_dupes);
    modes.set(DiffModes::DUPES, dupes);
    modes.set(DiffModes::INDIVIDUALS, individuals);
    if modes.is_empty() {
        DiffModes::all()
    } else {
        modes
    }
}

/// Non-cascading diff of every input against all the others.
pub(crate) async fn run_diff(
    ctx: &RunContext,
    inputs: &[PathBuf],
    modes: DiffModes,
    output_dir: Option<PathBuf>,
) -> Result<(), CliError> {
    let out_dir = ctx.output_dir(output_dir);
    log::info!(
        "Diffing {} inputs into {}",
        inputs.len(),
        out_dir.display()
    );
    let written = datsmith_lib::run_diff(inputs, modes, &out_dir, ctx.parallelism).await?;
    report_written(&written);
    Ok(())
}

/// Cascading diff: each input loses what higher-priority inputs already have.
pub(crate) async fn run_cascade(
    ctx: &RunContext,
    inputs: &[PathBuf],
    reverse: bool,
    skip_first: bool,
    inplace: bool,
    output_dir: Option<PathBuf>,
) -> Result<(), CliError> {
    let target = if inplace {
        OutputTarget::InPlace
    } else {
        OutputTarget::Dir(ctx.output_dir(output_dir))
    };
    let options = CascadeOptions {
        reverse,
        skip_first,
    };
    let written = datsmith_lib::run_cascade(inputs, options, &target, ctx.parallelism).await?;
    report_written(&written);
    Ok(())
}
