//! Cross-catalog set operations: no-cascade diff, cascade diff, and plain merge.
//!
//! Every operation starts from the same single-threaded fold: inputs are
//! walked in pass order, their items re-keyed under one shared bucketing and
//! merged per bucket. Results depend only on input order and provenance,
//! never on how the inputs were loaded.

use std::path::{Path, PathBuf};

use bitflags::bitflags;

use crate::catalog::{BucketBy, Catalog, best_bucket_for};
use crate::error::CoreError;
use crate::header::DatHeader;
use crate::item::{DupeType, Item};
use crate::stats::Statistics;

/// One input catalog. Its position in the input slice is its `system_id`.
#[derive(Debug, Clone)]
pub struct DiffInput {
    /// File the catalog was read from.
    pub path: PathBuf,
    /// Directory the file was discovered under, for SuperDAT paths.
    pub root: Option<PathBuf>,
    pub catalog: Catalog,
}

impl DiffInput {
    pub fn new(path: impl Into<PathBuf>, catalog: Catalog) -> Self {
        Self {
            path: path.into(),
            root: None,
            catalog,
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// File name without extension.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// `<dir relative to root>/<stem>/`, with `/` separators.
    fn superdat_prefix(&self) -> String {
        let mut prefix = String::new();
        let parent = self.path.parent().unwrap_or(Path::new(""));
        let relative = match &self.root {
            Some(root) => pathdiff::diff_paths(parent, root).unwrap_or_default(),
            None => PathBuf::new(),
        };
        for component in relative.components() {
            let part = component.as_os_str().to_string_lossy();
            if part.is_empty() || part == "." {
                continue;
            }
            prefix.push_str(&part);
            prefix.push('/');
        }
        prefix.push_str(&self.stem());
        prefix.push('/');
        prefix
    }
}

bitflags! {
    /// Which no-cascade outputs to build.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct DiffModes: u8 {
        /// Items not duplicated across inputs.
        const NO_DUPES    = 0b001;
        /// Items duplicated across inputs.
        const DUPES       = 0b010;
        /// Per input, the items unique to it.
        const INDIVIDUALS = 0b100;
    }
}

/// Outputs of [`diff_no_cascade`]. Unrequested outputs are `None`/empty.
#[derive(Debug, Default)]
pub struct NoCascadeOutput {
    pub no_dupes: Option<Catalog>,
    pub dupes: Option<Catalog>,
    /// One catalog per input, indexed like the inputs.
    pub individuals: Vec<Catalog>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeOptions {
    /// Walk the inputs last to first, so later inputs take precedence.
    pub reverse: bool,
    /// Do not produce output for the first input in pass order.
    pub skip_first: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlainMergeOptions {
    /// Collapse duplicates across all inputs.
    pub dedupe: bool,
    /// Prefix machine names with each input's relative path.
    pub superdat: bool,
}

/// Result of the shared fold.
struct Folded {
    catalog: Catalog,
    by: BucketBy,
    mirror: Mirror,
}

/// Id mirroring applied by a reverse fold. Identity when not reversed.
#[derive(Debug, Clone, Copy)]
struct Mirror {
    reverse: bool,
    system_count: i64,
    source_count: i64,
}

impl Mirror {
    fn new(inputs: &[DiffInput], reverse: bool) -> Self {
        let source_count = inputs
            .iter()
            .flat_map(|input| input.catalog.items())
            .map(|item| item.source_id)
            .max()
            .map_or(0, |max| max.saturating_add(1));
        Self {
            reverse,
            system_count: inputs.len() as i64,
            source_count,
        }
    }

    fn flip(id: i64, count: i64) -> i64 {
        if (0..count).contains(&id) {
            count - 1 - id
        } else {
            id
        }
    }

    /// Mirror both ids of `item`. Applying it twice restores the original.
    fn apply(&self, item: &mut Item) {
        if self.reverse {
            item.system_id = Self::flip(item.system_id, self.system_count);
            item.source_id = Self::flip(item.source_id, self.source_count);
        }
    }
}

/// Fold inputs into one catalog in pass order.
///
/// In reverse mode the pass order is reversed and in-range system and source
/// ids are mirrored, so the last input carries the lowest ids and wins every
/// merge tie-break.
fn fold(inputs: &[DiffInput], reverse: bool, superdat: bool) -> Result<Folded, CoreError> {
    let mirror = Mirror::new(inputs, reverse);
    let mut stats = Statistics::default();
    let mut header = DatHeader::default();
    for input in inputs {
        stats.absorb(input.catalog.stats());
        header.absorb(&input.catalog.header);
    }
    if stats.item_count == 0 {
        return Err(CoreError::EmptyInput);
    }

    let by = best_bucket_for(&stats);
    log::debug!(
        "Folding {} inputs ({} items) by {:?}",
        inputs.len(),
        stats.item_count,
        by
    );

    let mut catalog = Catalog::with_bucketing(header, by, true);
    let order: Box<dyn Iterator<Item = &DiffInput>> = if reverse {
        Box::new(inputs.iter().rev())
    } else {
        Box::new(inputs.iter())
    };

    for input in order {
        let prefix = superdat.then(|| input.superdat_prefix());
        for item in input.catalog.items() {
            let mut item = item.clone();
            mirror.apply(&mut item);
            if let Some(prefix) = &prefix {
                item.machine.name = format!("{}{}", prefix, item.machine.name);
            }
            catalog.insert(item)?;
        }
    }

    Ok(Folded {
        catalog,
        by,
        mirror,
    })
}

/// Map a (possibly mirrored) system id back to an input index.
fn input_index(system_id: i64, count: usize, reverse: bool) -> Option<usize> {
    let index = usize::try_from(system_id).ok().filter(|&i| i < count)?;
    Some(if reverse { count - 1 - index } else { index })
}

/// Union of all inputs with duplicates merged and buckets sorted.
///
/// Items merged across inputs carry `EXTERNAL` dupe flags; the survivor
/// takes the identity of the lowest `system_id` it was seen with.
pub fn union(inputs: &[DiffInput]) -> Result<Catalog, CoreError> {
    let Folded { mut catalog, .. } = fold(inputs, false, false)?;
    catalog.dedupe();
    catalog.sort_buckets(false);
    Ok(catalog)
}

/// Append ` (<stem>)` of the contributing input to the machine name.
fn suffixed(item: &Item, inputs: &[DiffInput]) -> Item {
    let mut copy = item.clone();
    match input_index(item.system_id, inputs.len(), false) {
        Some(index) => {
            copy.machine.name = format!("{} ({})", copy.machine.name, inputs[index].stem());
        }
        None => log::warn!(
            "Item '{}' in '{}' has invalid system id {}; leaving machine name as is",
            item.name,
            item.machine.name,
            item.system_id
        ),
    }
    copy
}

/// Diff without cascading.
///
/// After merging across all inputs, every surviving item is routed:
/// items without an `EXTERNAL` flag go to the no-duplicates catalog and to
/// the per-input catalog of their `system_id`; items with one go to the
/// duplicates catalog. Machine names in the two combined catalogs get the
/// contributing file's stem as a suffix.
pub fn diff_no_cascade(
    inputs: &[DiffInput],
    modes: DiffModes,
) -> Result<NoCascadeOutput, CoreError> {
    let Folded { mut catalog, by, .. } = fold(inputs, false, false)?;
    catalog.dedupe();

    let base = catalog.header.clone();
    let mut output = NoCascadeOutput {
        no_dupes: modes
            .contains(DiffModes::NO_DUPES)
            .then(|| Catalog::with_bucketing(base.with_suffix(" (No Duplicates)"), by, true)),
        dupes: modes
            .contains(DiffModes::DUPES)
            .then(|| Catalog::with_bucketing(base.with_suffix(" (Duplicates)"), by, true)),
        individuals: Vec::new(),
    };
    if modes.contains(DiffModes::INDIVIDUALS) {
        output.individuals = inputs
            .iter()
            .map(|input| Catalog::with_bucketing(input.catalog.header.clone(), by, true))
            .collect();
    }

    for item in catalog.items() {
        if item.dupe.contains(DupeType::EXTERNAL) {
            if let Some(dupes) = output.dupes.as_mut() {
                dupes.insert(suffixed(item, inputs))?;
            }
            continue;
        }

        if let Some(index) = input_index(item.system_id, inputs.len(), false) {
            if let Some(individual) = output.individuals.get_mut(index) {
                individual.insert(item.clone())?;
            }
        }
        if let Some(no_dupes) = output.no_dupes.as_mut() {
            no_dupes.insert(suffixed(item, inputs))?;
        }
    }

    for out in output
        .no_dupes
        .iter_mut()
        .chain(output.dupes.iter_mut())
        .chain(output.individuals.iter_mut())
    {
        out.sort_buckets(false);
    }
    Ok(output)
}

/// Cascading diff: each input keeps only what no earlier input already has.
///
/// Returns one entry per input, in input order. Survivors of the cross-input
/// merge are routed by `system_id` alone; items whose id does not name an
/// input are dropped with a warning. With `skip_first`, the first input in
/// pass order yields `None`.
pub fn diff_cascade(
    inputs: &[DiffInput],
    options: CascadeOptions,
) -> Result<Vec<Option<Catalog>>, CoreError> {
    let Folded {
        mut catalog,
        by,
        mirror,
    } = fold(inputs, options.reverse, false)?;
    catalog.dedupe();

    let count = inputs.len();
    let skipped = match (options.skip_first, options.reverse) {
        (false, _) => None,
        (true, false) => Some(0),
        (true, true) => count.checked_sub(1),
    };

    let mut outputs: Vec<Option<Catalog>> = inputs
        .iter()
        .enumerate()
        .map(|(index, input)| {
            (Some(index) != skipped)
                .then(|| Catalog::with_bucketing(input.catalog.header.clone(), by, true))
        })
        .collect();

    for item in catalog.into_items() {
        let Some(index) = input_index(item.system_id, count, options.reverse) else {
            log::warn!(
                "Dropping '{}' from '{}': system id {} does not name an input",
                item.name,
                item.machine.name,
                item.system_id
            );
            continue;
        };
        if let Some(out) = outputs[index].as_mut() {
            let mut item = item;
            mirror.apply(&mut item);
            out.insert(item)?;
        }
    }

    for out in outputs.iter_mut().flatten() {
        out.sort_buckets(false);
    }
    Ok(outputs)
}

/// Union every input into one catalog without duplicate classification.
///
/// With `superdat`, machine names become `<relative dir>/<stem>/<machine>`
/// and the header is marked as a SuperDAT.
pub fn merge_plain(inputs: &[DiffInput], options: PlainMergeOptions) -> Result<Catalog, CoreError> {
    let Folded { mut catalog, .. } = fold(inputs, false, options.superdat)?;
    if options.dedupe {
        catalog.dedupe();
    }
    if options.superdat {
        catalog.header.superdat = true;
    }
    catalog.sort_buckets(false);
    Ok(catalog)
}

#[cfg(test)]
#[path = "tests/diff_tests.rs"]
mod tests;
