//! Single-pass duplicate collapsing with hash enrichment.

use crate::dupe::duplicate_status;
use crate::item::{HashField, Item};

/// Collapse duplicates in `items`, keeping first-seen positions.
///
/// Each candidate is compared against the output so far; the first output it
/// duplicates absorbs it:
///
/// - hash columns empty on the target but set on the candidate are copied
///   over (populated columns are never overwritten),
/// - the target's dupe flags become the computed classification,
/// - a candidate with a lower `system_id` hands its provenance, machine and
///   name to the target; a lower `source_id` does the same independently.
///
/// Nodump items are passed through untouched and never compared. Runs in
/// O(n·k) for k surviving items.
pub fn merge(items: Vec<Item>) -> Vec<Item> {
    if items.len() < 2 {
        return items;
    }

    let mut output: Vec<Item> = Vec::with_capacity(items.len());

    'candidates: for candidate in items {
        if candidate.is_nodump() {
            output.push(candidate);
            continue;
        }

        for target in output.iter_mut() {
            if target.is_nodump() {
                continue;
            }
            let status = duplicate_status(&candidate, target);
            if status.is_empty() {
                continue;
            }

            enrich(target, &candidate);
            target.dupe = status;

            if candidate.system_id < target.system_id {
                target.system_id = candidate.system_id;
                target.source_id = candidate.source_id;
                target.machine = candidate.machine.clone();
                target.name = candidate.name.clone();
            }
            if candidate.source_id < target.source_id {
                target.source_id = candidate.source_id;
                target.machine = candidate.machine.clone();
                target.name = candidate.name.clone();
            }
            continue 'candidates;
        }

        output.push(candidate);
    }

    output
}

/// Copy every hash column that `target` lacks and `source` has.
fn enrich(target: &mut Item, source: &Item) {
    for field in HashField::ALL {
        let Some(value) = source.hash(field) else {
            continue;
        };
        if let Some(slot) = target.hash_slot_mut(field) {
            if slot.is_none() {
                *slot = Some(value.to_string());
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/merge_tests.rs"]
mod tests;
