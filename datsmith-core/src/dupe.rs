//! Equivalence rules: when two items are the same dump, and how a match is classified.

use crate::item::{DupeType, HashField, Item, ItemData};

/// Two optional hashes agree unless both are present and differ.
///
/// An absent value is vacuous: it neither confirms nor contradicts.
fn hashes_agree(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => x.eq_ignore_ascii_case(y),
        _ => true,
    }
}

/// No populated hash column contradicts the other item.
fn no_hash_conflict(a: &Item, b: &Item) -> bool {
    HashField::ALL
        .iter()
        .all(|&field| hashes_agree(a.hash(field), b.hash(field)))
}

/// Whether two items describe the same content.
///
/// Items of different kinds never match, and a Nodump item matches nothing.
/// ROMs must agree on size and on every hash column both sides populate;
/// disks the same without size or CRC. Other variants compare their name
/// and descriptive fields.
pub fn equals(a: &Item, b: &Item) -> bool {
    match (&a.data, &b.data) {
        (ItemData::Rom(x), ItemData::Rom(y)) => {
            !a.is_nodump() && !b.is_nodump() && x.size == y.size && no_hash_conflict(a, b)
        }
        (ItemData::Disk(_), ItemData::Disk(_)) => {
            !a.is_nodump() && !b.is_nodump() && no_hash_conflict(a, b)
        }
        (ItemData::Archive, ItemData::Archive) | (ItemData::Sample, ItemData::Sample) => {
            a.name == b.name
        }
        (ItemData::BiosSet(x), ItemData::BiosSet(y)) => a.name == b.name && x == y,
        (ItemData::Release(x), ItemData::Release(y)) => a.name == b.name && x == y,
        _ => false,
    }
}

/// Classify `candidate` against an `existing` item it may duplicate.
///
/// Returns an empty set when the two are not [`equals`]. Otherwise the
/// match is `EXTERNAL` when the provenance differs or `existing` is already
/// an external duplicate, `INTERNAL` otherwise; and `ALL` when both machine
/// and item names are identical, `HASH` when only the content matches.
pub fn duplicate_status(candidate: &Item, existing: &Item) -> DupeType {
    if !equals(candidate, existing) {
        return DupeType::empty();
    }

    let scope = if candidate.system_id != existing.system_id
        || candidate.source_id != existing.source_id
        || existing.dupe.contains(DupeType::EXTERNAL)
    {
        DupeType::EXTERNAL
    } else {
        DupeType::INTERNAL
    };

    let depth = if candidate.machine.name == existing.machine.name && candidate.name == existing.name
    {
        DupeType::ALL
    } else {
        DupeType::HASH
    };

    scope | depth
}

#[cfg(test)]
#[path = "tests/dupe_tests.rs"]
mod tests;
