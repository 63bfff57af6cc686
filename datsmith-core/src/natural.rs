//! Natural ordering: numeric runs compare by value, so `file2` < `file10`.
//!
//! Also defines the output order of items within a bucket.

use std::cmp::Ordering;

use crate::item::Item;

/// One run of a string: digits or everything else.
#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits = None;

    for (i, c) in s.char_indices() {
        let digit = c.is_ascii_digit();
        match in_digits {
            Some(prev) if prev != digit => {
                out.push(make_chunk(&s[start..i], prev));
                start = i;
            }
            _ => {}
        }
        in_digits = Some(digit);
    }
    if let Some(digit) = in_digits {
        out.push(make_chunk(&s[start..], digit));
    }
    out
}

fn make_chunk(s: &str, digits: bool) -> Chunk<'_> {
    if digits {
        Chunk::Digits(s)
    } else {
        Chunk::Text(s)
    }
}

/// Compare two digit runs by numeric value without overflowing.
fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a_trim = a.trim_start_matches('0');
    let b_trim = b.trim_start_matches('0');
    a_trim
        .len()
        .cmp(&b_trim.len())
        .then_with(|| a_trim.cmp(b_trim))
}

/// Compare two strings in natural order.
///
/// Text runs compare case-insensitively, digit runs by value, and a digit
/// run sorts before a text run. Strings that are equal under those rules
/// (e.g. `a01` vs `a1`, or `A` vs `a`) fall back to plain byte order, so
/// the result is a total order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let left = chunks(a);
    let right = chunks(b);

    for (l, r) in left.iter().zip(right.iter()) {
        let ord = match (l, r) {
            (Chunk::Digits(x), Chunk::Digits(y)) => cmp_digits(x, y),
            (Chunk::Text(x), Chunk::Text(y)) => cmp_text(x, y),
            (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    left.len().cmp(&right.len()).then_with(|| a.cmp(b))
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    let lower_a = a.chars().flat_map(char::to_lowercase);
    let lower_b = b.chars().flat_map(char::to_lowercase);
    lower_a.cmp(lower_b)
}

/// Split an item path into (directory, file name). Both `/` and `\` separate.
fn split_path(name: &str) -> (&str, &str) {
    match name.rfind(['/', '\\']) {
        Some(i) => (&name[..i], &name[i + 1..]),
        None => ("", name),
    }
}

/// Output order for items.
///
/// Provenance first (`system_id`, then `source_id`), unless `norename` is set,
/// in which case the machine name stands in for both. Then the machine name,
/// then non-ROM/disk items before ROMs and disks, then the directory and file
/// components of the item name. The raw name is the last tie-break.
pub fn compare_items(a: &Item, b: &Item, norename: bool) -> Ordering {
    let provenance = if norename {
        natural_cmp(&a.machine.name, &b.machine.name)
    } else {
        a.system_id
            .cmp(&b.system_id)
            .then_with(|| a.source_id.cmp(&b.source_id))
    };

    provenance
        .then_with(|| natural_cmp(&a.machine.name, &b.machine.name))
        .then_with(|| a.kind().is_dump().cmp(&b.kind().is_dump()))
        .then_with(|| {
            if a.kind().is_dump() && b.kind().is_dump() {
                let (dir_a, file_a) = split_path(&a.name);
                let (dir_b, file_b) = split_path(&b.name);
                natural_cmp(dir_a, dir_b).then_with(|| natural_cmp(file_a, file_b))
            } else {
                Ordering::Equal
            }
        })
        .then_with(|| natural_cmp(&a.name, &b.name))
}

/// Stable sort by [`compare_items`]. Sorting a sorted slice is a no-op.
pub fn sort_items(items: &mut [Item], norename: bool) {
    items.sort_by(|a, b| compare_items(a, b, norename));
}

#[cfg(test)]
#[path = "tests/natural_tests.rs"]
mod tests;
