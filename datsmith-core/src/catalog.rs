//! Catalog container: an ordered map of bucket keys to item lists.
//!
//! Bucket iteration follows key order. Items inside a bucket keep insertion
//! order until [`Catalog::sort_buckets`] or [`Catalog::bucket_by`] sorts
//! them.

use std::collections::BTreeMap;

use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::header::DatHeader;
use crate::item::{HashField, Item};
use crate::merge::merge;
use crate::natural::sort_items;
use crate::stats::Statistics;

/// Fallback machine name for items without one.
const DEFAULT_MACHINE: &str = "Default";

/// What a catalog's bucket keys are derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketBy {
    Crc,
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
    Size,
    Machine,
}

impl BucketBy {
    /// Hash bucketings from strongest to weakest, excluding CRC.
    const STRONG_HASHES: [BucketBy; 5] = [
        Self::Sha512,
        Self::Sha384,
        Self::Sha256,
        Self::Sha1,
        Self::Md5,
    ];

    pub fn hash_field(&self) -> Option<HashField> {
        match self {
            Self::Crc => Some(HashField::Crc),
            Self::Md5 => Some(HashField::Md5),
            Self::Sha1 => Some(HashField::Sha1),
            Self::Sha256 => Some(HashField::Sha256),
            Self::Sha384 => Some(HashField::Sha384),
            Self::Sha512 => Some(HashField::Sha512),
            Self::Size | Self::Machine => None,
        }
    }
}

/// Options for [`Catalog::bucket_by`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketOptions {
    /// Merge each existing bucket before re-keying.
    pub dedupe: bool,
    /// Leave provenance out of machine keys and sort order.
    pub norename: bool,
}

/// Bucket key of `item` under `by`. Derived from the item alone.
///
/// Hash and size keys are empty for items that lack the field, so those
/// items still land in a bucket.
pub fn bucket_key(item: &Item, by: BucketBy, norename: bool) -> String {
    match by {
        BucketBy::Machine => machine_key(item, norename),
        BucketBy::Size => item.size().map(|s| s.to_string()).unwrap_or_default(),
        hash => hash
            .hash_field()
            .and_then(|field| item.hash(field))
            .unwrap_or_default()
            .to_string(),
    }
}

fn machine_key(item: &Item, norename: bool) -> String {
    let machine = if item.machine.name.is_empty() {
        DEFAULT_MACHINE
    } else {
        item.machine.name.as_str()
    };
    let key = if norename {
        machine.to_lowercase()
    } else {
        format!(
            "{:010}-{:010}-{}",
            item.system_id,
            item.source_id,
            machine.to_lowercase()
        )
    };
    escape(key.as_str()).into_owned()
}

/// Best bucketing for items described by `stats`.
///
/// Prefers the strongest hash every matchable ROM and disk carries. CRC and
/// size only apply when there are no disks, since disks have neither. Falls
/// back to the machine name.
pub fn best_bucket_for(stats: &Statistics) -> BucketBy {
    let matchable = stats.matchable_count();

    for by in BucketBy::STRONG_HASHES {
        if let Some(field) = by.hash_field() {
            if matchable > 0 && stats.hash_count(field) >= matchable {
                return by;
            }
        }
    }
    if stats.disk_count == 0 {
        if matchable > 0 && stats.crc_count >= matchable {
            return BucketBy::Crc;
        }
        if stats.rom_count > 0 {
            return BucketBy::Size;
        }
    }
    BucketBy::Machine
}

/// A DAT's items grouped into buckets, with its header and running statistics.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub header: DatHeader,
    buckets: BTreeMap<String, Vec<Item>>,
    stats: Statistics,
    bucketed_by: Option<BucketBy>,
    norename: bool,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(header: DatHeader) -> Self {
        Self {
            header,
            ..Self::default()
        }
    }

    /// Empty catalog whose [`Catalog::insert`] keys items by `by`.
    pub fn with_bucketing(header: DatHeader, by: BucketBy, norename: bool) -> Self {
        Self {
            header,
            bucketed_by: Some(by),
            norename,
            ..Self::default()
        }
    }

    /// Add an item under `key`. Items without a name are rejected.
    pub fn add_item(&mut self, key: impl Into<String>, item: Item) -> Result<(), CoreError> {
        if item.name.is_empty() {
            return Err(CoreError::missing_name(&item.machine.name));
        }
        self.stats.add_item(&item);
        self.buckets.entry(key.into()).or_default().push(item);
        Ok(())
    }

    /// Add an item under its key for the current bucketing (machine by default).
    pub fn insert(&mut self, item: Item) -> Result<(), CoreError> {
        let by = self.bucketed_by.unwrap_or(BucketBy::Machine);
        let key = bucket_key(&item, by, self.norename);
        self.add_item(key, item)
    }

    /// Remove a whole bucket.
    pub fn remove_bucket(&mut self, key: &str) -> Option<Vec<Item>> {
        let items = self.buckets.remove(key)?;
        for item in &items {
            self.stats.remove_item(item);
        }
        Some(items)
    }

    /// Remove one item from a bucket, dropping the bucket when it empties.
    pub fn remove_item(&mut self, key: &str, index: usize) -> Option<Item> {
        let bucket = self.buckets.get_mut(key)?;
        if index >= bucket.len() {
            return None;
        }
        let item = bucket.remove(index);
        if bucket.is_empty() {
            self.buckets.remove(key);
        }
        self.stats.remove_item(&item);
        Some(item)
    }

    pub fn get(&self, key: &str) -> Option<&[Item]> {
        self.buckets.get(key).map(|v| v.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    pub fn buckets(&self) -> impl Iterator<Item = (&str, &[Item])> {
        self.buckets.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// All items, bucket by bucket.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.buckets.values().flatten()
    }

    /// Consume the catalog into its items, bucket by bucket.
    pub fn into_items(self) -> impl Iterator<Item = Item> {
        self.buckets.into_values().flatten()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn item_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    pub fn bucketed_by(&self) -> Option<BucketBy> {
        self.bucketed_by
    }

    /// Recount statistics from scratch.
    pub fn recalculate_stats(&mut self) {
        let mut stats = Statistics::default();
        for item in self.buckets.values().flatten() {
            stats.add_item(item);
        }
        self.stats = stats;
    }

    /// The strongest key every matchable ROM and disk can be bucketed by.
    pub fn best_bucket(&self) -> BucketBy {
        best_bucket_for(&self.stats)
    }

    /// Re-partition every item under a new key.
    ///
    /// With `dedupe`, each existing bucket is merged first. Items are re-keyed
    /// in bucket traversal order and each new bucket is then sorted.
    pub fn bucket_by(self, by: BucketBy, options: BucketOptions) -> Catalog {
        log::debug!(
            "Bucketing {} items by {:?} (dedupe: {})",
            self.stats.item_count,
            by,
            options.dedupe
        );

        let mut out = Catalog::with_header(self.header);
        out.bucketed_by = Some(by);
        out.norename = options.norename;

        for (_, items) in self.buckets {
            let items = if options.dedupe { merge(items) } else { items };
            for item in items {
                let key = bucket_key(&item, by, options.norename);
                out.stats.add_item(&item);
                out.buckets.entry(key).or_default().push(item);
            }
        }

        out.sort_buckets(options.norename);
        out
    }

    /// Merge every bucket in place.
    pub fn dedupe(&mut self) {
        let buckets = std::mem::take(&mut self.buckets);
        self.stats = Statistics::default();
        for (key, items) in buckets {
            let merged = merge(items);
            for item in &merged {
                self.stats.add_item(item);
            }
            self.buckets.insert(key, merged);
        }
    }

    /// Sort each bucket into output order.
    pub fn sort_buckets(&mut self, norename: bool) {
        for items in self.buckets.values_mut() {
            sort_items(items, norename);
        }
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
