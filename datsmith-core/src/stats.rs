//! Running counters over a catalog's items.

use serde::Serialize;

use crate::item::{HashField, Item, ItemKind, ItemStatus};

/// Counts by kind, hash presence and status, plus the total ROM size.
///
/// Only [`Catalog`](crate::Catalog) mutates these, as items are added and
/// removed. Hash counts cover ROMs and disks that are not Nodump, so they
/// can be compared directly against [`Statistics::matchable_count`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub item_count: u64,
    pub rom_count: u64,
    pub disk_count: u64,
    pub archive_count: u64,
    pub biosset_count: u64,
    pub release_count: u64,
    pub sample_count: u64,
    /// Sum of known ROM sizes in bytes.
    pub total_size: u64,
    pub crc_count: u64,
    pub md5_count: u64,
    pub sha1_count: u64,
    pub sha256_count: u64,
    pub sha384_count: u64,
    pub sha512_count: u64,
    pub good_count: u64,
    pub baddump_count: u64,
    pub nodump_count: u64,
    pub verified_count: u64,
}

impl Statistics {
    pub(crate) fn add_item(&mut self, item: &Item) {
        self.apply(item, true);
    }

    pub(crate) fn remove_item(&mut self, item: &Item) {
        self.apply(item, false);
    }

    fn apply(&mut self, item: &Item, adding: bool) {
        let step = |counter: &mut u64| {
            if adding {
                *counter += 1;
            } else {
                *counter = counter.saturating_sub(1);
            }
        };

        step(&mut self.item_count);
        step(match item.kind() {
            ItemKind::Rom => &mut self.rom_count,
            ItemKind::Disk => &mut self.disk_count,
            ItemKind::Archive => &mut self.archive_count,
            ItemKind::BiosSet => &mut self.biosset_count,
            ItemKind::Release => &mut self.release_count,
            ItemKind::Sample => &mut self.sample_count,
        });

        if let Some(size) = item.size().filter(|&s| s > 0) {
            let size = size as u64;
            if adding {
                self.total_size += size;
            } else {
                self.total_size = self.total_size.saturating_sub(size);
            }
        }

        for field in HashField::ALL {
            if !item.is_nodump() && item.hash(field).is_some() {
                step(self.hash_counter(field));
            }
        }

        match item.status() {
            ItemStatus::None => {}
            ItemStatus::Good => step(&mut self.good_count),
            ItemStatus::BadDump => step(&mut self.baddump_count),
            ItemStatus::Nodump => step(&mut self.nodump_count),
            ItemStatus::Verified => step(&mut self.verified_count),
        }
    }

    fn hash_counter(&mut self, field: HashField) -> &mut u64 {
        match field {
            HashField::Crc => &mut self.crc_count,
            HashField::Md5 => &mut self.md5_count,
            HashField::Sha1 => &mut self.sha1_count,
            HashField::Sha256 => &mut self.sha256_count,
            HashField::Sha384 => &mut self.sha384_count,
            HashField::Sha512 => &mut self.sha512_count,
        }
    }

    /// Number of items carrying the given hash column.
    pub fn hash_count(&self, field: HashField) -> u64 {
        match field {
            HashField::Crc => self.crc_count,
            HashField::Md5 => self.md5_count,
            HashField::Sha1 => self.sha1_count,
            HashField::Sha256 => self.sha256_count,
            HashField::Sha384 => self.sha384_count,
            HashField::Sha512 => self.sha512_count,
        }
    }

    /// ROMs and disks that can take part in hash matching.
    pub fn matchable_count(&self) -> u64 {
        (self.rom_count + self.disk_count).saturating_sub(self.nodump_count)
    }

    /// Fold another set of counters into this one.
    pub fn absorb(&mut self, other: &Statistics) {
        self.item_count += other.item_count;
        self.rom_count += other.rom_count;
        self.disk_count += other.disk_count;
        self.archive_count += other.archive_count;
        self.biosset_count += other.biosset_count;
        self.release_count += other.release_count;
        self.sample_count += other.sample_count;
        self.total_size += other.total_size;
        self.crc_count += other.crc_count;
        self.md5_count += other.md5_count;
        self.sha1_count += other.sha1_count;
        self.sha256_count += other.sha256_count;
        self.sha384_count += other.sha384_count;
        self.sha512_count += other.sha512_count;
        self.good_count += other.good_count;
        self.baddump_count += other.baddump_count;
        self.nodump_count += other.nodump_count;
        self.verified_count += other.verified_count;
    }
}
