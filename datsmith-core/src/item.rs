//! Item model: the entries a DAT catalogs, their owning machine, and provenance.
//!
//! Every variant-independent field lives on [`Item`]; the variant payload is
//! the [`ItemData`] sum type. ROMs and disks share a [`DumpInfo`] block
//! carrying the MD5/SHA family and the dump status, and ROMs add size, CRC
//! and date on top of it.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// CRC32 of a zero-byte file.
pub const CRC_ZERO: &str = "00000000";
/// MD5 of a zero-byte file.
pub const MD5_ZERO: &str = "d41d8cd98f00b204e9800998ecf8427e";
/// SHA-1 of a zero-byte file.
pub const SHA1_ZERO: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";
/// SHA-256 of a zero-byte file.
pub const SHA256_ZERO: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
/// SHA-384 of a zero-byte file.
pub const SHA384_ZERO: &str = "38b060a751ac96384cd9327eb1b1e36a21fdb71114be07434c0cc7bf63f6e1da274edebfe76f65fbd51ad2f14898b95b";
/// SHA-512 of a zero-byte file.
pub const SHA512_ZERO: &str = "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e";

/// Size value meaning "unknown".
pub const SIZE_UNKNOWN: i64 = -1;

// ── Enumerations ────────────────────────────────────────────────────────────

/// Discriminant of the item variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Rom,
    Disk,
    Archive,
    BiosSet,
    Release,
    Sample,
}

impl ItemKind {
    /// Element name used by Logiqx/ClrMamePro DATs.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Rom => "rom",
            Self::Disk => "disk",
            Self::Archive => "archive",
            Self::BiosSet => "biosset",
            Self::Release => "release",
            Self::Sample => "sample",
        }
    }

    /// ROMs and disks carry hashes; everything else is compared by name.
    pub fn is_dump(&self) -> bool {
        matches!(self, Self::Rom | Self::Disk)
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Dump status as recorded by the DAT.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    None,
    Good,
    BadDump,
    Nodump,
    Verified,
}

impl ItemStatus {
    /// Attribute value used by DAT formats. `None` has no attribute.
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Good => Some("good"),
            Self::BadDump => Some("baddump"),
            Self::Nodump => Some("nodump"),
            Self::Verified => Some("verified"),
        }
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = std::convert::Infallible;

    /// Unrecognized values map to `None` rather than failing the whole DAT.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "good" => Self::Good,
            "baddump" => Self::BadDump,
            "nodump" | "no" => Self::Nodump,
            "verified" => Self::Verified,
            _ => Self::None,
        })
    }
}

bitflags! {
    /// Duplicate classification assigned by the merge engine.
    ///
    /// A matched item is either `INTERNAL` (same input) or `EXTERNAL`
    /// (different input), and either `ALL` (machine and item names agree)
    /// or `HASH` (only the data agrees). The empty set means "not a duplicate".
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct DupeType: u8 {
        const INTERNAL = 0b0001;
        const EXTERNAL = 0b0010;
        const HASH     = 0b0100;
        const ALL      = 0b1000;
    }
}

/// One hash column of a ROM or disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashField {
    Crc,
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl HashField {
    /// Every hash column, weakest first.
    pub const ALL: [HashField; 6] = [
        Self::Crc,
        Self::Md5,
        Self::Sha1,
        Self::Sha256,
        Self::Sha384,
        Self::Sha512,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Crc => "crc",
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    /// Digest of a zero-byte file for this column.
    pub fn zero_value(&self) -> &'static str {
        match self {
            Self::Crc => CRC_ZERO,
            Self::Md5 => MD5_ZERO,
            Self::Sha1 => SHA1_ZERO,
            Self::Sha256 => SHA256_ZERO,
            Self::Sha384 => SHA384_ZERO,
            Self::Sha512 => SHA512_ZERO,
        }
    }
}

/// Normalize a hash value from a DAT: trim, lower-case, and map empty or `-` to `None`.
pub fn normalize_hash(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == "-" {
        None
    } else {
        Some(trimmed.to_ascii_lowercase())
    }
}

// ── Machine ─────────────────────────────────────────────────────────────────

/// The machine/game/software an item belongs to. Each item owns a copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    pub name: String,
    pub description: String,
    pub comment: Option<String>,
    pub year: Option<String>,
    pub manufacturer: Option<String>,
    pub rom_of: Option<String>,
    pub clone_of: Option<String>,
    pub sample_of: Option<String>,
    pub source_file: Option<String>,
    pub is_bios: bool,
    pub board: Option<String>,
    pub rebuild_to: Option<String>,
}

impl Machine {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            description: name.clone(),
            name,
            ..Self::default()
        }
    }
}

/// Software-list metadata (MAME softlists). Absent fields stay `None`/empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareInfo {
    pub supported: Option<String>,
    pub publisher: Option<String>,
    /// Ordered `<info name value>` pairs; duplicate keys are kept.
    pub infos: Vec<(String, String)>,
    pub part_name: Option<String>,
    pub part_interface: Option<String>,
    /// Ordered `<feature name value>` pairs of the enclosing part.
    pub features: Vec<(String, String)>,
    pub area_name: Option<String>,
    pub area_size: Option<i64>,
}

impl SoftwareInfo {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ── Variant payloads ────────────────────────────────────────────────────────

/// Hashes and status shared by disks and ROMs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpInfo {
    pub md5: Option<String>,
    pub sha1: Option<String>,
    pub sha256: Option<String>,
    pub sha384: Option<String>,
    pub sha512: Option<String>,
    pub status: ItemStatus,
}

impl DumpInfo {
    /// Value of an MD5/SHA column. The CRC lives on [`Rom`].
    pub fn get(&self, field: HashField) -> Option<&str> {
        match field {
            HashField::Crc => None,
            HashField::Md5 => self.md5.as_deref(),
            HashField::Sha1 => self.sha1.as_deref(),
            HashField::Sha256 => self.sha256.as_deref(),
            HashField::Sha384 => self.sha384.as_deref(),
            HashField::Sha512 => self.sha512.as_deref(),
        }
    }

    pub fn slot_mut(&mut self, field: HashField) -> Option<&mut Option<String>> {
        match field {
            HashField::Crc => None,
            HashField::Md5 => Some(&mut self.md5),
            HashField::Sha1 => Some(&mut self.sha1),
            HashField::Sha256 => Some(&mut self.sha256),
            HashField::Sha384 => Some(&mut self.sha384),
            HashField::Sha512 => Some(&mut self.sha512),
        }
    }
}

/// A disk image (CHD). Identified by hashes only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disk {
    pub dump: DumpInfo,
}

/// A ROM file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rom {
    /// Size in bytes, [`SIZE_UNKNOWN`] when the DAT does not say.
    pub size: i64,
    pub crc: Option<String>,
    pub date: Option<String>,
    pub dump: DumpInfo,
}

impl Default for Rom {
    fn default() -> Self {
        Self {
            size: SIZE_UNKNOWN,
            crc: None,
            date: None,
            dump: DumpInfo::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiosSet {
    pub description: String,
    pub default: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub region: String,
    pub language: Option<String>,
    pub date: Option<String>,
    pub default: Option<bool>,
}

/// Variant payload of an [`Item`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemData {
    Rom(Rom),
    Disk(Disk),
    Archive,
    BiosSet(BiosSet),
    Release(Release),
    Sample,
}

// ── Item ────────────────────────────────────────────────────────────────────

/// Which input contributed an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Provenance {
    /// Index of the input catalog in pass order.
    pub system_id: i64,
    /// Index of the declared input the catalog came from.
    pub source_id: i64,
}

impl Provenance {
    pub fn new(system_id: i64, source_id: i64) -> Self {
        Self {
            system_id,
            source_id,
        }
    }
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub data: ItemData,
    pub dupe: DupeType,
    pub machine: Machine,
    pub system_id: i64,
    pub source_id: i64,
    #[serde(default, skip_serializing_if = "SoftwareInfo::is_empty")]
    pub software: SoftwareInfo,
}

impl Item {
    pub fn new(name: impl Into<String>, data: ItemData) -> Self {
        Self {
            name: name.into(),
            data,
            dupe: DupeType::empty(),
            machine: Machine::default(),
            system_id: 0,
            source_id: 0,
            software: SoftwareInfo::default(),
        }
    }

    pub fn rom(name: impl Into<String>, rom: Rom) -> Self {
        Self::new(name, ItemData::Rom(rom))
    }

    pub fn disk(name: impl Into<String>, disk: Disk) -> Self {
        Self::new(name, ItemData::Disk(disk))
    }

    pub fn sample(name: impl Into<String>) -> Self {
        Self::new(name, ItemData::Sample)
    }

    pub fn archive(name: impl Into<String>) -> Self {
        Self::new(name, ItemData::Archive)
    }

    pub fn with_machine(mut self, machine: Machine) -> Self {
        self.machine = machine;
        self
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.system_id = provenance.system_id;
        self.source_id = provenance.source_id;
        self
    }

    pub fn provenance(&self) -> Provenance {
        Provenance::new(self.system_id, self.source_id)
    }

    pub fn kind(&self) -> ItemKind {
        match self.data {
            ItemData::Rom(_) => ItemKind::Rom,
            ItemData::Disk(_) => ItemKind::Disk,
            ItemData::Archive => ItemKind::Archive,
            ItemData::BiosSet(_) => ItemKind::BiosSet,
            ItemData::Release(_) => ItemKind::Release,
            ItemData::Sample => ItemKind::Sample,
        }
    }

    /// Hash/status block for ROMs and disks.
    pub fn dump(&self) -> Option<&DumpInfo> {
        match &self.data {
            ItemData::Rom(rom) => Some(&rom.dump),
            ItemData::Disk(disk) => Some(&disk.dump),
            _ => None,
        }
    }

    pub fn dump_mut(&mut self) -> Option<&mut DumpInfo> {
        match &mut self.data {
            ItemData::Rom(rom) => Some(&mut rom.dump),
            ItemData::Disk(disk) => Some(&mut disk.dump),
            _ => None,
        }
    }

    pub fn status(&self) -> ItemStatus {
        self.dump().map(|d| d.status).unwrap_or_default()
    }

    pub fn is_nodump(&self) -> bool {
        self.status() == ItemStatus::Nodump
    }

    /// ROM size, `None` for other variants.
    pub fn size(&self) -> Option<i64> {
        match &self.data {
            ItemData::Rom(rom) => Some(rom.size),
            _ => None,
        }
    }

    /// Value of one hash column, `None` when absent or not applicable.
    pub fn hash(&self, field: HashField) -> Option<&str> {
        match (&self.data, field) {
            (ItemData::Rom(rom), HashField::Crc) => rom.crc.as_deref(),
            (ItemData::Rom(rom), field) => rom.dump.get(field),
            (ItemData::Disk(disk), field) => disk.dump.get(field),
            _ => None,
        }
    }

    /// Mutable slot for one hash column. Disks have no CRC slot.
    pub fn hash_slot_mut(&mut self, field: HashField) -> Option<&mut Option<String>> {
        match (&mut self.data, field) {
            (ItemData::Rom(rom), HashField::Crc) => Some(&mut rom.crc),
            (ItemData::Rom(rom), field) => rom.dump.slot_mut(field),
            (ItemData::Disk(disk), field) => disk.dump.slot_mut(field),
            _ => None,
        }
    }

    /// True when at least one hash column is populated.
    pub fn has_hashes(&self) -> bool {
        HashField::ALL.iter().any(|&f| self.hash(f).is_some())
    }

    /// Apply ingest normalization: lower-cased hashes and zero-byte sentinels.
    ///
    /// A zero-size ROM gets the empty-file digests for every missing column.
    /// A ROM of unknown size whose populated hashes are all empty-file digests
    /// is a zero-byte file.
    pub fn normalize(&mut self) {
        for field in HashField::ALL {
            if let Some(slot) = self.hash_slot_mut(field) {
                if let Some(value) = slot.take() {
                    *slot = normalize_hash(&value);
                }
            }
        }

        let ItemData::Rom(rom) = &self.data else {
            return;
        };
        if rom.dump.status == ItemStatus::Nodump {
            return;
        }
        let all_zero = self.has_hashes()
            && HashField::ALL
                .iter()
                .all(|&f| self.hash(f).is_none_or(|h| h == f.zero_value()));
        let size = rom.size;

        if size == SIZE_UNKNOWN && all_zero {
            if let ItemData::Rom(rom) = &mut self.data {
                rom.size = 0;
            }
        }
        if self.size() == Some(0) {
            for field in HashField::ALL {
                if let Some(slot) = self.hash_slot_mut(field) {
                    if slot.is_none() {
                        *slot = Some(field.zero_value().to_string());
                    }
                }
            }
        }
    }
}
