//! Core model and engine for datsmith: items, catalogs, duplicate
//! detection, merging and diffing of DAT catalogs.
//!
//! Nothing in this crate performs I/O. Parsing and writing live in
//! `datsmith-dat`; parallel loading and output planning in `datsmith-lib`.

pub mod catalog;
pub mod diff;
pub mod dupe;
pub mod error;
pub mod header;
pub mod item;
pub mod merge;
pub mod natural;
pub mod stats;

pub use catalog::{BucketBy, BucketOptions, Catalog, best_bucket_for, bucket_key};
pub use diff::{
    CascadeOptions, DiffInput, DiffModes, NoCascadeOutput, PlainMergeOptions, diff_cascade,
    diff_no_cascade, merge_plain, union,
};
pub use dupe::{duplicate_status, equals};
pub use error::CoreError;
pub use header::DatHeader;
pub use item::{
    BiosSet, Disk, DumpInfo, DupeType, HashField, Item, ItemData, ItemKind, ItemStatus, Machine,
    Provenance, Release, Rom, SoftwareInfo,
};
pub use merge::merge;
pub use natural::{compare_items, natural_cmp, sort_items};
pub use stats::Statistics;
