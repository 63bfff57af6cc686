use super::*;
use crate::dupe::equals;
use crate::item::{DumpInfo, DupeType, ItemStatus, Machine, Rom};

const MD5: &str = "0123456789abcdef0123456789abcdef";
const SHA1: &str = "0123456789abcdef0123456789abcdef01234567";

fn rom(machine: &str, name: &str, crc: Option<&str>, md5: Option<&str>) -> Item {
    Item::rom(
        name,
        Rom {
            size: 1024,
            crc: crc.map(str::to_string),
            date: None,
            dump: DumpInfo {
                md5: md5.map(str::to_string),
                ..DumpInfo::default()
            },
        },
    )
    .with_machine(Machine::new(machine))
}

fn with_ids(mut item: Item, system_id: i64, source_id: i64) -> Item {
    item.system_id = system_id;
    item.source_id = source_id;
    item
}

#[test]
fn empty_and_single_inputs_are_unchanged() {
    assert!(merge(Vec::new()).is_empty());
    let single = vec![rom("game", "a.bin", Some("deadbeef"), None)];
    assert_eq!(merge(single.clone()), single);
}

#[test]
fn enriches_missing_hashes() {
    let merged = merge(vec![
        rom("game", "a.bin", Some("deadbeef"), None),
        rom("game", "a.bin", Some("deadbeef"), Some(MD5)),
    ]);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].hash(HashField::Crc), Some("deadbeef"));
    assert_eq!(merged[0].hash(HashField::Md5), Some(MD5));
    assert_eq!(merged[0].dupe, DupeType::INTERNAL | DupeType::ALL);
}

#[test]
fn never_overwrites_populated_hash() {
    let mut first = rom("game", "a.bin", Some("deadbeef"), None);
    if let Some(dump) = first.dump_mut() {
        dump.sha1 = Some(SHA1.into());
    }
    let merged = merge(vec![first, rom("game", "a.bin", Some("deadbeef"), Some(MD5))]);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].hash(HashField::Sha1), Some(SHA1));
    assert_eq!(merged[0].hash(HashField::Md5), Some(MD5));
}

#[test]
fn nodump_items_pass_through() {
    let mut nd = rom("game", "a.bin", Some("deadbeef"), None);
    if let Some(dump) = nd.dump_mut() {
        dump.status = ItemStatus::Nodump;
    }
    let merged = merge(vec![
        nd.clone(),
        rom("game", "a.bin", Some("deadbeef"), None),
        nd.clone(),
    ]);
    assert_eq!(merged.len(), 3);
    assert_eq!(merged[0], nd);
    assert_eq!(merged[2], nd);
}

#[test]
fn first_seen_position_is_kept() {
    let merged = merge(vec![
        rom("a", "1.bin", Some("11111111"), None),
        rom("b", "2.bin", Some("22222222"), None),
        rom("c", "1.bin", Some("11111111"), None),
        rom("d", "3.bin", Some("33333333"), None),
    ]);
    let names: Vec<_> = merged.iter().map(|i| i.machine.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "d"]);
    assert_eq!(merged[0].dupe, DupeType::INTERNAL | DupeType::HASH);
}

#[test]
fn lower_system_id_takes_identity() {
    let merged = merge(vec![
        with_ids(rom("late", "late.bin", Some("deadbeef"), None), 2, 2),
        with_ids(rom("early", "early.bin", Some("deadbeef"), Some(MD5)), 0, 0),
    ]);
    assert_eq!(merged.len(), 1);
    let survivor = &merged[0];
    assert_eq!(survivor.system_id, 0);
    assert_eq!(survivor.source_id, 0);
    assert_eq!(survivor.machine.name, "early");
    assert_eq!(survivor.name, "early.bin");
    assert_eq!(survivor.hash(HashField::Md5), Some(MD5));
    assert_eq!(survivor.dupe, DupeType::EXTERNAL | DupeType::HASH);
}

#[test]
fn lower_source_id_takes_identity_independently() {
    let merged = merge(vec![
        with_ids(rom("b", "b.bin", Some("deadbeef"), None), 0, 1),
        with_ids(rom("a", "a.bin", Some("deadbeef"), None), 0, 0),
    ]);
    assert_eq!(merged[0].system_id, 0);
    assert_eq!(merged[0].source_id, 0);
    assert_eq!(merged[0].machine.name, "a");
}

#[test]
fn higher_ids_do_not_take_identity() {
    let merged = merge(vec![
        with_ids(rom("first", "a.bin", Some("deadbeef"), None), 0, 0),
        with_ids(rom("second", "a.bin", Some("deadbeef"), None), 1, 1),
    ]);
    assert_eq!(merged[0].machine.name, "first");
    assert_eq!(merged[0].system_id, 0);
}

fn mixed_list() -> Vec<Item> {
    let mut nd = rom("nd", "nd.bin", Some("deadbeef"), None);
    if let Some(dump) = nd.dump_mut() {
        dump.status = ItemStatus::Nodump;
    }
    vec![
        with_ids(rom("g1", "a.bin", Some("deadbeef"), None), 1, 0),
        with_ids(rom("g2", "a.bin", None, Some(MD5)), 0, 0),
        with_ids(rom("g3", "b.bin", Some("cafebabe"), None), 0, 0),
        nd,
        with_ids(rom("g4", "a.bin", Some("deadbeef"), Some(MD5)), 2, 1),
        with_ids(rom("g5", "c.bin", Some("cafebabe"), Some(MD5)), 1, 1),
        Item::sample("boom").with_machine(Machine::new("g1")),
        Item::sample("boom").with_machine(Machine::new("g1")),
    ]
}

#[test]
fn merge_is_idempotent() {
    let once = merge(mixed_list());
    let twice = merge(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn merge_never_loses_hashes() {
    let input = mixed_list();
    let merged = merge(input.clone());
    for original in input.iter().filter(|i| !i.is_nodump()) {
        let survivor = merged
            .iter()
            .find(|m| !m.is_nodump() && equals(m, original))
            .expect("every item has a surviving representative");
        for field in HashField::ALL {
            if let Some(value) = original.hash(field) {
                assert_eq!(
                    survivor.hash(field),
                    Some(value),
                    "{} lost from {:?}",
                    field.name(),
                    original
                );
            }
        }
    }
}

#[test]
fn survivors_are_pairwise_distinct() {
    let merged = merge(mixed_list());
    for (i, a) in merged.iter().enumerate() {
        for b in merged.iter().skip(i + 1) {
            assert!(!equals(a, b), "{:?} and {:?} should have merged", a, b);
        }
    }
}
