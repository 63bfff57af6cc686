use std::path::{Path, PathBuf};

use datsmith_core::{CascadeOptions, DiffModes, HashField, PlainMergeOptions, Provenance};
use datsmith_dat::parse_dat_file;
use datsmith_lib::{
    OutputTarget, RunError, expand_inputs, load_paths, run_cascade, run_dedupe, run_diff,
    run_merge, run_stats,
};

fn write_dat(path: &Path, name: &str, games: &[(&str, &str, &str)]) {
    let mut xml = String::from("<?xml version=\"1.0\"?>\n<datafile>\n");
    xml.push_str(&format!("  <header><name>{name}</name></header>\n"));
    for (game, rom, crc) in games {
        xml.push_str(&format!(
            "  <game name=\"{game}\">\n    <rom name=\"{rom}\" size=\"1024\" crc=\"{crc}\"/>\n  </game>\n"
        ));
    }
    xml.push_str("</datafile>\n");
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, xml).unwrap();
}

fn item_names(path: &Path) -> Vec<String> {
    let dat = parse_dat_file(path, Provenance::default()).unwrap();
    let mut names: Vec<String> = dat.catalog.items().map(|i| i.name.clone()).collect();
    names.sort();
    names
}

struct Fixture {
    _dir: tempfile::TempDir,
    root: PathBuf,
    first: PathBuf,
    second: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    let first = root.join("in").join("first.dat");
    let second = root.join("in").join("second.dat");
    write_dat(
        &first,
        "First",
        &[("game", "a.bin", "deadbeef"), ("only1", "b.bin", "11111111")],
    );
    write_dat(
        &second,
        "Second",
        &[("game", "a.bin", "deadbeef"), ("only2", "c.bin", "22222222")],
    );
    Fixture {
        _dir: dir,
        root,
        first,
        second,
    }
}

#[test]
fn directory_arguments_share_a_source_id() {
    let fx = fixture();
    let extra = fx.root.join("single.xml");
    write_dat(&extra, "Single", &[("x", "x.bin", "33333333")]);
    std::fs::write(fx.root.join("in").join("notes.txt"), "ignored").unwrap();

    let files = expand_inputs(&[fx.root.join("in"), extra.clone()]).unwrap();
    assert_eq!(files.len(), 3);
    assert_eq!(files[0].path, fx.first);
    assert_eq!(files[1].path, fx.second);
    assert_eq!(files[0].provenance, Provenance::new(0, 0));
    assert_eq!(files[1].provenance, Provenance::new(1, 0));
    assert_eq!(files[2].provenance, Provenance::new(2, 1));
    assert_eq!(files[2].root, None);
}

#[test]
fn missing_input_is_reported() {
    let fx = fixture();
    let missing = fx.root.join("nope.dat");
    assert!(matches!(
        expand_inputs(&[missing]),
        Err(RunError::MissingInput(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn loading_keeps_input_order() {
    let fx = fixture();
    let inputs = load_paths(&[fx.first.clone(), fx.second.clone()], 4)
        .await
        .unwrap();
    assert_eq!(inputs.len(), 2);
    assert_eq!(inputs[0].catalog.header.name, "First");
    assert_eq!(inputs[1].catalog.header.name, "Second");
    assert!(inputs[1].catalog.items().all(|i| i.system_id == 1));
}

#[tokio::test]
async fn unparseable_input_contributes_nothing() {
    let fx = fixture();
    let broken = fx.root.join("broken.dat");
    std::fs::write(&broken, "").unwrap();
    let inputs = load_paths(&[fx.first.clone(), broken], 2).await.unwrap();
    assert_eq!(inputs.len(), 2);
    assert_eq!(inputs[0].catalog.item_count(), 2);
    assert!(inputs[1].catalog.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cascade_writes_one_file_per_input() {
    let fx = fixture();
    let out = fx.root.join("out");
    let written = run_cascade(
        &[fx.first.clone(), fx.second.clone()],
        CascadeOptions::default(),
        &OutputTarget::Dir(out.clone()),
        2,
    )
    .await
    .unwrap();

    assert_eq!(written, vec![out.join("first.dat"), out.join("second.dat")]);
    assert_eq!(item_names(&written[0]), vec!["a.bin", "b.bin"]);
    assert_eq!(item_names(&written[1]), vec!["c.bin"]);
}

#[tokio::test]
async fn cascade_skip_first_writes_only_later_inputs() {
    let fx = fixture();
    let out = fx.root.join("out");
    let options = CascadeOptions {
        reverse: false,
        skip_first: true,
    };
    let written = run_cascade(
        &[fx.first.clone(), fx.second.clone()],
        options,
        &OutputTarget::Dir(out.clone()),
        2,
    )
    .await
    .unwrap();
    assert_eq!(written, vec![out.join("second.dat")]);
    assert!(!out.join("first.dat").exists());
}

#[tokio::test]
async fn diff_writes_combined_and_individual_outputs() {
    let fx = fixture();
    let out = fx.root.join("out");
    let written = run_diff(
        &[fx.first.clone(), fx.second.clone()],
        DiffModes::all(),
        &out,
        2,
    )
    .await
    .unwrap();
    assert_eq!(written.len(), 4);

    let no_dupes = out.join("First (No Duplicates).dat");
    let dupes = out.join("First (Duplicates).dat");
    assert_eq!(item_names(&no_dupes), vec!["b.bin", "c.bin"]);
    assert_eq!(item_names(&dupes), vec!["a.bin"]);
    assert_eq!(item_names(&out.join("first.dat")), vec!["b.bin"]);
    assert_eq!(item_names(&out.join("second.dat")), vec!["c.bin"]);

    let dat = parse_dat_file(&dupes, Provenance::default()).unwrap();
    let a = dat.catalog.items().next().unwrap();
    assert_eq!(a.machine.name, "game (first)");
    assert_eq!(a.hash(HashField::Crc), Some("deadbeef"));
}

#[tokio::test]
async fn merge_and_dedupe_write_single_files() {
    let fx = fixture();
    let merged = fx.root.join("merged.dat");
    run_merge(
        &[fx.first.clone(), fx.second.clone()],
        PlainMergeOptions {
            dedupe: true,
            superdat: false,
        },
        &merged,
        2,
    )
    .await
    .unwrap();
    assert_eq!(item_names(&merged), vec!["a.bin", "b.bin", "c.bin"]);

    let doubled = fx.root.join("doubled.dat");
    write_dat(
        &doubled,
        "Doubled",
        &[("g1", "a.bin", "deadbeef"), ("g2", "a2.bin", "deadbeef")],
    );
    let deduped = fx.root.join("deduped").join("out.dat");
    run_dedupe(&doubled, &deduped, false, 2).await.unwrap();
    assert_eq!(item_names(&deduped), vec!["a.bin"]);
}

#[tokio::test]
async fn stats_cover_each_input_and_total() {
    let fx = fixture();
    let report = run_stats(&[fx.first.clone(), fx.second.clone()], 2)
        .await
        .unwrap();
    assert_eq!(report.inputs.len(), 2);
    assert_eq!(report.inputs[0].name, "First");
    assert_eq!(report.inputs[0].stats.rom_count, 2);
    assert_eq!(report.total.rom_count, 4);
    assert_eq!(report.total.total_size, 4096);
}

#[tokio::test]
async fn empty_inputs_are_an_error() {
    let fx = fixture();
    let empty = fx.root.join("empty.dat");
    std::fs::write(
        &empty,
        "<?xml version=\"1.0\"?><datafile><header><name>E</name></header></datafile>",
    )
    .unwrap();
    let result = run_merge(
        &[empty],
        PlainMergeOptions::default(),
        &fx.root.join("m.dat"),
        1,
    )
    .await;
    assert!(matches!(
        result,
        Err(RunError::Core(datsmith_core::CoreError::EmptyInput))
    ));
}
