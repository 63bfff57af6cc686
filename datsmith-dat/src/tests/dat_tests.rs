use super::*;
use datsmith_core::{HashField, item::SHA1_ZERO};

// -- XML tests --

const SAMPLE_XML_DAT: &str = r#"<?xml version="1.0"?>
<!DOCTYPE datafile SYSTEM "http://www.logiqx.com/Dats/datafile.dtd">
<datafile>
    <header>
        <name>Nintendo - Super Nintendo Entertainment System</name>
        <description>Nintendo - Super Nintendo Entertainment System (20240101-000000)</description>
        <version>20240101-000000</version>
        <author>Tom &amp; Jerry</author>
    </header>
    <game name="Super Mario World (USA)">
        <description>Super Mario World (USA)</description>
        <rom name="Super Mario World (USA).sfc" size="524288" crc="B19ED489" sha1="6b47bb75d16514b6a476aa0c73a683a2a4c18765"/>
    </game>
    <game name="The Legend of Zelda - A Link to the Past (USA)" cloneof="Zelda (Japan)">
        <year>1992</year>
        <manufacturer>Nintendo</manufacturer>
        <rom name="The Legend of Zelda - A Link to the Past (USA).sfc" size="1048576" crc="777aac2f" sha1="59b4b1730a3e2ae4b30efc9c1e0d31986b6c4b44"/>
    </game>
</datafile>"#;

fn parse(text: &str) -> DatFile {
    parse_dat(text.as_bytes(), Provenance::default()).unwrap()
}

fn find<'a>(dat: &'a DatFile, name: &str) -> &'a Item {
    dat.catalog
        .items()
        .find(|i| i.name == name)
        .unwrap_or_else(|| panic!("no item named {name}"))
}

#[test]
fn test_parse_xml_dat() {
    let dat = parse(SAMPLE_XML_DAT);
    assert_eq!(dat.format, DatFormat::Logiqx);
    assert_eq!(
        dat.header().name,
        "Nintendo - Super Nintendo Entertainment System"
    );
    assert_eq!(dat.header().version, "20240101-000000");
    assert_eq!(dat.header().author, "Tom & Jerry");
    assert_eq!(dat.machine_count, 2);
    assert_eq!(dat.catalog.item_count(), 2);

    let smw = find(&dat, "Super Mario World (USA).sfc");
    assert_eq!(smw.machine.name, "Super Mario World (USA)");
    assert_eq!(smw.size(), Some(524288));
    // Hashes are lower-cased on ingest
    assert_eq!(smw.hash(HashField::Crc), Some("b19ed489"));
    assert_eq!(
        smw.hash(HashField::Sha1),
        Some("6b47bb75d16514b6a476aa0c73a683a2a4c18765")
    );

    let zelda = find(&dat, "The Legend of Zelda - A Link to the Past (USA).sfc");
    assert_eq!(zelda.machine.clone_of.as_deref(), Some("Zelda (Japan)"));
    assert_eq!(zelda.machine.year.as_deref(), Some("1992"));
    assert_eq!(zelda.machine.manufacturer.as_deref(), Some("Nintendo"));
    // No <description> falls back to the machine name
    assert_eq!(
        zelda.machine.description,
        "The Legend of Zelda - A Link to the Past (USA)"
    );
}

#[test]
fn test_items_carry_provenance() {
    let dat = parse_dat(SAMPLE_XML_DAT.as_bytes(), Provenance::new(3, 1)).unwrap();
    assert!(
        dat.catalog
            .items()
            .all(|i| i.system_id == 3 && i.source_id == 1)
    );
    assert!(
        dat.catalog
            .keys()
            .all(|k| k.starts_with("0000000003-0000000001-"))
    );
}

#[test]
fn test_parse_empty_xml() {
    let xml = r#"<?xml version="1.0"?><datafile></datafile>"#;
    let result = parse_dat(xml.as_bytes(), Provenance::default());
    assert!(matches!(result, Err(DatError::InvalidDat(_))));
}

#[test]
fn test_parse_empty_input() {
    let result = parse_dat("   \n".as_bytes(), Provenance::default());
    assert!(result.is_err());
}

#[test]
fn test_parse_all_item_kinds() {
    let xml = r#"<?xml version="1.0"?>
<datafile>
    <header><name>Arcade</name></header>
    <machine name="neogeo" isbios="yes" sourcefile="neogeo.cpp">
        <biosset name="euro" description="Europe MVS" default="yes"/>
        <rom name="sp-s2.sp1" size="131072" crc="9036d879" status="baddump"/>
        <disk name="hdd" sha1="0123456789abcdef0123456789abcdef01234567" status="nodump"/>
        <sample name="boom"/>
        <archive name="extras"/>
        <release name="Neo Geo (Euro)" region="EUR" language="en"/>
    </machine>
</datafile>"#;
    let dat = parse(xml);
    assert_eq!(dat.catalog.item_count(), 6);
    let stats = dat.catalog.stats();
    assert_eq!(stats.biosset_count, 1);
    assert_eq!(stats.rom_count, 1);
    assert_eq!(stats.disk_count, 1);
    assert_eq!(stats.sample_count, 1);
    assert_eq!(stats.archive_count, 1);
    assert_eq!(stats.release_count, 1);
    assert_eq!(stats.baddump_count, 1);
    assert_eq!(stats.nodump_count, 1);

    let bios = find(&dat, "euro");
    assert!(bios.machine.is_bios);
    assert_eq!(bios.machine.source_file.as_deref(), Some("neogeo.cpp"));
    match &bios.data {
        ItemData::BiosSet(set) => {
            assert_eq!(set.description, "Europe MVS");
            assert_eq!(set.default, Some(true));
        }
        other => panic!("expected biosset, got {:?}", other),
    }

    match &find(&dat, "Neo Geo (Euro)").data {
        ItemData::Release(release) => {
            assert_eq!(release.region, "EUR");
            assert_eq!(release.language.as_deref(), Some("en"));
        }
        other => panic!("expected release, got {:?}", other),
    }
}

#[test]
fn test_parse_software_list() {
    let xml = r#"<?xml version="1.0"?>
<softwarelist name="nes">
    <software name="smb" supported="yes">
        <description>Super Mario Bros.</description>
        <year>1985</year>
        <publisher>Nintendo</publisher>
        <info name="serial" value="NES-SM-USA"/>
        <info name="release" value="198510"/>
        <part name="cart" interface="nes_cart">
            <feature name="slot" value="nrom"/>
            <dataarea name="prg" size="0x8000">
                <rom name="prg.bin" size="32768" crc="5cf548d3"/>
            </dataarea>
        </part>
    </software>
</softwarelist>"#;
    let dat = parse(xml);
    let prg = find(&dat, "prg.bin");
    assert_eq!(prg.machine.description, "Super Mario Bros.");
    let software = &prg.software;
    assert_eq!(software.supported.as_deref(), Some("yes"));
    assert_eq!(software.publisher.as_deref(), Some("Nintendo"));
    assert_eq!(
        software.infos,
        vec![
            ("serial".to_string(), "NES-SM-USA".to_string()),
            ("release".to_string(), "198510".to_string()),
        ]
    );
    assert_eq!(software.part_name.as_deref(), Some("cart"));
    assert_eq!(software.part_interface.as_deref(), Some("nes_cart"));
    assert_eq!(
        software.features,
        vec![("slot".to_string(), "nrom".to_string())]
    );
    assert_eq!(software.area_name.as_deref(), Some("prg"));
    assert_eq!(software.area_size, Some(0x8000));
}

#[test]
fn test_malformed_items_are_skipped() {
    let xml = r#"<?xml version="1.0"?>
<datafile>
    <header><name>Test</name></header>
    <game name="Test Game">
        <rom name="ok.bin" size="16" crc="12345678"/>
        <rom name="bad.bin" size="lots" crc="12345678"/>
        <rom size="16" crc="87654321"/>
    </game>
</datafile>"#;
    let dat = parse(xml);
    assert_eq!(dat.catalog.item_count(), 1);
    assert_eq!(dat.skipped, 2);
}

#[test]
fn test_zero_byte_rom_gets_sentinels() {
    let xml = r#"<?xml version="1.0"?>
<datafile>
    <header><name>Test</name></header>
    <game name="Empty">
        <rom name="empty.bin" size="0"/>
    </game>
</datafile>"#;
    let dat = parse(xml);
    let rom = find(&dat, "empty.bin");
    assert_eq!(rom.hash(HashField::Crc), Some("00000000"));
    assert_eq!(rom.hash(HashField::Sha1), Some(SHA1_ZERO));
}

#[test]
fn test_superdat_type_is_read() {
    let xml = r#"<?xml version="1.0"?>
<datafile>
    <header><name>Everything</name><type>SuperDAT</type></header>
</datafile>"#;
    assert!(parse(xml).header().superdat);
}

// -- ClrMamePro tests --

const SAMPLE_CLR_DAT: &str = r#"clrmamepro (
	name "Nintendo - Nintendo Entertainment System"
	description "Nintendo - Nintendo Entertainment System"
	version 20141025-064058
)

game (
	name "'89 Dennou Kyuusei Uranai (Japan)"
	description "'89 Dennou Kyuusei Uranai (Japan)"
	rom ( name "'89 Dennou Kyuusei Uranai (Japan).nes" size 262144 crc BA58ED29 md5 4187A797E33BC96A96993220DA6F09F7 sha1 56FE858D1035DCE4B68520F457A0858BAE7BB16D )
)

game (
	name "10-Yard Fight (USA, Europe)"
	description "10-Yard Fight (USA, Europe)"
	rom ( name "10-Yard Fight (USA, Europe).nes" size 40960 crc 3D564757 md5 BD2C15391B0641D43A35E83F5FCE073A sha1 016818BF6BAAF779F4F5C1658880B81D23EA40CA )
)
"#;

#[test]
fn test_parse_clrmamepro_dat() {
    let dat = parse(SAMPLE_CLR_DAT);
    assert_eq!(dat.format, DatFormat::ClrMamePro);
    assert_eq!(dat.header().name, "Nintendo - Nintendo Entertainment System");
    assert_eq!(dat.header().version, "20141025-064058");
    assert_eq!(dat.machine_count, 2);

    let rom = find(&dat, "'89 Dennou Kyuusei Uranai (Japan).nes");
    assert_eq!(rom.machine.name, "'89 Dennou Kyuusei Uranai (Japan)");
    assert_eq!(rom.size(), Some(262144));
    assert_eq!(rom.hash(HashField::Crc), Some("ba58ed29"));
    assert_eq!(
        rom.hash(HashField::Md5),
        Some("4187a797e33bc96a96993220da6f09f7")
    );
    assert_eq!(
        rom.hash(HashField::Sha1),
        Some("56fe858d1035dce4b68520f457a0858bae7bb16d")
    );

    let rom = find(&dat, "10-Yard Fight (USA, Europe).nes");
    assert_eq!(rom.size(), Some(40960));
}

#[test]
fn test_parse_empty_clrmamepro() {
    let result = parse_dat("clrmamepro (\n)\n".as_bytes(), Provenance::default());
    assert!(result.is_err());
}

#[test]
fn test_parse_clrmamepro_items_and_resources() {
    let dat_str = r#"clrmamepro (
	name "Arcade"
	author "someone"
)

resource (
	name "neogeo"
	biosset ( name "euro" description "Europe MVS" default yes )
	rom ( name "sp-s2.sp1" size 131072 crc 9036D879 )
)

game (
	name "mslug"
	cloneof "mslugo"
	year 1996
	manufacturer "Nazca"
	rom ( name "201-p1.p1" size 2097152 crc 08D8DAA5 flags baddump )
	disk ( name "mslug" sha1 0123456789ABCDEF0123456789ABCDEF01234567 )
	sample "boom.wav"
	archive ( name "mslug" )
	release ( name "Metal Slug (World)" region World )
)
"#;
    let dat = parse(dat_str);
    assert_eq!(dat.header().author, "someone");
    assert_eq!(dat.machine_count, 2);
    assert_eq!(dat.catalog.item_count(), 7);

    let bios = find(&dat, "euro");
    assert!(bios.machine.is_bios);
    assert_eq!(bios.machine.name, "neogeo");

    let p1 = find(&dat, "201-p1.p1");
    assert_eq!(p1.status(), ItemStatus::BadDump);
    assert_eq!(p1.machine.clone_of.as_deref(), Some("mslugo"));
    assert_eq!(p1.machine.year.as_deref(), Some("1996"));
    assert_eq!(p1.machine.manufacturer.as_deref(), Some("Nazca"));
    assert!(!p1.machine.is_bios);

    assert_eq!(find(&dat, "boom.wav").kind(), ItemKind::Sample);
    assert_eq!(
        find(&dat, "mslug").hash(HashField::Sha1),
        Some("0123456789abcdef0123456789abcdef01234567")
    );
}

#[test]
fn test_tokenize_quoted_rom() {
    let tokens = tokenize_rom_line(r#"name "Game (USA, Europe).sfc" size 524288 crc ABCD1234"#);
    assert_eq!(
        tokens,
        vec![
            "name",
            "Game (USA, Europe).sfc",
            "size",
            "524288",
            "crc",
            "ABCD1234",
        ]
    );
}

#[test]
fn test_parse_kv_inline_group() {
    let entry = parse_kv(r#"rom ( name "a.bin" size 1 )"#).unwrap();
    assert_eq!(entry.key, "rom");
    assert_eq!(entry.value, r#"name "a.bin" size 1"#);
    assert!(entry.inline);

    let entry = parse_kv(r#"name "Some Game""#).unwrap();
    assert_eq!(entry.value, "Some Game");
    assert!(!entry.inline);
}

#[test]
fn test_token_pairs_drops_trailing_key() {
    let tokens = vec!["name".to_string(), "a".to_string(), "size".to_string()];
    assert_eq!(
        token_pairs(tokens),
        vec![("name".to_string(), "a".to_string())]
    );
}

#[test]
fn test_parse_dat_file_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nes.dat");
    std::fs::write(&path, SAMPLE_CLR_DAT).unwrap();
    let dat = parse_dat_file(&path, Provenance::new(0, 0)).unwrap();
    assert_eq!(dat.catalog.item_count(), 2);
}
