//! Logiqx XML output.

use std::io::Write;
use std::path::Path;

use datsmith_core::{BucketBy, BucketOptions, Catalog, DatHeader, Item, ItemData, Machine};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::DatError;

const DOCTYPE: &str =
    r#"datafile PUBLIC "-//Logiqx//DTD ROM Management Datafile//EN" "http://www.logiqx.com/Dats/datafile.dtd""#;

/// Write `catalog` as a Logiqx datafile.
///
/// Items are grouped into one `<game>` per machine bucket. With `norename`
/// the machine key ignores provenance, so same-named machines from different
/// inputs share an element.
pub fn write_dat<W: Write>(inner: W, catalog: &Catalog, norename: bool) -> Result<(), DatError> {
    let by_machine = catalog.clone().bucket_by(
        BucketBy::Machine,
        BucketOptions {
            dedupe: false,
            norename,
        },
    );

    let mut writer = Writer::new_with_indent(inner, b'\t', 1);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::DocType(BytesText::from_escaped(DOCTYPE)))?;
    writer.write_event(Event::Start(BytesStart::new("datafile")))?;

    write_header(&mut writer, &catalog.header)?;
    for (_, items) in by_machine.buckets() {
        if let Some(first) = items.first() {
            write_machine(&mut writer, &first.machine, items)?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new("datafile")))?;
    writer.get_mut().write_all(b"\n")?;
    Ok(())
}

/// Write `catalog` to `path`, replacing any existing file.
pub fn write_dat_file(path: &Path, catalog: &Catalog, norename: bool) -> Result<(), DatError> {
    let file = std::fs::File::create(path)?;
    let mut out = std::io::BufWriter::new(file);
    write_dat(&mut out, catalog, norename)?;
    out.flush()?;
    log::debug!(
        "Wrote {} items to {}",
        catalog.item_count(),
        path.display()
    );
    Ok(())
}

fn write_text<W: Write>(writer: &mut Writer<W>, tag: &str, value: &str) -> Result<(), DatError> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_header<W: Write>(writer: &mut Writer<W>, header: &DatHeader) -> Result<(), DatError> {
    writer.write_event(Event::Start(BytesStart::new("header")))?;
    write_text(writer, "name", &header.name)?;
    write_text(writer, "description", &header.description)?;
    for (tag, value) in [
        ("category", &header.category),
        ("version", &header.version),
        ("date", &header.date),
        ("author", &header.author),
        ("homepage", &header.homepage),
        ("url", &header.url),
        ("comment", &header.comment),
    ] {
        if !value.is_empty() {
            write_text(writer, tag, value)?;
        }
    }
    if header.superdat {
        write_text(writer, "type", "SuperDAT")?;
    }
    writer.write_event(Event::End(BytesEnd::new("header")))?;
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn write_machine<W: Write>(
    writer: &mut Writer<W>,
    machine: &Machine,
    items: &[Item],
) -> Result<(), DatError> {
    let mut start = BytesStart::new("game");
    start.push_attribute(("name", machine.name.as_str()));
    if let Some(source_file) = &machine.source_file {
        start.push_attribute(("sourcefile", source_file.as_str()));
    }
    if machine.is_bios {
        start.push_attribute(("isbios", "yes"));
    }
    for (key, value) in [
        ("cloneof", &machine.clone_of),
        ("romof", &machine.rom_of),
        ("sampleof", &machine.sample_of),
        ("board", &machine.board),
        ("rebuildto", &machine.rebuild_to),
    ] {
        if let Some(value) = value {
            start.push_attribute((key, value.as_str()));
        }
    }
    writer.write_event(Event::Start(start))?;

    if let Some(comment) = &machine.comment {
        write_text(writer, "comment", comment)?;
    }
    write_text(writer, "description", &machine.description)?;
    if let Some(year) = &machine.year {
        write_text(writer, "year", year)?;
    }
    if let Some(manufacturer) = &machine.manufacturer {
        write_text(writer, "manufacturer", manufacturer)?;
    }

    for item in items {
        writer.write_event(Event::Empty(item_element(item)))?;
    }

    writer.write_event(Event::End(BytesEnd::new("game")))?;
    Ok(())
}

fn item_element(item: &Item) -> BytesStart<'static> {
    let mut element = BytesStart::new(item.kind().tag());
    element.push_attribute(("name", item.name.as_str()));

    match &item.data {
        ItemData::Rom(rom) => {
            if rom.size >= 0 {
                element.push_attribute(("size", rom.size.to_string().as_str()));
            }
            if let Some(crc) = &rom.crc {
                element.push_attribute(("crc", crc.as_str()));
            }
        }
        ItemData::BiosSet(bios) => {
            element.push_attribute(("description", bios.description.as_str()));
            if let Some(default) = bios.default {
                element.push_attribute(("default", yes_no(default)));
            }
        }
        ItemData::Release(release) => {
            element.push_attribute(("region", release.region.as_str()));
            if let Some(language) = &release.language {
                element.push_attribute(("language", language.as_str()));
            }
            if let Some(date) = &release.date {
                element.push_attribute(("date", date.as_str()));
            }
            if let Some(default) = release.default {
                element.push_attribute(("default", yes_no(default)));
            }
        }
        ItemData::Disk(_) | ItemData::Archive | ItemData::Sample => {}
    }

    if let Some(dump) = item.dump() {
        for (key, value) in [
            ("md5", &dump.md5),
            ("sha1", &dump.sha1),
            ("sha256", &dump.sha256),
            ("sha384", &dump.sha384),
            ("sha512", &dump.sha512),
        ] {
            if let Some(value) = value {
                element.push_attribute((key, value.as_str()));
            }
        }
        if let ItemData::Rom(rom) = &item.data {
            if let Some(date) = &rom.date {
                element.push_attribute(("date", date.as_str()));
            }
        }
        if let Some(status) = dump.status.as_str() {
            element.push_attribute(("status", status));
        }
    }

    element
}

#[cfg(test)]
#[path = "tests/writer_tests.rs"]
mod tests;
