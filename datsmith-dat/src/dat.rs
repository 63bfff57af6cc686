use std::io::{BufRead, Read};
use std::path::Path;

use datsmith_core::item::SIZE_UNKNOWN;
use datsmith_core::{
    BiosSet, Catalog, DatHeader, Disk, DumpInfo, Item, ItemData, ItemKind, ItemStatus, Machine,
    Provenance, Release, Rom, SoftwareInfo,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::DatError;

/// Which on-disk format a DAT was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatFormat {
    Logiqx,
    ClrMamePro,
}

/// A parsed DAT file (Logiqx XML or ClrMamePro).
///
/// Items are normalized, stamped with the provenance given to the parser and
/// keyed by machine in `catalog`. The DAT header is `catalog.header`.
#[derive(Debug, Clone)]
pub struct DatFile {
    pub format: DatFormat,
    pub catalog: Catalog,
    /// Number of machines/games seen, including ones without items.
    pub machine_count: usize,
    /// Items dropped because they were malformed.
    pub skipped: usize,
}

impl DatFile {
    pub fn header(&self) -> &DatHeader {
        &self.catalog.header
    }
}

/// Parse a DAT file, auto-detecting format (XML or ClrMamePro).
pub fn parse_dat<R: BufRead>(mut reader: R, provenance: Provenance) -> Result<DatFile, DatError> {
    // Peek at the first non-whitespace content to detect format
    let mut first_bytes = Vec::new();
    let mut buf = [0u8; 1];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            return Err(DatError::invalid_dat("Empty DAT file"));
        }
        first_bytes.push(buf[0]);
        if !buf[0].is_ascii_whitespace() {
            break;
        }
    }

    // Build a chained reader with the peeked bytes + remaining data
    let chain = std::io::Cursor::new(first_bytes).chain(reader);
    let buffered = std::io::BufReader::new(chain);

    if buf[0] == b'<' {
        parse_xml(buffered, provenance)
    } else {
        parse_clrmamepro(buffered, provenance)
    }
}

/// Parse a DAT file from a file path.
pub fn parse_dat_file(path: &Path, provenance: Provenance) -> Result<DatFile, DatError> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let dat = parse_dat(reader, provenance)?;
    log::debug!(
        "Parsed {} ({:?}): {} machines, {} items, {} skipped",
        path.display(),
        dat.format,
        dat.machine_count,
        dat.catalog.item_count(),
        dat.skipped
    );
    Ok(dat)
}

// ---------------------------------------------------------------------------
// Shared item construction
// ---------------------------------------------------------------------------

/// Attributes of an item or machine, in document order.
type Attrs = Vec<(String, String)>;

fn attr<'a>(attrs: &'a Attrs, key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .filter(|v| !v.is_empty())
}

fn attr_string(attrs: &Attrs, key: &str) -> Option<String> {
    attr(attrs, key).map(str::to_string)
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "yes" | "true" | "1")
}

/// Parse a decimal or `0x`-prefixed size.
fn parse_size(value: &str) -> Option<i64> {
    let value = value.trim();
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

fn item_kind(tag: &str) -> Option<ItemKind> {
    match tag {
        "rom" => Some(ItemKind::Rom),
        "disk" => Some(ItemKind::Disk),
        "archive" => Some(ItemKind::Archive),
        "biosset" => Some(ItemKind::BiosSet),
        "release" => Some(ItemKind::Release),
        "sample" => Some(ItemKind::Sample),
        _ => None,
    }
}

fn dump_info(attrs: &Attrs) -> DumpInfo {
    DumpInfo {
        md5: attr_string(attrs, "md5"),
        sha1: attr_string(attrs, "sha1"),
        sha256: attr_string(attrs, "sha256"),
        sha384: attr_string(attrs, "sha384"),
        sha512: attr_string(attrs, "sha512"),
        status: attr(attrs, "status")
            .or_else(|| attr(attrs, "flags"))
            .and_then(|s| s.parse().ok())
            .unwrap_or(ItemStatus::None),
    }
}

/// Build an item from its attributes. The error is a reason for skipping it.
fn build_item(kind: ItemKind, attrs: &Attrs) -> Result<Item, String> {
    let name = attr_string(attrs, "name").unwrap_or_default();
    let data = match kind {
        ItemKind::Rom => {
            let size = match attr(attrs, "size") {
                Some(raw) => parse_size(raw).ok_or_else(|| format!("invalid size '{raw}'"))?,
                None => SIZE_UNKNOWN,
            };
            ItemData::Rom(Rom {
                size,
                crc: attr_string(attrs, "crc"),
                date: attr_string(attrs, "date"),
                dump: dump_info(attrs),
            })
        }
        ItemKind::Disk => ItemData::Disk(Disk {
            dump: dump_info(attrs),
        }),
        ItemKind::Archive => ItemData::Archive,
        ItemKind::Sample => ItemData::Sample,
        ItemKind::BiosSet => ItemData::BiosSet(BiosSet {
            description: attr_string(attrs, "description").unwrap_or_default(),
            default: attr(attrs, "default").map(parse_flag),
        }),
        ItemKind::Release => ItemData::Release(Release {
            region: attr_string(attrs, "region").unwrap_or_default(),
            language: attr_string(attrs, "language"),
            date: attr_string(attrs, "date"),
            default: attr(attrs, "default").map(parse_flag),
        }),
    };
    Ok(Item::new(name, data))
}

fn machine_from_attributes(attrs: &Attrs) -> Machine {
    let mut machine = Machine::new(attr_string(attrs, "name").unwrap_or_default());
    machine.clone_of = attr_string(attrs, "cloneof");
    machine.rom_of = attr_string(attrs, "romof");
    machine.sample_of = attr_string(attrs, "sampleof");
    machine.source_file = attr_string(attrs, "sourcefile");
    machine.board = attr_string(attrs, "board");
    machine.rebuild_to = attr_string(attrs, "rebuildto");
    machine.is_bios = attr(attrs, "isbios").is_some_and(parse_flag);
    machine
}

fn set_header_field(header: &mut DatHeader, key: &str, value: String) {
    match key {
        "name" => header.name = value,
        "description" => header.description = value,
        "version" => header.version = value,
        "date" => header.date = value,
        "author" => header.author = value,
        "homepage" => header.homepage = value,
        "url" => header.url = value,
        "comment" => header.comment = value,
        "category" => header.category = value,
        "type" => header.superdat = value.eq_ignore_ascii_case("superdat"),
        _ => {}
    }
}

fn set_machine_field(machine: &mut Machine, software: &mut SoftwareInfo, key: &str, value: String) {
    match key {
        "description" => machine.description = value,
        "year" => machine.year = Some(value),
        "manufacturer" => machine.manufacturer = Some(value),
        "comment" => machine.comment = Some(value),
        "cloneof" => machine.clone_of = Some(value),
        "romof" => machine.rom_of = Some(value),
        "sampleof" => machine.sample_of = Some(value),
        "publisher" => software.publisher = Some(value),
        _ => {}
    }
}

/// Collects machines and their items into a catalog in document order.
struct Builder {
    provenance: Provenance,
    catalog: Catalog,
    machine_count: usize,
    skipped: usize,
}

impl Builder {
    fn new(provenance: Provenance) -> Self {
        Self {
            provenance,
            catalog: Catalog::new(),
            machine_count: 0,
            skipped: 0,
        }
    }

    fn skip(&mut self, machine: &str, reason: &str) {
        log::warn!("Skipping item in '{}': {}", machine, reason);
        self.skipped += 1;
    }

    /// Attach the machine and machine-level software info to each item and
    /// add them to the catalog.
    fn push_machine(&mut self, machine: Machine, software: &SoftwareInfo, items: Vec<Item>) {
        self.machine_count += 1;
        for mut item in items {
            item.machine = machine.clone();
            item.software.supported = software.supported.clone();
            item.software.publisher = software.publisher.clone();
            item.software.infos = software.infos.clone();
            item = item.with_provenance(self.provenance);
            item.normalize();
            if let Err(e) = self.catalog.insert(item) {
                self.skip(&machine.name, &e.to_string());
            }
        }
    }

    fn finish(
        mut self,
        format: DatFormat,
        header: DatHeader,
    ) -> Result<DatFile, DatError> {
        if header.name.is_empty() && self.machine_count == 0 {
            return Err(DatError::invalid_dat(format!(
                "No header or games found in {:?} DAT file",
                format
            )));
        }
        self.catalog.header = header;
        Ok(DatFile {
            format,
            catalog: self.catalog,
            machine_count: self.machine_count,
            skipped: self.skipped,
        })
    }
}

// ---------------------------------------------------------------------------
// Logiqx XML parser
// ---------------------------------------------------------------------------

fn xml_attributes(e: &BytesStart<'_>) -> Result<Attrs, DatError> {
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value()?.into_owned();
        attrs.push((key, value));
    }
    Ok(attrs)
}

fn is_machine_tag(tag: &str) -> bool {
    matches!(tag, "game" | "machine" | "software")
}

/// Parser state for one Logiqx document.
struct XmlState {
    builder: Builder,
    header: DatHeader,
    in_header: bool,
    current_tag: String,
    machine: Option<Machine>,
    /// Machine-level software fields (supported, publisher, info).
    software: SoftwareInfo,
    /// Part and data area enclosing the next items.
    part: SoftwareInfo,
    items: Vec<Item>,
}

impl XmlState {
    fn start_machine(&mut self, attrs: &Attrs) {
        self.machine = Some(machine_from_attributes(attrs));
        self.software = SoftwareInfo {
            supported: attr_string(attrs, "supported"),
            ..SoftwareInfo::default()
        };
        self.part = SoftwareInfo::default();
        self.items.clear();
    }

    fn end_machine(&mut self) {
        if let Some(machine) = self.machine.take() {
            let items = std::mem::take(&mut self.items);
            self.builder.push_machine(machine, &self.software, items);
        }
    }

    fn item(&mut self, kind: ItemKind, attrs: &Attrs) {
        let Some(machine) = self.machine.as_ref() else {
            log::warn!("Skipping {} outside of a machine", kind);
            self.builder.skipped += 1;
            return;
        };
        match build_item(kind, attrs) {
            Ok(mut item) => {
                item.software = self.part.clone();
                self.items.push(item);
            }
            Err(reason) => {
                let name = machine.name.clone();
                self.builder.skip(&name, &reason);
            }
        }
    }

    /// Elements that may carry content (`Start`) or be self-closing (`Empty`).
    fn element(&mut self, tag: &str, e: &BytesStart<'_>, empty: bool) -> Result<(), DatError> {
        if let Some(kind) = item_kind(tag) {
            let attrs = xml_attributes(e)?;
            self.item(kind, &attrs);
            return Ok(());
        }
        match tag {
            "header" if !empty => self.in_header = true,
            t if is_machine_tag(t) => {
                let attrs = xml_attributes(e)?;
                self.start_machine(&attrs);
                if empty {
                    self.end_machine();
                }
            }
            "part" => {
                let attrs = xml_attributes(e)?;
                self.part = SoftwareInfo {
                    part_name: attr_string(&attrs, "name"),
                    part_interface: attr_string(&attrs, "interface"),
                    ..SoftwareInfo::default()
                };
            }
            "feature" => {
                let attrs = xml_attributes(e)?;
                if let Some(name) = attr_string(&attrs, "name") {
                    let value = attr_string(&attrs, "value").unwrap_or_default();
                    self.part.features.push((name, value));
                }
            }
            "dataarea" | "diskarea" => {
                let attrs = xml_attributes(e)?;
                self.part.area_name = attr_string(&attrs, "name");
                self.part.area_size = attr(&attrs, "size").and_then(parse_size);
            }
            "info" if self.machine.is_some() => {
                let attrs = xml_attributes(e)?;
                if let Some(name) = attr_string(&attrs, "name") {
                    let value = attr_string(&attrs, "value").unwrap_or_default();
                    self.software.infos.push((name, value));
                }
            }
            _ if !empty => self.current_tag = tag.to_string(),
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, text: String) {
        if self.in_header {
            set_header_field(&mut self.header, &self.current_tag, text);
        } else if let Some(machine) = self.machine.as_mut() {
            set_machine_field(machine, &mut self.software, &self.current_tag, text);
        }
    }

    fn end(&mut self, tag: &str) {
        match tag {
            "header" => self.in_header = false,
            t if is_machine_tag(t) => self.end_machine(),
            "part" => self.part = SoftwareInfo::default(),
            "dataarea" | "diskarea" => {
                self.part.area_name = None;
                self.part.area_size = None;
            }
            _ => self.current_tag.clear(),
        }
    }
}

fn parse_xml<R: BufRead>(reader: R, provenance: Provenance) -> Result<DatFile, DatError> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut state = XmlState {
        builder: Builder::new(provenance),
        header: DatHeader::default(),
        in_header: false,
        current_tag: String::new(),
        machine: None,
        software: SoftwareInfo::default(),
        part: SoftwareInfo::default(),
        items: Vec::new(),
    };

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                state.element(&tag_name, e, false)?;
            }
            Event::Empty(ref e) => {
                let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                state.element(&tag_name, e, true)?;
            }
            Event::Text(ref e) => {
                let text = e.unescape()?.to_string();
                state.text(text);
            }
            Event::End(ref e) => {
                let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                state.end(&tag_name);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    // Unterminated machine at EOF
    state.end_machine();
    state.builder.finish(DatFormat::Logiqx, state.header)
}

// ---------------------------------------------------------------------------
// ClrMamePro DAT parser
// ---------------------------------------------------------------------------

/// Parse a ClrMamePro format DAT file.
///
/// Format:
/// ```text
/// clrmamepro (
///     name "System Name"
///     version 20240101-000000
/// )
///
/// game (
///     name "Game Name (Region)"
///     rom ( name "Game Name (Region).ext" size 12345 crc AABBCCDD sha1 ... )
///     sample "boom.wav"
/// )
/// ```
///
/// `resource` blocks are BIOS sets and become machines with `is_bios`.
fn parse_clrmamepro<R: BufRead>(reader: R, provenance: Provenance) -> Result<DatFile, DatError> {
    let mut builder = Builder::new(provenance);
    let mut header = DatHeader::default();

    let mut in_block: Option<String> = None; // "clrmamepro", "game", ...
    let mut machine: Option<Machine> = None;
    let mut software = SoftwareInfo::default();
    let mut items: Vec<Item> = Vec::new();

    for line_result in reader.lines() {
        let line = line_result?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        // Detect block start: "blocktype ("
        let Some(block_type) = in_block.as_deref() else {
            if let Some(block_type) = detect_block_start(trimmed) {
                if matches!(block_type.as_str(), "game" | "machine" | "resource") {
                    let mut m = Machine::default();
                    m.is_bios = block_type == "resource";
                    machine = Some(m);
                    software = SoftwareInfo::default();
                    items.clear();
                }
                in_block = Some(block_type);
            }
            continue;
        };

        // Detect block end: ")"
        if trimmed == ")" {
            if let Some(m) = machine.take() {
                builder.push_machine(m, &software, std::mem::take(&mut items));
            }
            in_block = None;
            continue;
        }

        let Some(entry) = parse_kv(trimmed) else {
            continue;
        };
        match (block_type, machine.as_mut()) {
            ("clrmamepro", _) => set_header_field(&mut header, &entry.key, entry.value),
            (_, Some(m)) => {
                if let Some(kind) = item_kind(&entry.key) {
                    let attrs = if entry.inline {
                        token_pairs(tokenize_rom_line(&entry.value))
                    } else {
                        vec![("name".to_string(), entry.value)]
                    };
                    match build_item(kind, &attrs) {
                        Ok(item) => items.push(item),
                        Err(reason) => builder.skip(&m.name, &reason),
                    }
                } else if entry.key == "name" {
                    if m.description.is_empty() || m.description == m.name {
                        m.description = entry.value.clone();
                    }
                    m.name = entry.value;
                } else {
                    set_machine_field(m, &mut software, &entry.key, entry.value);
                }
            }
            _ => {}
        }
    }

    // Unterminated block at EOF
    if let Some(m) = machine.take() {
        builder.push_machine(m, &software, items);
    }

    builder.finish(DatFormat::ClrMamePro, header)
}

/// Detect a block start like `clrmamepro (` or `game (`.
fn detect_block_start(line: &str) -> Option<String> {
    let stripped = line.trim_end();
    if stripped.ends_with('(') {
        let block_type = stripped[..stripped.len() - 1].trim();
        if !block_type.is_empty() && block_type.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Some(block_type.to_lowercase());
        }
    }
    None
}

/// One `key value` line inside a block.
#[derive(Debug, PartialEq, Eq)]
struct Entry {
    key: String,
    value: String,
    /// The value was a parenthesised `( ... )` group.
    inline: bool,
}

/// Parse a key-value line like `name "Some Value"` or `version 20240101`.
/// For `rom ( ... )` style lines, the value is the content inside the parens.
fn parse_kv(line: &str) -> Option<Entry> {
    let trimmed = line.trim();

    // Split on first whitespace
    let mut parts = trimmed.splitn(2, |c: char| c.is_ascii_whitespace());
    let key = parts.next()?.trim().to_string();
    let raw_value = parts.next()?.trim();

    if raw_value.starts_with('(') && raw_value.ends_with(')') && raw_value.len() >= 2 {
        let inner = raw_value[1..raw_value.len() - 1].trim();
        return Some(Entry {
            key,
            value: inner.to_string(),
            inline: true,
        });
    }

    // Strip surrounding quotes if present
    let value = if raw_value.starts_with('"') && raw_value.ends_with('"') && raw_value.len() >= 2 {
        raw_value[1..raw_value.len() - 1].to_string()
    } else {
        raw_value.to_string()
    };

    Some(Entry {
        key,
        value,
        inline: false,
    })
}

/// Pair up `key value key value ...` tokens. A trailing lone key is dropped.
fn token_pairs(tokens: Vec<String>) -> Attrs {
    let mut attrs = Vec::with_capacity(tokens.len() / 2);
    let mut iter = tokens.into_iter();
    while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
        attrs.push((key, value));
    }
    attrs
}

/// Tokenize an inline entry, respecting quoted strings.
/// `name "Game (Region).ext" size 12345 crc AB` → ["name", "Game (Region).ext", "size", "12345", "crc", "AB"]
fn tokenize_rom_line(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        // Skip whitespace
        while chars.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            chars.next();
        }

        if chars.peek().is_none() {
            break;
        }

        let mut token = String::new();
        if chars.peek() == Some(&'"') {
            chars.next(); // consume opening quote
            for c in chars.by_ref() {
                if c == '"' {
                    break;
                }
                token.push(c);
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_ascii_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
        }
        tokens.push(token);
    }

    tokens
}

#[cfg(test)]
#[path = "tests/dat_tests.rs"]
mod tests;
