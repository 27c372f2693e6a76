/*!
 * OOXML word-processing documents (`.docx`).
 *
 * The package is kept as a list of zip entries. The main part, header parts
 * and footer parts are parsed into owned quick-xml event streams; each run
 * in the layout remembers which `<w:t>` text events hold its text so that
 * serialization can write the new text back in place and leave every other
 * event untouched.
 */

use log::debug;
use once_cell::sync::Lazy;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use regex::Regex;
use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::model::{ContainerId, ContainerKind, Layout, ParagraphId, RunStyle};
use crate::errors::{ExtractionError, PersistenceError};

const MAIN_PART: &str = "word/document.xml";

static HEADER_FOOTER_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^word/(header|footer)(\d*)\.xml$").unwrap());

/// One raw entry of the zip package
#[derive(Debug, Clone)]
struct PackageEntry {
    name: String,
    data: Vec<u8>,
    is_dir: bool,
    compression: CompressionMethod,
}

/// A parsed XML part
#[derive(Debug, Clone)]
struct XmlPart {
    entry_index: usize,
    events: Vec<Event<'static>>,
}

/// Location of a run's text inside a part's event stream
#[derive(Debug, Clone, Default)]
struct RunSlot {
    part: usize,
    /// Index of the first `<w:t>` start event
    first_text_start: Option<usize>,
    /// Indices of the text events inside the run's `<w:t>` elements
    text_events: Vec<usize>,
}

/// A word-processing document opened in memory
#[derive(Debug, Clone)]
pub struct DocxDocument {
    entries: Vec<PackageEntry>,
    parts: Vec<XmlPart>,
    slots: Vec<RunSlot>,
    layout: Layout,
}

impl DocxDocument {
    /// Open a `.docx` package from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ExtractionError> {
        let entries = read_package(bytes)?;

        let main_index = entries.iter()
            .position(|e| e.name == MAIN_PART)
            .ok_or_else(|| ExtractionError::MissingPart(MAIN_PART.to_string()))?;

        let mut headers = Vec::new();
        let mut footers = Vec::new();
        for (index, entry) in entries.iter().enumerate() {
            if let Some(caps) = HEADER_FOOTER_PART.captures(&entry.name) {
                let number: u32 = caps[2].parse().unwrap_or(0);
                match &caps[1] {
                    "header" => headers.push((number, index)),
                    _ => footers.push((number, index)),
                }
            }
        }
        headers.sort();
        footers.sort();

        let mut document = Self {
            entries,
            parts: Vec::new(),
            slots: Vec::new(),
            layout: Layout::new(),
        };

        document.load_part(main_index, ContainerKind::Body)?;
        for (_, index) in headers {
            document.load_part(index, ContainerKind::Header)?;
        }
        for (_, index) in footers {
            document.load_part(index, ContainerKind::Footer)?;
        }

        debug!(
            "Opened docx with {} parts, {} paragraphs, {} runs",
            document.parts.len(),
            document.layout.paragraphs.len(),
            document.layout.runs.len()
        );
        Ok(document)
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut Layout {
        &mut self.layout
    }

    /// Serialize the package with every run's current text
    pub fn to_bytes(&self) -> Result<Vec<u8>, PersistenceError> {
        let mut parts_xml = Vec::with_capacity(self.parts.len());
        for (part_index, part) in self.parts.iter().enumerate() {
            let events = self.patched_events(part_index, part);
            parts_xml.push((part.entry_index, write_events(&events)?));
        }

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (index, entry) in self.entries.iter().enumerate() {
            let options = FileOptions::default().compression_method(entry.compression);
            if entry.is_dir {
                writer.add_directory(entry.name.as_str(), options)
                    .map_err(|e| PersistenceError::Serialize(e.to_string()))?;
                continue;
            }
            let data = parts_xml.iter()
                .find(|(entry_index, _)| *entry_index == index)
                .map(|(_, xml)| xml.as_slice())
                .unwrap_or(&entry.data);
            writer.start_file(entry.name.as_str(), options)
                .map_err(|e| PersistenceError::Serialize(e.to_string()))?;
            writer.write_all(data)
                .map_err(|e| PersistenceError::Serialize(e.to_string()))?;
        }

        let cursor = writer.finish()
            .map_err(|e| PersistenceError::Serialize(e.to_string()))?;
        Ok(cursor.into_inner())
    }

    fn patched_events(&self, part_index: usize, part: &XmlPart) -> Vec<Event<'static>> {
        let mut events = part.events.clone();
        for (run_index, slot) in self.slots.iter().enumerate() {
            if slot.part != part_index {
                continue;
            }
            let text = self.layout.runs.get(run_index).map(|r| r.text.as_str()).unwrap_or_default();
            if let Some(start) = slot.first_text_start {
                events[start] = Event::Start(
                    BytesStart::new("w:t").with_attributes([("xml:space", "preserve")]),
                );
            }
            for (n, event_index) in slot.text_events.iter().enumerate() {
                let content = if n == 0 { text } else { "" };
                events[*event_index] = Event::Text(BytesText::new(content).into_owned());
            }
        }
        events
    }

    fn load_part(&mut self, entry_index: usize, kind: ContainerKind) -> Result<(), ExtractionError> {
        let entry = &self.entries[entry_index];
        let events = read_events(&entry.name, &entry.data)?;
        let part_index = self.parts.len();

        let flow = self.layout.add_flow(kind);
        let mut state = PartWalker::new(part_index, flow, kind == ContainerKind::Body);

        for (event_index, event) in events.iter().enumerate() {
            state.visit(event_index, event, &mut self.layout, &mut self.slots);
        }

        self.parts.push(XmlPart { entry_index, events });
        Ok(())
    }
}

/// A run being read
struct PendingRun {
    paragraph: ParagraphId,
    style: RunStyle,
    text: String,
    slot: RunSlot,
}

/// Event visitor building the layout for one part
struct PartWalker {
    part: usize,
    flow: ContainerId,
    /// Tables become their own containers only in the main part
    split_tables: bool,
    table_depth: usize,
    table: Option<ContainerId>,
    paragraphs: Vec<ParagraphId>,
    /// Open runs, innermost last; text boxes nest runs inside runs
    runs: Vec<PendingRun>,
    in_run_props: bool,
    in_text: bool,
}

impl PartWalker {
    fn new(part: usize, flow: ContainerId, split_tables: bool) -> Self {
        Self {
            part,
            flow,
            split_tables,
            table_depth: 0,
            table: None,
            paragraphs: Vec::new(),
            runs: Vec::new(),
            in_run_props: false,
            in_text: false,
        }
    }

    fn visit(&mut self, index: usize, event: &Event<'static>, layout: &mut Layout, slots: &mut Vec<RunSlot>) {
        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tbl" => {
                    self.table_depth += 1;
                    if self.table_depth == 1 && self.split_tables {
                        self.table = Some(layout.add_table());
                    }
                }
                b"w:tr" if self.table_depth == 1 => {
                    if let Some(table) = self.table {
                        layout.start_row(table);
                    }
                }
                b"w:tc" if self.table_depth == 1 => {
                    if let Some(table) = self.table {
                        layout.start_cell(table);
                    }
                }
                b"w:p" => {
                    let container = match self.table {
                        Some(table) if self.table_depth > 0 => table,
                        _ => self.flow,
                    };
                    self.paragraphs.push(layout.add_paragraph(container));
                }
                b"w:r" => {
                    if let Some(paragraph) = self.paragraphs.last().copied() {
                        self.runs.push(PendingRun {
                            paragraph,
                            style: RunStyle::default(),
                            text: String::new(),
                            slot: RunSlot { part: self.part, ..RunSlot::default() },
                        });
                    }
                }
                b"w:rPr" if !self.runs.is_empty() => self.in_run_props = true,
                b"w:t" => {
                    if let Some(run) = self.runs.last_mut() {
                        self.in_text = true;
                        run.slot.first_text_start.get_or_insert(index);
                    }
                }
                _ => self.visit_property(e),
            },
            Event::Empty(e) => self.visit_property(e),
            Event::Text(t) if self.in_text => {
                if let Some(run) = self.runs.last_mut() {
                    let text = t.unescape().map(|s| s.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&t.clone().into_inner()).into_owned());
                    run.text.push_str(&text);
                    run.slot.text_events.push(index);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:tbl" => {
                    self.table_depth = self.table_depth.saturating_sub(1);
                    if self.table_depth == 0 {
                        self.table = None;
                    }
                }
                b"w:p" => {
                    self.paragraphs.pop();
                }
                b"w:rPr" => self.in_run_props = false,
                b"w:t" => self.in_text = false,
                b"w:r" => self.finish_run(layout, slots),
                _ => {}
            },
            _ => {}
        }
    }

    fn visit_property(&mut self, e: &BytesStart<'_>) {
        if !self.in_run_props {
            return;
        }
        let Some(run) = self.runs.last_mut() else { return };
        match e.name().as_ref() {
            b"w:b" => run.style.bold = toggle_value(e),
            b"w:i" => run.style.italic = toggle_value(e),
            b"w:rFonts" => run.style.font = attribute(e, b"w:ascii"),
            b"w:sz" => {
                run.style.size = attribute(e, b"w:val")
                    .and_then(|v| v.parse::<f32>().ok())
                    .map(|half_points| half_points / 2.0);
            }
            _ => {}
        }
    }

    fn finish_run(&mut self, layout: &mut Layout, slots: &mut Vec<RunSlot>) {
        let Some(run) = self.runs.pop() else { return };
        if run.slot.text_events.is_empty() {
            return;
        }
        let id = layout.add_run(run.paragraph, run.text, run.style);
        debug_assert_eq!(id.0, slots.len());
        slots.push(run.slot);
    }
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// `<w:b/>` is on; `<w:b w:val="0"/>` or `"false"` is off
fn toggle_value(e: &BytesStart<'_>) -> bool {
    !matches!(attribute(e, b"w:val").as_deref(), Some("0") | Some("false") | Some("off"))
}

fn read_package(bytes: &[u8]) -> Result<Vec<PackageEntry>, ExtractionError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::Archive(e.to_string()))?;

    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut file = archive.by_index(index)
            .map_err(|e| ExtractionError::Archive(e.to_string()))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .map_err(|e| ExtractionError::Archive(e.to_string()))?;
        let compression = match file.compression() {
            CompressionMethod::Stored => CompressionMethod::Stored,
            _ => CompressionMethod::Deflated,
        };
        entries.push(PackageEntry {
            name: file.name().to_string(),
            is_dir: file.is_dir(),
            data,
            compression,
        });
    }
    Ok(entries)
}

fn read_events(part: &str, xml: &[u8]) -> Result<Vec<Event<'static>>, ExtractionError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut events = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(event) => events.push(event.into_owned()),
            Err(e) => {
                return Err(ExtractionError::Xml {
                    part: part.to_string(),
                    message: format!("at position {}: {}", reader.buffer_position(), e),
                });
            }
        }
        buf.clear();
    }
    Ok(events)
}

fn write_events(events: &[Event<'static>]) -> Result<Vec<u8>, PersistenceError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    for event in events {
        writer.write_event(event.clone())
            .map_err(|e| PersistenceError::Serialize(e.to_string()))?;
    }
    Ok(writer.into_inner().into_inner())
}
