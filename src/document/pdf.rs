/*!
 * PDF documents.
 *
 * Text is read from page content streams: every `BT`..`ET` group is a text
 * block and every show operator (`Tj`, `TJ`, `'`, `"`) inside it is a run.
 * Consecutive blocks are merged into logical paragraphs when they look like
 * the continuation of one another, including across a page break.
 *
 * Writing back replaces the string operand of each show operator with the
 * run's current text. Strings are decoded as UTF-16BE when they carry a
 * byte-order mark and as Latin-1 otherwise; new text is written as Latin-1
 * when it fits and as UTF-16BE with a byte-order mark when it does not.
 */

use log::debug;
use lopdf::content::{Content, Operation};
use lopdf::{Object, ObjectId, StringFormat};
use once_cell::sync::Lazy;
use regex::Regex;

use super::model::{ContainerKind, Layout, RunStyle};
use crate::errors::{ExtractionError, PersistenceError};

/// Kerning adjustment in a `TJ` array treated as a word gap
const TJ_SPACE_THRESHOLD: f32 = -200.0;
/// Largest baseline distance between blocks of one paragraph
const MAX_LINE_GAP: f32 = 20.0;
/// Largest horizontal offset between blocks of one paragraph
const MAX_INDENT_DIFF: f32 = 10.0;
const FONT_SIZE_TOLERANCE: f32 = 0.1;

static ORDERED_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:First|Second|Third|Fourth|Fifth|Sixth|Seventh|Eighth|Ninth|Tenth)[,.]").unwrap()
});
static BULLET_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[•\-*]\s+").unwrap());
static NUMERIC_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d+\.\s+").unwrap());
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?。！？…]$").unwrap());
static CAPITAL_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]").unwrap());

/// Where a run's string lives
#[derive(Debug, Clone, Copy)]
struct TextSlot {
    page: usize,
    operation: usize,
}

#[derive(Debug, Clone)]
struct PageContent {
    id: ObjectId,
    operations: Vec<Operation>,
}

/// One `BT`..`ET` group
#[derive(Debug, Clone)]
struct TextBlock {
    page_number: u32,
    font: String,
    size: f32,
    x: f32,
    y: f32,
    runs: Vec<(String, RunStyle, TextSlot)>,
}

impl TextBlock {
    fn text(&self) -> String {
        self.runs.iter()
            .map(|(text, _, _)| text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A run of merged blocks forming one paragraph
struct BlockGroup {
    first: TextBlock,
    last_page: u32,
    last_y: f32,
    text: String,
    blocks: Vec<TextBlock>,
}

impl BlockGroup {
    fn new(block: TextBlock) -> Self {
        Self {
            last_page: block.page_number,
            last_y: block.y,
            text: block.text(),
            first: block.clone(),
            blocks: vec![block],
        }
    }

    fn push(&mut self, block: TextBlock) {
        let text = block.text();
        if self.text.ends_with('-') {
            self.text.pop();
        } else if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(&text);
        self.last_page = block.page_number;
        self.last_y = block.y;
        self.blocks.push(block);
    }

    fn same_font(&self, next: &TextBlock) -> bool {
        self.first.font == next.font && (self.first.size - next.size).abs() < FONT_SIZE_TOLERANCE
    }

    /// Whether `next` continues this paragraph
    fn accepts(&self, next: &TextBlock) -> bool {
        if next.page_number != self.last_page {
            return self.same_font(next)
                && !ends_sentence(&self.text)
                && next.page_number == self.last_page + 1;
        }

        self.same_font(next)
            && (self.last_y - next.y).abs() < MAX_LINE_GAP
            && (self.first.x - next.x).abs() < MAX_INDENT_DIFF
            && !is_new_paragraph_start(&next.text())
    }
}

/// True when text opens a new paragraph: an ordinal word, a bullet,
/// a numbered item or a capitalised sentence start
pub fn is_new_paragraph_start(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }
    ORDERED_START.is_match(text)
        || BULLET_START.is_match(text)
        || NUMERIC_START.is_match(text)
        || CAPITAL_START.is_match(text)
}

/// True when text ends with sentence punctuation
pub fn ends_sentence(text: &str) -> bool {
    SENTENCE_END.is_match(text.trim())
}

/// A PDF opened in memory
#[derive(Debug, Clone)]
pub struct PdfDocument {
    document: lopdf::Document,
    pages: Vec<PageContent>,
    slots: Vec<TextSlot>,
    layout: Layout,
}

impl PdfDocument {
    /// Open a PDF from bytes, merging text blocks into paragraphs when `merge_blocks` is set
    pub fn from_bytes(bytes: &[u8], merge_blocks: bool) -> Result<Self, ExtractionError> {
        let document = lopdf::Document::load_mem(bytes)
            .map_err(|e| ExtractionError::Pdf(e.to_string()))?;

        let mut pages = Vec::new();
        let mut blocks = Vec::new();
        for (number, page_id) in document.get_pages() {
            let raw = document.get_page_content(page_id)
                .map_err(|e| ExtractionError::Pdf(format!("page {}: {}", number, e)))?;
            let content = Content::decode(&raw)
                .map_err(|e| ExtractionError::Pdf(format!("page {}: {}", number, e)))?;

            blocks.extend(read_blocks(pages.len(), number, &content.operations));
            pages.push(PageContent { id: page_id, operations: content.operations });
        }

        let groups = group_blocks(blocks, merge_blocks);
        let mut layout = Layout::new();
        let mut slots = Vec::new();
        let body = layout.add_flow(ContainerKind::Body);
        for group in groups {
            let paragraph = layout.add_paragraph(body);
            for block in group.blocks {
                for (text, style, slot) in block.runs {
                    layout.add_run(paragraph, text, style);
                    slots.push(slot);
                }
            }
        }

        debug!(
            "Opened pdf with {} pages, {} paragraphs, {} runs",
            pages.len(),
            layout.paragraphs.len(),
            layout.runs.len()
        );
        Ok(Self { document, pages, slots, layout })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut Layout {
        &mut self.layout
    }

    /// Serialize the PDF with every run's current text
    pub fn to_bytes(&self) -> Result<Vec<u8>, PersistenceError> {
        let mut pages: Vec<Vec<Operation>> = self.pages.iter().map(|p| p.operations.clone()).collect();
        for (run, slot) in self.layout.runs.iter().zip(&self.slots) {
            if let Some(operation) = pages.get_mut(slot.page).and_then(|ops| ops.get_mut(slot.operation)) {
                replace_shown_text(operation, &run.text);
            }
        }

        let mut document = self.document.clone();
        for (page, operations) in self.pages.iter().zip(pages) {
            let encoded = Content { operations }.encode()
                .map_err(|e| PersistenceError::Serialize(e.to_string()))?;
            document.change_page_content(page.id, encoded)
                .map_err(|e| PersistenceError::Serialize(e.to_string()))?;
        }

        let mut bytes = Vec::new();
        document.save_to(&mut bytes)
            .map_err(|e| PersistenceError::Serialize(e.to_string()))?;
        Ok(bytes)
    }
}

fn group_blocks(blocks: Vec<TextBlock>, merge: bool) -> Vec<BlockGroup> {
    let mut groups: Vec<BlockGroup> = Vec::new();
    for block in blocks {
        match groups.last_mut() {
            Some(group) if merge && group.accepts(&block) => group.push(block),
            _ => groups.push(BlockGroup::new(block)),
        }
    }
    groups
}

/// Text state while scanning one page
struct TextCursor {
    font: String,
    size: f32,
    leading: f32,
    line_x: f32,
    line_y: f32,
}

fn read_blocks(page: usize, page_number: u32, operations: &[Operation]) -> Vec<TextBlock> {
    let mut cursor = TextCursor { font: String::new(), size: 0.0, leading: 0.0, line_x: 0.0, line_y: 0.0 };
    let mut blocks = Vec::new();
    let mut current: Option<TextBlock> = None;

    for (index, operation) in operations.iter().enumerate() {
        let operands = &operation.operands;
        match operation.operator.as_str() {
            "BT" => {
                cursor.line_x = 0.0;
                cursor.line_y = 0.0;
                current = Some(TextBlock {
                    page_number,
                    font: cursor.font.clone(),
                    size: cursor.size,
                    x: 0.0,
                    y: 0.0,
                    runs: Vec::new(),
                });
            }
            "ET" => {
                if let Some(block) = current.take() {
                    if !block.runs.is_empty() {
                        blocks.push(block);
                    }
                }
            }
            "Tf" => {
                if let Some(Ok(name)) = operands.first().map(|o| o.as_name()) {
                    cursor.font = String::from_utf8_lossy(name).into_owned();
                }
                if let Some(size) = operands.get(1).and_then(number) {
                    cursor.size = size;
                }
            }
            "TL" => {
                if let Some(leading) = operands.first().and_then(number) {
                    cursor.leading = leading;
                }
            }
            "Td" | "TD" => {
                if let (Some(tx), Some(ty)) = (operands.first().and_then(number), operands.get(1).and_then(number)) {
                    cursor.line_x += tx;
                    cursor.line_y += ty;
                    if operation.operator == "TD" {
                        cursor.leading = -ty;
                    }
                }
            }
            "Tm" => {
                if let (Some(e), Some(f)) = (operands.get(4).and_then(number), operands.get(5).and_then(number)) {
                    cursor.line_x = e;
                    cursor.line_y = f;
                }
            }
            "T*" => cursor.line_y -= cursor.leading,
            "Tj" | "'" | "\"" | "TJ" => {
                if matches!(operation.operator.as_str(), "'" | "\"") {
                    cursor.line_y -= cursor.leading;
                }
                let Some(block) = current.as_mut() else { continue };
                let Some(text) = shown_text(operation) else { continue };
                if block.runs.is_empty() {
                    block.font = cursor.font.clone();
                    block.size = cursor.size;
                    block.x = cursor.line_x;
                    block.y = cursor.line_y;
                }
                let style = RunStyle {
                    font: (!cursor.font.is_empty()).then(|| cursor.font.clone()),
                    size: (cursor.size > 0.0).then_some(cursor.size),
                    ..RunStyle::default()
                };
                block.runs.push((text, style, TextSlot { page, operation: index }));
            }
            _ => {}
        }
    }
    blocks
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

/// Text drawn by a show operator
fn shown_text(operation: &Operation) -> Option<String> {
    let operands = &operation.operands;
    match operation.operator.as_str() {
        "Tj" | "'" => string_operand(operands.first()?),
        "\"" => string_operand(operands.get(2)?),
        "TJ" => {
            let Object::Array(items) = operands.first()? else { return None };
            let mut text = String::new();
            for item in items {
                match item {
                    Object::String(bytes, _) => text.push_str(&decode_pdf_string(bytes)),
                    other => {
                        if number(other).is_some_and(|n| n < TJ_SPACE_THRESHOLD) {
                            text.push(' ');
                        }
                    }
                }
            }
            Some(text)
        }
        _ => None,
    }
}

fn string_operand(object: &Object) -> Option<String> {
    match object {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        _ => None,
    }
}

fn replace_shown_text(operation: &mut Operation, text: &str) {
    let encoded = encode_pdf_string(text);
    match operation.operator.as_str() {
        "Tj" | "'" => operation.operands = vec![encoded],
        "\"" => {
            operation.operands.truncate(2);
            operation.operands.push(encoded);
        }
        "TJ" => operation.operands = vec![Object::Array(vec![encoded])],
        _ => {}
    }
}

/// Decode a PDF string: UTF-16BE with a byte-order mark, Latin-1 otherwise
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(body) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = body.chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|b| char::from(*b)).collect()
}

/// Encode text as a PDF string object: Latin-1 when possible, UTF-16BE otherwise
pub fn encode_pdf_string(text: &str) -> Object {
    if text.chars().all(|c| (c as u32) <= 0xFF) {
        let bytes = text.chars().map(|c| c as u8).collect();
        return Object::String(bytes, StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}
