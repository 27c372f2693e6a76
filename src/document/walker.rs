/*!
 * Extraction of translation units from a `Layout`.
 *
 * Units come out in one canonical order: body paragraphs, then tables
 * (row-major, cell-major), then headers, then footers. That order drives
 * chunking, progress counting and write-back everywhere else.
 */

use serde::{Deserialize, Serialize};

use super::model::{ContainerKind, Layout, ParagraphId, RunId};

/// Which optional containers are traversed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkerConfig {
    pub include_tables: bool,
    pub include_headers: bool,
    pub include_footers: bool,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            include_tables: true,
            include_headers: true,
            include_footers: true,
        }
    }
}

/// A run included in a unit, with its untrimmed length in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRef {
    pub run_id: RunId,
    pub original_len: usize,
}

/// Text of one paragraph sent as one translation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationUnit {
    /// Position in extraction order
    pub unit_id: usize,
    /// Trimmed non-blank run texts joined by single spaces
    pub text: String,
    pub container_kind: ContainerKind,
    pub paragraph_id: ParagraphId,
    /// Included runs, in paragraph order
    pub runs: Vec<RunRef>,
}

impl TranslationUnit {
    /// Sum of the included runs' original lengths
    pub fn total_original_len(&self) -> usize {
        self.runs.iter().map(|r| r.original_len).sum()
    }
}

/// Walk the layout and build its translation units
pub fn extract(layout: &Layout, config: &WalkerConfig) -> Vec<TranslationUnit> {
    let mut order = vec![ContainerKind::Body];
    if config.include_tables {
        order.push(ContainerKind::Table);
    }
    if config.include_headers {
        order.push(ContainerKind::Header);
    }
    if config.include_footers {
        order.push(ContainerKind::Footer);
    }

    let mut units = Vec::new();
    for kind in order {
        for (_, container) in layout.containers_of(kind) {
            for paragraph_id in container.paragraph_ids() {
                if let Some(unit) = build_unit(layout, paragraph_id, kind, units.len()) {
                    units.push(unit);
                }
            }
        }
    }
    units
}

fn build_unit(
    layout: &Layout,
    paragraph_id: ParagraphId,
    kind: ContainerKind,
    unit_id: usize,
) -> Option<TranslationUnit> {
    let paragraph = layout.paragraph(paragraph_id)?;

    let mut pieces = Vec::new();
    let mut runs = Vec::new();
    for run_id in &paragraph.runs {
        let Some(run) = layout.run(*run_id) else { continue };
        if run.is_blank() {
            continue;
        }
        pieces.push(run.text.trim());
        runs.push(RunRef { run_id: *run_id, original_len: run.char_len() });
    }

    if runs.is_empty() {
        return None;
    }

    Some(TranslationUnit {
        unit_id,
        text: pieces.join(" "),
        container_kind: kind,
        paragraph_id,
        runs,
    })
}
