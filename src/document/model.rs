/*!
 * Arena model of a document's formatting hierarchy.
 *
 * Containers own paragraphs and paragraphs own runs, but only by index:
 * every record lives in one of three flat vectors inside `Layout`, and all
 * cross references are `ContainerId`/`ParagraphId`/`RunId` values. Format
 * backends keep their own side tables keyed by `RunId` to find where each
 * run's text lives in the underlying file.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a container in `Layout::containers`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContainerId(pub usize);

/// Index of a paragraph in `Layout::paragraphs`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParagraphId(pub usize);

/// Index of a run in `Layout::runs`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunId(pub usize);

/// Where a container sits in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    /// Main text flow
    Body,
    /// A table; paragraphs are addressed by row and cell
    Table,
    /// A page header part
    Header,
    /// A page footer part
    Footer,
}

impl ContainerKind {
    /// Name used for translation units, where body text is called "paragraph"
    pub fn unit_kind(&self) -> &'static str {
        match self {
            Self::Body => "paragraph",
            Self::Table => "table",
            Self::Header => "header",
            Self::Footer => "footer",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.unit_kind())
    }
}

/// Character formatting carried by a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStyle {
    pub bold: bool,
    pub italic: bool,
    pub font: Option<String>,
    /// Size in points
    pub size: Option<f32>,
}

/// Smallest independently formatted span of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub paragraph: ParagraphId,
    pub text: String,
    pub style: RunStyle,
}

impl Run {
    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Ordered sequence of runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub container: ContainerId,
    pub runs: Vec<RunId>,
}

/// Paragraphs of a container, either as one flow or as a grid of cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContainerContent {
    Flow(Vec<ParagraphId>),
    /// rows → cells → paragraphs
    Grid(Vec<Vec<Vec<ParagraphId>>>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub kind: ContainerKind,
    pub content: ContainerContent,
}

impl Container {
    /// Paragraphs in reading order: row-major, then cell-major for grids
    pub fn paragraph_ids(&self) -> Vec<ParagraphId> {
        match &self.content {
            ContainerContent::Flow(paragraphs) => paragraphs.clone(),
            ContainerContent::Grid(rows) => rows.iter()
                .flat_map(|row| row.iter())
                .flat_map(|cell| cell.iter().copied())
                .collect(),
        }
    }
}

/// The arena
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub containers: Vec<Container>,
    pub paragraphs: Vec<Paragraph>,
    pub runs: Vec<Run>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a container holding a single flow of paragraphs
    pub fn add_flow(&mut self, kind: ContainerKind) -> ContainerId {
        self.containers.push(Container { kind, content: ContainerContent::Flow(Vec::new()) });
        ContainerId(self.containers.len() - 1)
    }

    /// Add a table container
    pub fn add_table(&mut self) -> ContainerId {
        self.containers.push(Container {
            kind: ContainerKind::Table,
            content: ContainerContent::Grid(Vec::new()),
        });
        ContainerId(self.containers.len() - 1)
    }

    /// Append a paragraph to a flow container.
    ///
    /// For a grid container the paragraph lands in the last cell of the last row.
    pub fn add_paragraph(&mut self, container: ContainerId) -> ParagraphId {
        let id = ParagraphId(self.paragraphs.len());
        self.paragraphs.push(Paragraph { container, runs: Vec::new() });
        if let Some(target) = self.containers.get_mut(container.0) {
            match &mut target.content {
                ContainerContent::Flow(paragraphs) => paragraphs.push(id),
                ContainerContent::Grid(rows) => {
                    if rows.is_empty() {
                        rows.push(Vec::new());
                    }
                    if let Some(row) = rows.last_mut() {
                        if row.is_empty() {
                            row.push(Vec::new());
                        }
                        if let Some(cell) = row.last_mut() {
                            cell.push(id);
                        }
                    }
                }
            }
        }
        id
    }

    /// Start a new row in a grid container
    pub fn start_row(&mut self, container: ContainerId) {
        if let Some(Container { content: ContainerContent::Grid(rows), .. }) = self.containers.get_mut(container.0) {
            rows.push(Vec::new());
        }
    }

    /// Start a new cell in the current row of a grid container
    pub fn start_cell(&mut self, container: ContainerId) {
        if let Some(Container { content: ContainerContent::Grid(rows), .. }) = self.containers.get_mut(container.0) {
            if rows.is_empty() {
                rows.push(Vec::new());
            }
            if let Some(row) = rows.last_mut() {
                row.push(Vec::new());
            }
        }
    }

    /// Append a run to a paragraph
    pub fn add_run(&mut self, paragraph: ParagraphId, text: impl Into<String>, style: RunStyle) -> RunId {
        let id = RunId(self.runs.len());
        self.runs.push(Run { paragraph, text: text.into(), style });
        if let Some(target) = self.paragraphs.get_mut(paragraph.0) {
            target.runs.push(id);
        }
        id
    }

    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.containers.get(id.0)
    }

    pub fn paragraph(&self, id: ParagraphId) -> Option<&Paragraph> {
        self.paragraphs.get(id.0)
    }

    pub fn run(&self, id: RunId) -> Option<&Run> {
        self.runs.get(id.0)
    }

    /// Replace a run's text; unknown ids are ignored
    pub fn set_run_text(&mut self, id: RunId, text: impl Into<String>) {
        if let Some(run) = self.runs.get_mut(id.0) {
            run.text = text.into();
        }
    }

    /// Containers of one kind, in insertion order
    pub fn containers_of(&self, kind: ContainerKind) -> impl Iterator<Item = (ContainerId, &Container)> {
        self.containers.iter()
            .enumerate()
            .filter(move |(_, c)| c.kind == kind)
            .map(|(i, c)| (ContainerId(i), c))
    }

    /// Concatenated raw text of a paragraph
    pub fn paragraph_text(&self, id: ParagraphId) -> String {
        self.paragraph(id)
            .map(|p| p.runs.iter().filter_map(|r| self.run(*r)).map(|r| r.text.as_str()).collect())
            .unwrap_or_default()
    }
}
