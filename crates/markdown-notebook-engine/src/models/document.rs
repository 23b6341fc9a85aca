use serde::{Deserialize, Serialize};

use super::cell::{Cell, Metadata};

/// An ordered sequence of cells plus document-level metadata.
///
/// Serialises as an nbformat 4 notebook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default = "Document::default_nbformat")]
    pub nbformat: u32,
    #[serde(default = "Document::default_nbformat_minor")]
    pub nbformat_minor: u32,
}

impl Document {
    pub fn new() -> Self {
        Self::from_cells(Vec::new())
    }

    pub fn from_cells(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            metadata: Metadata::new(),
            nbformat: Self::default_nbformat(),
            nbformat_minor: Self::default_nbformat_minor(),
        }
    }

    /// Wraps a whole Markdown text as a single unsegmented markdown cell.
    pub fn from_markdown(text: &str) -> Self {
        Self::from_cells(vec![Cell::markdown(text).with_fresh_id()])
    }

    /// Whether this format version requires a unique `id` on every cell
    /// (nbformat 4.5 onwards).
    pub fn requires_cell_ids(&self) -> bool {
        self.nbformat > 4 || (self.nbformat == 4 && self.nbformat_minor >= 5)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.cells.iter()
    }

    fn default_nbformat() -> u32 {
        4
    }

    fn default_nbformat_minor() -> u32 {
        5
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Cell> for Document {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Self::from_cells(iter.into_iter().collect())
    }
}
