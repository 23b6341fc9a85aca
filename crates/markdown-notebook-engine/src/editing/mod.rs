//! # Editing
//!
//! Structural edits on a segmented document: adding, merging and dropping
//! cells, clearing the pipeline's annotations, locking cells, and pulling
//! the code out as a script.
//!
//! Caller mistakes (appending to an empty document, an unknown prepend
//! target, an invalid removal pattern) are reported to the sink and leave the
//! document as it was.

use std::{fmt, str::FromStr};

use serde_json::Value;

use crate::diagnostics::{Code, Diagnostic, DiagnosticSink};
use crate::models::{ANNOTATION_KEY, Cell, CellType, Document, Kind};
use crate::selection::{KindExpr, matches, select};

/// What kind of cell [`prepend`] creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Cell(CellType),
    Kind(Kind),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("`md:head` needs a level; write the heading as markdown instead")]
    Head,
    #[error("unknown cell target {0:?}")]
    Unknown(String),
}

impl FromStr for Target {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.strip_prefix("md:") {
            Some(Kind::HEAD) => Err(TargetError::Head),
            Some(Kind::FENCE) => Ok(Target::Kind(Kind::Fence)),
            Some(Kind::TEXT) => Ok(Target::Kind(Kind::Text)),
            Some(name) if !name.is_empty() && !name.contains(char::is_whitespace) => {
                Ok(Target::Kind(Kind::Named(name.to_string())))
            }
            Some(_) => Err(TargetError::Unknown(s.to_string())),
            None => s
                .parse::<CellType>()
                .map(Target::Cell)
                .map_err(|_| TargetError::Unknown(s.to_string())),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Cell(cell_type) => write!(f, "{cell_type}"),
            Target::Kind(kind) => write!(f, "md:{}", kind.name()),
        }
    }
}

impl Target {
    fn cell(&self, source: &str) -> Cell {
        match self {
            Target::Cell(cell_type) => Cell::new(*cell_type, source),
            Target::Kind(kind) => Cell::markdown(source).with_kind(kind.clone()),
        }
    }
}

/// Appends `text` to the source of the last cell.
pub fn append(doc: &mut Document, text: &str, sink: &mut dyn DiagnosticSink) -> bool {
    match doc.cells.last_mut() {
        Some(cell) => {
            cell.source.push_str(text);
            true
        }
        None => {
            sink.report(Diagnostic::error(
                Code::Misuse,
                "cannot append to an empty document",
            ));
            false
        }
    }
}

/// Inserts a new first cell. `target` is a cell type (`markdown`, `code`,
/// `raw`) or `md:<kind>`.
pub fn prepend(
    doc: &mut Document,
    text: &str,
    target: &str,
    sink: &mut dyn DiagnosticSink,
) -> bool {
    match target.parse::<Target>() {
        Ok(target) => {
            let mut cell = target.cell(text);
            if doc.requires_cell_ids() {
                cell.assign_fresh_id();
            }
            doc.cells.insert(0, cell);
            true
        }
        Err(e) => {
            sink.report(Diagnostic::error(Code::Misuse, format!("cannot prepend: {e}")));
            false
        }
    }
}

/// Joins each run of adjacent selected cells that share type and kind into
/// its first cell, separated by a blank line. Returns how many cells were
/// absorbed.
pub fn merge(doc: &mut Document, expr: &KindExpr) -> usize {
    let cells = std::mem::take(&mut doc.cells);
    let mut out: Vec<Cell> = Vec::with_capacity(cells.len());
    let mut absorbed = 0;
    // whether out.last() is a selected cell that can take more
    let mut open = false;

    for cell in cells {
        let selected = matches(&cell, expr);
        if let Some(last) = out.last_mut()
            && open
            && selected
            && last.cell_type == cell.cell_type
            && last.kind == cell.kind
        {
            last.source.push_str("\n\n");
            last.source.push_str(&cell.source);
            absorbed += 1;
            continue;
        }
        open = selected;
        out.push(cell);
    }

    doc.cells = out;
    absorbed
}

/// Drops the selected cells whose source matches `pattern` (searched, not
/// anchored). Returns how many were dropped.
pub fn remove_cells(
    doc: &mut Document,
    expr: &KindExpr,
    pattern: &str,
    sink: &mut dyn DiagnosticSink,
) -> usize {
    let regex = match fancy_regex::Regex::new(pattern) {
        Ok(regex) => regex,
        Err(e) => {
            sink.report(Diagnostic::error(
                Code::BadSubstitution,
                format!("invalid pattern {pattern:?}: {e}"),
            ));
            return 0;
        }
    };

    let before = doc.len();
    let mut index = 0;
    doc.cells.retain(|cell| {
        let here = index;
        index += 1;
        if !matches(cell, expr) {
            return true;
        }
        match regex.is_match(&cell.source) {
            Ok(found) => !found,
            Err(e) => {
                sink.report(
                    Diagnostic::error(Code::BadSubstitution, format!("pattern {pattern:?}: {e}"))
                        .at_cell(here),
                );
                true
            }
        }
    });
    before - doc.len()
}

/// Forgets the derived kind of the selected cells, so the written notebook
/// carries no trace of segmenting.
pub fn remove_annotations(doc: &mut Document, expr: &KindExpr) -> usize {
    let mut cleared = 0;
    for cell in select(doc, expr) {
        let had_kind = cell.kind.take().is_some();
        let had_key = cell.metadata.remove(ANNOTATION_KEY).is_some();
        if had_kind || had_key {
            cleared += 1;
        }
    }
    cleared
}

/// Sets the notebook `editable` / `deletable` flags on the selected cells.
/// `None` leaves a flag as it is.
pub fn set_cells(
    doc: &mut Document,
    expr: &KindExpr,
    editable: Option<bool>,
    deletable: Option<bool>,
) -> usize {
    let cells = select(doc, expr);
    let count = cells.len();
    for cell in cells {
        if let Some(editable) = editable {
            cell.metadata.insert("editable".into(), Value::Bool(editable));
        }
        if let Some(deletable) = deletable {
            cell.metadata
                .insert("deletable".into(), Value::Bool(deletable));
        }
    }
    count
}

/// The code cells' sources, separated by blank lines.
pub fn extract_code(doc: &Document) -> String {
    doc.iter()
        .filter(|c| c.cell_type == CellType::Code)
        .map(|c| c.source.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
