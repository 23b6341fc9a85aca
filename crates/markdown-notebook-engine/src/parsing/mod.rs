//! # Segmenting
//!
//! Splits each unsegmented markdown cell into a run of kind-tagged cells.
//!
//! ## Phases
//!
//! 1. **Line classification** (`classify`): each line gets its local facts
//!    (comment opener and which marker it names, fence signature, heading).
//! 2. **Segment construction** (`builder`): a `SegmentBuilder` holds one scan
//!    state (normal, fence, block annotation, generic comment) and emits
//!    segments as buffers close.
//!
//! ## Modules
//!
//! - **`kinds`**: syntax knowledge for fences, headings and HTML comments
//! - **`markers`**: the line/block annotation vocabulary
//! - **`classify`**: `LineClassifier` producing `LineClass`
//! - **`builder`**: the `SegmentBuilder` state machine
//!
//! ## Key invariants
//!
//! - Fences and block annotations are raw zones: nothing inside is classified
//! - Every emitted cell carries exactly one kind
//! - Output cells replace their input cell contiguously, in order

pub mod builder;
pub mod classify;
pub mod kinds;
pub mod markers;

pub use builder::{Segment, SegmentBuilder, Segmented, Unclosed};
pub use classify::{LineClass, LineClassifier};
pub use markers::{MarkerError, MarkerRole, Markers};

use crate::diagnostics::{Code, Diagnostic, DiagnosticSink, LogSink};
use crate::models::{ANNOTATION_KEY, Cell, CellType, Document};

/// Scans one markdown source into segments.
pub fn segment_source(source: &str, markers: &Markers) -> Segmented {
    let mut builder = SegmentBuilder::new(markers);
    for line in source.split('\n') {
        builder.push(line);
    }
    builder.finish()
}

/// Segments documents against a fixed annotation vocabulary.
#[derive(Debug, Clone)]
pub struct Segmenter {
    markers: Markers,
}

impl Segmenter {
    pub fn new<L, B>(line_markers: L, block_markers: B) -> Result<Self, MarkerError>
    where
        L: IntoIterator,
        L::Item: AsRef<str>,
        B: IntoIterator,
        B::Item: AsRef<str>,
    {
        Ok(Self::with_markers(Markers::new(line_markers, block_markers)?))
    }

    pub fn with_markers(markers: Markers) -> Self {
        Self { markers }
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    /// Replaces every unsegmented markdown cell by its segments, in place.
    ///
    /// Code and raw cells, and markdown cells that already carry a kind, pass
    /// through untouched. Output cells copy the input cell's metadata; a
    /// stale kind annotation in that metadata is dropped. When the format
    /// version requires cell ids, the first segment keeps the cell's id and
    /// later segments get fresh ones; otherwise ids are removed.
    pub fn segment(&self, doc: &mut Document, sink: &mut dyn DiagnosticSink) {
        let with_ids = doc.requires_cell_ids();
        let cells = std::mem::take(&mut doc.cells);
        let mut out = Vec::with_capacity(cells.len());

        for (index, cell) in cells.into_iter().enumerate() {
            if cell.cell_type != CellType::Markdown || cell.kind.is_some() {
                out.push(cell);
                continue;
            }

            let Segmented { segments, unclosed } = segment_source(&cell.source, &self.markers);
            match unclosed {
                Some(Unclosed::Fence) => sink.report(
                    Diagnostic::warning(Code::UnclosedBlock, "fenced block is never closed")
                        .at_cell(index),
                ),
                Some(Unclosed::Annotation(name)) => sink.report(
                    Diagnostic::warning(
                        Code::UnclosedBlock,
                        format!("no closing <!-- {name} --> before the end of the cell"),
                    )
                    .at_cell(index),
                ),
                None => {}
            }

            let mut metadata = cell.metadata;
            metadata.remove(ANNOTATION_KEY);
            let mut extra = cell.extra;
            // the first segment inherits the id, the rest get fresh ones
            let mut id = extra.remove(Cell::ID_KEY).filter(|_| with_ids);

            log::debug!("cell {index}: {} segment(s)", segments.len());
            for segment in segments {
                let mut cell = Cell {
                    cell_type: CellType::Markdown,
                    source: segment.source,
                    metadata: metadata.clone(),
                    kind: Some(segment.kind),
                    extra: extra.clone(),
                };
                match id.take() {
                    Some(id) => {
                        cell.extra.insert(Cell::ID_KEY.to_string(), id);
                    }
                    None if with_ids => cell.assign_fresh_id(),
                    None => {}
                }
                out.push(cell);
            }
        }

        doc.cells = out;
    }
}

/// Segments `doc` in place, logging diagnostics through the `log` facade.
pub fn segment<L, B>(doc: &mut Document, line_markers: L, block_markers: B) -> Result<(), MarkerError>
where
    L: IntoIterator,
    L::Item: AsRef<str>,
    B: IntoIterator,
    B::Item: AsRef<str>,
{
    Segmenter::new(line_markers, block_markers)?.segment(doc, &mut LogSink::new());
    Ok(())
}
