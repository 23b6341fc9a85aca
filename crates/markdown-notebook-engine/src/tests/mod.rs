use crate::models::{Cell, Document, Kind};

/// A small already-segmented document:
/// head, text, code, answer placeholder, raw.
pub fn sample_document() -> Document {
    Document::from_cells(vec![
        Cell::markdown("# Intro").with_kind(Kind::Head {
            level: 1,
            heading: "Intro".into(),
        }),
        Cell::markdown("Some prose.").with_kind(Kind::Text),
        Cell::code("x = 1"),
        Cell::markdown("").with_kind(Kind::Named("answer".into())),
        Cell::raw("raw text"),
    ])
}

/// `(kind name or type, source)` pairs, for compact assertions.
pub fn outline(doc: &Document) -> Vec<(String, String)> {
    doc.iter()
        .map(|c| {
            let label = c
                .kind_name()
                .map(str::to_string)
                .unwrap_or_else(|| c.cell_type.to_string());
            (label, c.source.clone())
        })
        .collect()
}

pub fn text_cell(source: &str) -> Cell {
    Cell::markdown(source).with_kind(Kind::Text)
}
