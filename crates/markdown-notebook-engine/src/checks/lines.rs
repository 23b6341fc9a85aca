use crate::diagnostics::{Code, Diagnostic, DiagnosticSink};
use crate::models::Document;
use crate::selection::{KindExpr, select_ref};

/// Flags lines longer than `max` characters.
pub fn check_lengths(
    doc: &Document,
    expr: &KindExpr,
    max: usize,
    sink: &mut dyn DiagnosticSink,
) -> usize {
    let mut found = 0;
    for (index, cell) in select_ref(doc, expr) {
        for (i, line) in cell.lines().enumerate() {
            let len = line.chars().count();
            if len > max {
                found += 1;
                sink.report(
                    Diagnostic::warning(
                        Code::LongLine,
                        format!("{len} characters (max {max}): {line}"),
                    )
                    .at_cell(index)
                    .at_line_index(i),
                );
            }
        }
    }
    found
}

/// Flags non-blank lines ending in two or more spaces, which Markdown turns
/// into an invisible hard line break.
pub fn check_breaks(doc: &Document, expr: &KindExpr, sink: &mut dyn DiagnosticSink) -> usize {
    let mut found = 0;
    for (index, cell) in select_ref(doc, expr) {
        for (i, line) in cell.lines().enumerate() {
            if !line.trim().is_empty() && line.ends_with("  ") {
                found += 1;
                sink.report(
                    Diagnostic::warning(
                        Code::TrailingSpaces,
                        format!("line break after: {}", line.trim_end()),
                    )
                    .at_cell(index)
                    .at_line_index(i),
                );
            }
        }
    }
    found
}
