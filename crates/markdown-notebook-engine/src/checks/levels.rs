use crate::diagnostics::{Code, Diagnostic, DiagnosticSink};
use crate::models::Document;

/// Flags headings that skip a level, such as `###` directly after `#`.
///
/// Only `head` cells take part; the first heading sets the baseline.
pub fn check_levels(doc: &Document, sink: &mut dyn DiagnosticSink) -> usize {
    let mut previous: Option<u8> = None;
    let mut found = 0;

    for (index, cell) in doc.iter().enumerate() {
        let Some(level) = cell.kind.as_ref().and_then(|k| k.level()) else {
            continue;
        };
        if let Some(prev) = previous.filter(|&prev| level.saturating_sub(prev) > 1) {
            found += 1;
            sink.report(
                Diagnostic::warning(
                    Code::SkippedLevel,
                    format!("heading level {level} follows level {prev}: {}", cell.source),
                )
                .at_cell(index),
            );
        }
        previous = Some(level);
    }
    found
}
