use crate::diagnostics::{Code, Diagnostic, DiagnosticSink};
use crate::models::Document;
use crate::parsing::kinds::{CodeFence, FenceSig, HtmlComment};
use crate::selection::{KindExpr, select_ref};

/// Reports HTML comments still open at the end of a markdown cell.
///
/// Fenced blocks are skipped, since a `<!--` inside code is not a comment.
pub fn check_comments(doc: &Document, expr: &KindExpr, sink: &mut dyn DiagnosticSink) -> usize {
    let mut found = 0;
    for (index, cell) in select_ref(doc, expr).filter(|(_, c)| c.is_markdown()) {
        if let Some(line) = open_comment(&cell.source) {
            found += 1;
            sink.report(
                Diagnostic::warning(Code::UnclosedComment, "comment is never closed")
                    .at_cell(index)
                    .at_line_index(line),
            );
        }
    }
    found
}

/// Zero-based line of a comment left open at the end of `source`.
fn open_comment(source: &str) -> Option<usize> {
    let mut fence: Option<FenceSig> = None;
    let mut open: Option<usize> = None;

    for (i, line) in source.split('\n').enumerate() {
        let line = line.trim_end_matches('\r');
        if let Some(sig) = fence {
            if CodeFence::closes(sig, CodeFence::sig(line)) {
                fence = None;
            }
        } else if open.is_some() {
            if HtmlComment::closes(line) {
                open = None;
            }
        } else if let Some(after) = HtmlComment::opener(line) {
            if !HtmlComment::closes(after) {
                open = Some(i);
            }
        } else {
            fence = CodeFence::sig(line);
        }
    }
    open
}
