use crate::diagnostics::{Code, Diagnostic, DiagnosticSink};
use crate::models::Document;
use crate::parsing::kinds::HtmlComment;
use crate::selection::{KindExpr, select_indexed};

enum State<'s> {
    Outside,
    Keeping,
    Removing { start: usize, lines: Vec<&'s str> },
}

/// Removes HTML comments that open at the start of a line from the selected
/// cells. Comments whose body starts with a name in `keep` stay.
///
/// Text after a closing `-->` is kept on its own line and reported. A comment
/// still open at the end of a cell is reported and left in place.
pub fn remove_comments<K: AsRef<str>>(
    doc: &mut Document,
    expr: &KindExpr,
    keep: &[K],
    sink: &mut dyn DiagnosticSink,
) -> usize {
    let mut changed = 0;
    for (index, cell) in select_indexed(doc, expr) {
        let stripped = strip(&cell.source, keep, index, sink);
        if stripped != cell.source {
            cell.source = stripped;
            changed += 1;
        }
    }
    log::debug!("comments removed from {changed} cell(s)");
    changed
}

fn strip<K: AsRef<str>>(
    source: &str,
    keep: &[K],
    cell: usize,
    sink: &mut dyn DiagnosticSink,
) -> String {
    let mut out: Vec<&str> = vec![];
    let mut state = State::Outside;

    for (i, line) in source.split('\n').enumerate() {
        state = match state {
            State::Outside => match HtmlComment::opener(line) {
                Some(after) => {
                    let kept = keep
                        .iter()
                        .any(|name| HtmlComment::starts_with_name(after, name.as_ref()));
                    match (kept, after.find(HtmlComment::CLOSE)) {
                        (true, Some(_)) => {
                            out.push(line);
                            State::Outside
                        }
                        (true, None) => {
                            out.push(line);
                            State::Keeping
                        }
                        (false, Some(end)) => {
                            keep_tail(&after[end..], &mut out, cell, i, sink);
                            State::Outside
                        }
                        (false, None) => State::Removing {
                            start: i,
                            lines: vec![line],
                        },
                    }
                }
                None => {
                    if is_spurious_end(line) {
                        sink.report(
                            Diagnostic::warning(
                                Code::SpuriousCommentEnd,
                                format!("`-->` without an open comment: {}", line.trim()),
                            )
                            .at_cell(cell)
                            .at_line_index(i),
                        );
                    }
                    out.push(line);
                    State::Outside
                }
            },
            State::Keeping => {
                out.push(line);
                if HtmlComment::closes(line) {
                    State::Outside
                } else {
                    State::Keeping
                }
            }
            State::Removing { start, mut lines } => match line.find(HtmlComment::CLOSE) {
                Some(end) => {
                    keep_tail(&line[end..], &mut out, cell, i, sink);
                    State::Outside
                }
                None => {
                    lines.push(line);
                    State::Removing { start, lines }
                }
            },
        };
    }

    if let State::Removing { start, lines } = state {
        sink.report(
            Diagnostic::warning(Code::UnclosedComment, "comment is never closed; kept")
                .at_cell(cell)
                .at_line_index(start),
        );
        out.extend(lines);
    }

    out.join("\n")
}

/// `rest` starts at the closing `-->`.
fn keep_tail<'s>(
    rest: &'s str,
    out: &mut Vec<&'s str>,
    cell: usize,
    line: usize,
    sink: &mut dyn DiagnosticSink,
) {
    let tail = rest[HtmlComment::CLOSE.len()..].trim();
    if !tail.is_empty() {
        sink.report(
            Diagnostic::warning(
                Code::TextAfterComment,
                format!("text after comment kept: {tail}"),
            )
            .at_cell(cell)
            .at_line_index(line),
        );
        out.push(tail);
    }
}

/// A `-->` that comes before any `<!--` on the line.
fn is_spurious_end(line: &str) -> bool {
    match (line.find(HtmlComment::CLOSE), line.find(HtmlComment::OPEN)) {
        (Some(close), Some(open)) => close < open,
        (Some(_), None) => true,
        _ => false,
    }
}
