use std::{borrow::Cow, collections::BTreeMap, sync::OnceLock};

use regex::{Captures, Regex};

use crate::diagnostics::{Code, Diagnostic, DiagnosticSink};
use crate::models::Document;
use crate::selection::{KindExpr, select_indexed};

/// The `](target)` tail of an inline Markdown link.
fn link_regex() -> &'static Regex {
    static LINK_REGEX: OnceLock<Regex> = OnceLock::new();
    LINK_REGEX.get_or_init(|| Regex::new(r"\]\(([^)\s]+)\)").expect("Invalid link regex"))
}

fn scheme_regex() -> &'static Regex {
    static SCHEME_REGEX: OnceLock<Regex> = OnceLock::new();
    SCHEME_REGEX
        .get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*:").expect("Invalid scheme regex"))
}

/// Whether a link target starts with a URL scheme such as `https:` or
/// `mailto:`.
pub fn has_scheme(target: &str) -> bool {
    scheme_regex().is_match(target)
}

/// Every inline link target in `text`, with its zero-based line index.
pub fn link_targets(text: &str) -> impl Iterator<Item = (usize, &str)> {
    link_regex().captures_iter(text).filter_map(move |caps| {
        let target = caps.get(1)?;
        let line = text[..target.start()].matches('\n').count();
        Some((line, target.as_str()))
    })
}

/// Replaces link labels by the URLs they stand for: `[text](m269)` becomes
/// `[text](https://...)` when `labels` maps `m269`.
///
/// Targets that already have a scheme are left alone. Unknown labels are
/// reported and left unchanged.
pub fn expand_urls(
    doc: &mut Document,
    expr: &KindExpr,
    labels: &BTreeMap<String, String>,
    sink: &mut dyn DiagnosticSink,
) -> usize {
    let mut changed = 0;
    for (index, cell) in select_indexed(doc, expr) {
        let mut unknown = vec![];
        let expanded = link_regex().replace_all(&cell.source, |caps: &Captures| {
            let label = &caps[1];
            if has_scheme(label) {
                return caps[0].to_string();
            }
            match labels.get(label) {
                Some(url) => format!("]({url})"),
                None => {
                    let line = cell.source[..caps.get(0).map_or(0, |m| m.start())]
                        .matches('\n')
                        .count();
                    unknown.push((line, label.to_string()));
                    caps[0].to_string()
                }
            }
        });

        for (line, label) in unknown {
            sink.report(
                Diagnostic::warning(Code::UnknownLabel, format!("unknown link label {label:?}"))
                    .at_cell(index)
                    .at_line_index(line),
            );
        }

        if let Cow::Owned(expanded) = expanded {
            if expanded != cell.source {
                cell.source = expanded;
                changed += 1;
            }
        }
    }
    changed
}
