//! # Rewriting
//!
//! Ordered batches of substitutions over the `source` of selected cells.
//!
//! A batch is a list of `(old, new)` pairs interpreted in one [`Mode`]. Each
//! pair is compiled once into a [`Rewrite`] and applied to every selected cell
//! before the next pair runs, so later pairs see the output of earlier ones.
//! A pair that fails to compile is reported and skipped; the rest of the batch
//! still applies.
//!
//! Rewrites only ever touch `source`. Cell type, kind and metadata are left
//! alone.

pub mod comments;
pub mod links;
pub mod tables;

pub use comments::remove_comments;
pub use links::expand_urls;
pub use tables::{FRACTIONS, POWERS};

use std::{borrow::Cow, collections::HashMap, fmt};

use crate::diagnostics::{Code, Diagnostic, DiagnosticSink};
use crate::models::Document;
use crate::selection::{KindExpr, select_indexed};

#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error(
        "cannot transliterate {from:?} to {to:?}: {from_len} characters against {to_len}"
    )]
    LengthMismatch {
        from: String,
        to: String,
        from_len: usize,
        to_len: usize,
    },
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: Box<fancy_regex::Error>,
    },
    #[error("pattern {pattern:?} gave up: {source}")]
    Runtime {
        pattern: String,
        #[source]
        source: Box<fancy_regex::Error>,
    },
}

/// One compiled substitution.
///
/// Implementations return `Cow::Borrowed` when the text is unchanged.
pub trait Rewrite: fmt::Debug {
    fn rewrite<'a>(&self, text: &'a str) -> Result<Cow<'a, str>, RewriteError>;
}

/// How the pairs of a batch are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Plain string replacement of every occurrence.
    Literal,
    /// Character-for-character transliteration.
    Chars,
    /// Regular expression with `$1` / `${name}` replacements.
    Pattern,
}

impl Mode {
    pub fn compile(self, old: &str, new: &str) -> Result<Box<dyn Rewrite>, RewriteError> {
        Ok(match self {
            Mode::Literal => Box::new(Literal::new(old, new)),
            Mode::Chars => Box::new(CharMap::new(old, new)?),
            Mode::Pattern => Box::new(Pattern::new(old, new)?),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    old: String,
    new: String,
}

impl Literal {
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }
}

impl Rewrite for Literal {
    fn rewrite<'a>(&self, text: &'a str) -> Result<Cow<'a, str>, RewriteError> {
        // an empty `old` matches at every char boundary, including in ""
        if self.old == self.new || !(self.old.is_empty() || text.contains(&self.old)) {
            return Ok(Cow::Borrowed(text));
        }
        Ok(Cow::Owned(text.replace(&self.old, &self.new)))
    }
}

/// Maps each character of `from` to the character at the same position in
/// `to`, in a single pass. When `from` repeats a character the last mapping
/// wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharMap {
    map: HashMap<char, char>,
}

impl CharMap {
    pub fn new(from: &str, to: &str) -> Result<Self, RewriteError> {
        let from_len = from.chars().count();
        let to_len = to.chars().count();
        if from_len != to_len {
            return Err(RewriteError::LengthMismatch {
                from: from.to_string(),
                to: to.to_string(),
                from_len,
                to_len,
            });
        }
        Ok(Self {
            map: from.chars().zip(to.chars()).collect(),
        })
    }
}

impl Rewrite for CharMap {
    fn rewrite<'a>(&self, text: &'a str) -> Result<Cow<'a, str>, RewriteError> {
        if !text.chars().any(|c| self.map.get(&c).is_some_and(|&m| m != c)) {
            return Ok(Cow::Borrowed(text));
        }
        Ok(Cow::Owned(
            text.chars()
                .map(|c| self.map.get(&c).copied().unwrap_or(c))
                .collect(),
        ))
    }
}

/// Regular expression substitution backed by `fancy-regex`, so look-around
/// and backreferences are available alongside inline flags.
#[derive(Debug)]
pub struct Pattern {
    regex: fancy_regex::Regex,
    replacement: String,
}

impl Pattern {
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self, RewriteError> {
        let regex =
            fancy_regex::Regex::new(pattern).map_err(|e| RewriteError::InvalidPattern {
                pattern: pattern.to_string(),
                source: Box::new(e),
            })?;
        Ok(Self {
            regex,
            replacement: replacement.into(),
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl Rewrite for Pattern {
    fn rewrite<'a>(&self, text: &'a str) -> Result<Cow<'a, str>, RewriteError> {
        self.regex
            .try_replacen(text, 0, self.replacement.as_str())
            .map_err(|e| RewriteError::Runtime {
                pattern: self.regex.as_str().to_string(),
                source: Box::new(e),
            })
    }
}

/// Compiles `pairs` in `mode` and applies them to the cells selected by
/// `expr`. Returns how many cell sources changed.
pub fn substitute<O, N>(
    doc: &mut Document,
    expr: &KindExpr,
    mode: Mode,
    pairs: &[(O, N)],
    sink: &mut dyn DiagnosticSink,
) -> usize
where
    O: AsRef<str>,
    N: AsRef<str>,
{
    let rewrites: Vec<Box<dyn Rewrite>> = pairs
        .iter()
        .filter_map(|(old, new)| match mode.compile(old.as_ref(), new.as_ref()) {
            Ok(rewrite) => Some(rewrite),
            Err(e) => {
                sink.report(Diagnostic::error(Code::BadSubstitution, e.to_string()));
                None
            }
        })
        .collect();
    apply(doc, expr, &rewrites, sink)
}

/// Applies already compiled rewrites, pair by pair across the selection.
pub fn apply(
    doc: &mut Document,
    expr: &KindExpr,
    rewrites: &[Box<dyn Rewrite>],
    sink: &mut dyn DiagnosticSink,
) -> usize {
    let mut cells = select_indexed(doc, expr);
    let mut changed = vec![false; cells.len()];

    for rewrite in rewrites {
        for ((index, cell), changed) in cells.iter_mut().zip(changed.iter_mut()) {
            let new = match rewrite.rewrite(&cell.source) {
                Ok(Cow::Borrowed(_)) => continue,
                Ok(Cow::Owned(new)) => new,
                Err(e) => {
                    sink.report(
                        Diagnostic::error(Code::BadSubstitution, e.to_string()).at_cell(*index),
                    );
                    continue;
                }
            };
            if new != cell.source {
                cell.source = new;
                *changed = true;
            }
        }
    }

    let count = changed.iter().filter(|&&c| c).count();
    log::debug!("{count} cell(s) rewritten");
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cell, Kind};
    use crate::tests::{outline, sample_document};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn sources(doc: &Document) -> Vec<&str> {
        doc.iter().map(|c| c.source.as_str()).collect()
    }

    #[rstest]
    #[case("a-b-c", "-", "+", "a+b+c")]
    #[case("abc", "x", "y", "abc")]
    #[case("", "", "filled", "filled")]
    #[case("ab", "", "_", "_a_b_")]
    fn literal_replaces_every_occurrence(
        #[case] text: &str,
        #[case] old: &str,
        #[case] new: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(Literal::new(old, new).rewrite(text).unwrap(), expected);
    }

    #[test]
    fn char_map_is_single_pass() {
        let swap = CharMap::new("ab", "ba").unwrap();
        assert_eq!(swap.rewrite("aabb").unwrap(), "bbaa");
    }

    #[test]
    fn char_map_counts_characters_not_bytes() {
        let map = CharMap::new("«»", "││").unwrap();
        assert_eq!(map.rewrite("«x»").unwrap(), "│x│");
    }

    #[test]
    fn char_map_rejects_unequal_lengths() {
        let err = CharMap::new("abc", "xy").unwrap_err();
        assert!(matches!(
            err,
            RewriteError::LengthMismatch {
                from_len: 3,
                to_len: 2,
                ..
            }
        ));
    }

    #[rstest]
    #[case(r"^\s+", "", "  x  ", "x  ")]
    #[case(r"(\w+) (\w+)", "$2 $1", "hello world", "world hello")]
    #[case(r"(?i)(unit) +(\d)", "${1}&nbsp;$2", "Unit  3", "Unit&nbsp;3")]
    #[case(r"(?m)^( *)(%time)", "$1# $2", "a\n  %time f()", "a\n  # %time f()")]
    #[case(r"(?s)<a>.*?</a>", "", "<a>\n</a>x<a></a>", "x")]
    #[case(r"\d(?= ?ms)", "N", "5 ms 6 s", "N ms 6 s")]
    fn pattern_supports_flags_and_lookahead(
        #[case] pattern: &str,
        #[case] replacement: &str,
        #[case] text: &str,
        #[case] expected: &str,
    ) {
        let rewrite = Pattern::new(pattern, replacement).unwrap();
        assert_eq!(rewrite.rewrite(text).unwrap(), expected);
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(matches!(
            Pattern::new("(unclosed", ""),
            Err(RewriteError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn substitute_applies_pairs_in_order() {
        let mut doc = Document::from_cells(vec![Cell::markdown("a").with_kind(Kind::Text)]);
        let mut diagnostics = vec![];
        substitute(
            &mut doc,
            &KindExpr::all(),
            Mode::Literal,
            &[("a", "b"), ("b", "c")],
            &mut diagnostics,
        );
        assert_eq!(sources(&doc), ["c"]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn mismatched_pair_is_skipped_and_later_pairs_apply() {
        let mut doc = Document::from_cells(vec![Cell::markdown("abc").with_kind(Kind::Text)]);
        let mut diagnostics = vec![];
        let changed = substitute(
            &mut doc,
            &KindExpr::all(),
            Mode::Chars,
            &[("ab", "x"), ("c", "z")],
            &mut diagnostics,
        );
        assert_eq!(sources(&doc), ["abz"]);
        assert_eq!(changed, 1);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, Code::BadSubstitution);
    }

    #[test]
    fn only_selected_cells_change() {
        let mut doc = sample_document();
        let before = outline(&doc);
        let mut diagnostics = vec![];
        substitute(
            &mut doc,
            &KindExpr::parse("code"),
            Mode::Pattern,
            &[(r"\d", "N")],
            &mut diagnostics,
        );
        let after = outline(&doc);
        for (i, (b, a)) in before.iter().zip(&after).enumerate() {
            if b.0 == "code" {
                assert_eq!(a.1, "x = N");
            } else {
                assert_eq!(a, b, "cell {i} untouched");
            }
        }
    }

    #[test]
    fn rewrites_keep_type_kind_and_metadata() {
        let mut doc = sample_document();
        let kinds: Vec<_> = doc.iter().map(|c| (c.cell_type, c.kind.clone())).collect();
        let metadata: Vec<_> = doc.iter().map(|c| c.metadata.clone()).collect();
        substitute(
            &mut doc,
            &KindExpr::all(),
            Mode::Literal,
            &[("", "!")],
            &mut vec![],
        );
        assert_eq!(
            doc.iter().map(|c| (c.cell_type, c.kind.clone())).collect::<Vec<_>>(),
            kinds
        );
        assert_eq!(
            doc.iter().map(|c| c.metadata.clone()).collect::<Vec<_>>(),
            metadata
        );
    }

    #[rstest]
    #[case(Mode::Literal, "x", "x")]
    #[case(Mode::Chars, "ab", "ab")]
    #[case(Mode::Pattern, "(.)", "$1")]
    fn noop_substitution_is_idempotent(#[case] mode: Mode, #[case] old: &str, #[case] new: &str) {
        let mut doc = sample_document();
        let before = doc.clone();
        let changed = substitute(&mut doc, &KindExpr::all(), mode, &[(old, new)], &mut vec![]);
        assert_eq!(changed, 0);
        assert_eq!(doc, before);
    }

    #[test]
    fn fills_empty_answer_cells() {
        let mut doc = sample_document();
        substitute(
            &mut doc,
            &KindExpr::parse("md:answer"),
            Mode::Literal,
            &[("", "_Write your answer here._")],
            &mut vec![],
        );
        let answer = doc
            .iter()
            .find(|c| c.kind_name() == Some("answer"))
            .unwrap();
        assert_eq!(answer.source, "_Write your answer here._");
    }
}
