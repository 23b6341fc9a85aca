//! # Diagnostics
//!
//! Passes never fail on content problems. They describe what they found as
//! [`Diagnostic`] values and hand them to a [`DiagnosticSink`] supplied by the
//! caller, then carry on (skipping the offending operation where needed).
//!
//! - `Vec<Diagnostic>` collects diagnostics, which is what tests use.
//! - [`LogSink`] forwards to the `log` facade and keeps counts, which is what
//!   the command line uses.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Advisory: the document is probably wrong but nothing was skipped.
    Warning,
    /// A requested operation was skipped.
    Error,
}

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    SkippedLevel,
    LongLine,
    TrailingSpaces,
    UnknownLabel,
    BrokenUrl,
    SpuriousCommentEnd,
    TextAfterComment,
    UnclosedComment,
    UnclosedBlock,
    BadSubstitution,
    Misuse,
}

impl Code {
    pub fn as_str(self) -> &'static str {
        match self {
            Code::SkippedLevel => "skipped-level",
            Code::LongLine => "long-line",
            Code::TrailingSpaces => "trailing-spaces",
            Code::UnknownLabel => "unknown-label",
            Code::BrokenUrl => "broken-url",
            Code::SpuriousCommentEnd => "spurious-comment-end",
            Code::TextAfterComment => "text-after-comment",
            Code::UnclosedComment => "unclosed-comment",
            Code::UnclosedBlock => "unclosed-block",
            Code::BadSubstitution => "bad-substitution",
            Code::Misuse => "misuse",
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Code,
    /// Zero-based cell index, when the problem is tied to a cell.
    pub cell: Option<usize>,
    /// One-based line number within the cell source.
    pub line: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(code: Code, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    pub fn error(code: Code, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    fn new(severity: Severity, code: Code, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            cell: None,
            line: None,
            message: message.into(),
        }
    }

    pub fn at_cell(mut self, cell: usize) -> Self {
        self.cell = Some(cell);
        self
    }

    /// Sets the line from a zero-based index.
    pub fn at_line_index(mut self, index: usize) -> Self {
        self.line = Some(index + 1);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.code)?;
        match (self.cell, self.line) {
            (Some(cell), Some(line)) => write!(f, " cell {cell}, line {line}:")?,
            (Some(cell), None) => write!(f, " cell {cell}:")?,
            _ => {}
        }
        write!(f, " {}", self.message)
    }
}

/// Receives diagnostics emitted by passes.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Forwards diagnostics to the `log` facade and counts them.
#[derive(Debug, Default)]
pub struct LogSink {
    warnings: usize,
    errors: usize,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> usize {
        self.warnings
    }

    pub fn errors(&self) -> usize {
        self.errors
    }

    pub fn total(&self) -> usize {
        self.warnings + self.errors
    }
}

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => {
                self.warnings += 1;
                log::warn!("{diagnostic}");
            }
            Severity::Error => {
                self.errors += 1;
                log::error!("{diagnostic}");
            }
        }
    }
}
