use crate::models::Kind;

use super::{
    classify::{LineClass, LineClassifier},
    kinds::{CodeFence, FenceSig, HtmlComment},
    markers::{MarkerRole, Markers},
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum ScanState {
    Normal,
    InFence(FenceSig),
    InAnnotation(String),
    InGenericComment,
}

/// One output cell of the scanner: a kind and its source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: Kind,
    pub source: String,
}

/// A construct still open when the input ran out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unclosed {
    Fence,
    Annotation(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmented {
    pub segments: Vec<Segment>,
    pub unclosed: Option<Unclosed>,
}

/// Single-pass line scanner that splits a markdown source into segments.
///
/// Feed lines with [`push`](Self::push), then call [`finish`](Self::finish).
pub struct SegmentBuilder<'m, 's> {
    classifier: LineClassifier<'m>,
    state: ScanState,
    buffer: Vec<&'s str>,
    out: Vec<Segment>,
}

impl<'m, 's> SegmentBuilder<'m, 's> {
    pub fn new(markers: &'m Markers) -> Self {
        Self {
            classifier: LineClassifier::new(markers),
            state: ScanState::Normal,
            buffer: vec![],
            out: vec![],
        }
    }

    pub fn push(&mut self, line: &'s str) {
        match std::mem::replace(&mut self.state, ScanState::Normal) {
            ScanState::InAnnotation(name) => {
                if HtmlComment::is_terminator(line, &name) {
                    self.close_trimmed(Kind::Named(name));
                } else {
                    self.buffer.push(line);
                    self.state = ScanState::InAnnotation(name);
                }
            }
            ScanState::InGenericComment => {
                self.buffer.push(line);
                if !HtmlComment::closes(line) {
                    self.state = ScanState::InGenericComment;
                }
            }
            ScanState::InFence(open) => {
                self.buffer.push(line);
                if CodeFence::closes(open, CodeFence::sig(line.trim_end_matches('\r'))) {
                    self.close_verbatim(Kind::Fence);
                } else {
                    self.state = ScanState::InFence(open);
                }
            }
            ScanState::Normal => self.push_normal(line),
        }
    }

    pub fn finish(mut self) -> Segmented {
        let unclosed = match std::mem::replace(&mut self.state, ScanState::Normal) {
            ScanState::InFence(_) => Some(Unclosed::Fence),
            ScanState::InAnnotation(name) => Some(Unclosed::Annotation(name)),
            ScanState::Normal | ScanState::InGenericComment => None,
        };
        // EOF flush: whatever is pending is text
        self.close_trimmed(Kind::Text);
        Segmented {
            segments: self.out,
            unclosed,
        }
    }

    fn push_normal(&mut self, line: &'s str) {
        let lc: LineClass<'_> = self.classifier.classify(line);
        if let Some(comment) = lc.comment {
            match comment.marker {
                Some((MarkerRole::Line, name)) => {
                    self.close_trimmed(Kind::Text);
                    self.out.push(Segment {
                        kind: Kind::Named(name.to_string()),
                        source: String::new(),
                    });
                }
                Some((MarkerRole::Block, name)) => {
                    self.close_trimmed(Kind::Text);
                    self.state = ScanState::InAnnotation(name.to_string());
                }
                None => {
                    self.buffer.push(line);
                    if !comment.closed_on_line {
                        self.state = ScanState::InGenericComment;
                    }
                }
            }
            return;
        }

        if let Some(sig) = lc.fence {
            self.close_trimmed(Kind::Text);
            self.buffer.push(line);
            self.state = ScanState::InFence(sig);
            return;
        }

        if let Some(heading) = lc.heading {
            self.close_trimmed(Kind::Text);
            self.out.push(Segment {
                kind: Kind::Head {
                    level: heading.level,
                    heading: heading.title.to_string(),
                },
                source: line.trim_end().to_string(),
            });
            return;
        }

        self.buffer.push(line);
    }

    /// Emits the buffer without its leading blank lines and trailing
    /// whitespace, unless nothing is left.
    fn close_trimmed(&mut self, kind: Kind) {
        let lines = std::mem::take(&mut self.buffer);
        if let Some(first) = lines.iter().position(|l| !l.trim().is_empty()) {
            self.out.push(Segment {
                kind,
                source: lines[first..].join("\n").trim_end().to_string(),
            });
        }
    }

    fn close_verbatim(&mut self, kind: Kind) {
        let lines = std::mem::take(&mut self.buffer);
        if !lines.is_empty() {
            self.out.push(Segment {
                kind,
                source: lines.join("\n"),
            });
        }
    }
}
