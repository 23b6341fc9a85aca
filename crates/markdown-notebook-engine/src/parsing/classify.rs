use super::kinds::{AtxHeading, CodeFence, FenceSig, HtmlComment};
use super::markers::{MarkerRole, Markers};

/// A comment opener found at the start of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentOpen<'a> {
    /// The configured marker this comment names, if any.
    pub marker: Option<(MarkerRole, &'a str)>,
    /// Whether `-->` already appears on the opening line.
    pub closed_on_line: bool,
}

/// Classification of a single line containing only local facts.
///
/// Each line is classified without reference to the scanner state; the
/// builder decides which facts apply.
#[derive(Debug, Clone)]
pub struct LineClass<'a> {
    pub text: &'a str,
    pub comment: Option<CommentOpen<'a>>,
    pub fence: Option<FenceSig>,
    pub heading: Option<AtxHeading<'a>>,
}

/// Classifies lines against an annotation vocabulary.
pub struct LineClassifier<'m> {
    markers: &'m Markers,
}

impl<'m> LineClassifier<'m> {
    pub fn new(markers: &'m Markers) -> Self {
        Self { markers }
    }

    pub fn classify<'a>(&self, line: &'a str) -> LineClass<'a>
    where
        'm: 'a,
    {
        let trimmed = line.trim_end_matches('\r');
        let comment = HtmlComment::opener(trimmed).map(|after| CommentOpen {
            marker: self.markers.lookup(after),
            closed_on_line: HtmlComment::closes(after),
        });

        LineClass {
            text: line,
            comment,
            fence: CodeFence::sig(trimmed),
            heading: AtxHeading::parse(trimmed),
        }
    }
}
