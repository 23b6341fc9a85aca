use super::kinds::HtmlComment;
use super::kinds::comment::is_name_char;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerRole {
    /// `<!-- answer -->` on its own: an empty placeholder cell.
    Line,
    /// `<!-- note -->` ... `<!-- note -->`: the enclosed lines become a cell.
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkerError {
    #[error("invalid marker name {0:?}: markers must be simple tokens such as `note`")]
    InvalidName(String),
    #[error("marker {0:?} is configured as both a line and a block marker")]
    Overlap(String),
}

/// The annotation vocabulary for one segmenting run.
///
/// Names are stored lowercased; matching is case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markers {
    line: Vec<String>,
    block: Vec<String>,
}

impl Markers {
    pub fn new<L, B>(line: L, block: B) -> Result<Self, MarkerError>
    where
        L: IntoIterator,
        L::Item: AsRef<str>,
        B: IntoIterator,
        B::Item: AsRef<str>,
    {
        let line = Self::normalize(line)?;
        let block = Self::normalize(block)?;
        if let Some(name) = line.iter().find(|name| block.contains(name)) {
            return Err(MarkerError::Overlap(name.clone()));
        }
        Ok(Self { line, block })
    }

    pub fn line(&self) -> &[String] {
        &self.line
    }

    pub fn block(&self) -> &[String] {
        &self.block
    }

    /// Finds the marker a comment consists of (given the text after `<!--`).
    pub fn lookup(&self, after_open: &str) -> Option<(MarkerRole, &str)> {
        Self::find(&self.line, after_open)
            .map(|name| (MarkerRole::Line, name))
            .or_else(|| Self::find(&self.block, after_open).map(|name| (MarkerRole::Block, name)))
    }

    fn find<'a>(names: &'a [String], after_open: &str) -> Option<&'a str> {
        names
            .iter()
            .find(|name| HtmlComment::is_marker(after_open, name))
            .map(String::as_str)
    }

    fn normalize<I>(names: I) -> Result<Vec<String>, MarkerError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| {
                let name = name.as_ref().trim();
                if Self::is_valid(name) {
                    Ok(name.to_lowercase())
                } else {
                    Err(MarkerError::InvalidName(name.to_string()))
                }
            })
            .collect()
    }

    fn is_valid(name: &str) -> bool {
        !name.is_empty() && name.chars().all(is_name_char) && !name.contains("--")
    }
}
