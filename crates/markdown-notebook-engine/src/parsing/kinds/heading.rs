use super::strip_indent;
use crate::models::Kind;

/// An ATX heading line: `## Title ##`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtxHeading<'a> {
    pub level: u8,
    pub title: &'a str,
}

impl<'a> AtxHeading<'a> {
    pub const MARKER: u8 = b'#';
    pub const MAX_LEVEL: usize = Kind::MAX_LEVEL as usize;

    /// Parses a heading: up to 3 spaces, 1 to 6 `#`, one space, a title.
    pub fn parse(line: &'a str) -> Option<Self> {
        let rest = strip_indent(line)?;
        let hashes = rest.bytes().take_while(|&b| b == Self::MARKER).count();
        if hashes == 0 || hashes > Self::MAX_LEVEL {
            return None;
        }
        let title = Self::strip_closing(rest[hashes..].strip_prefix(' ')?);
        if title.is_empty() {
            return None;
        }
        Some(Self {
            level: hashes as u8,
            title,
        })
    }

    /// Drops surrounding whitespace and any trailing run of `#` and spaces.
    fn strip_closing(title: &str) -> &str {
        title.trim().trim_end_matches([' ', '\t', '#'])
    }
}
