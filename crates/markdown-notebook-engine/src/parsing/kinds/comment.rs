use super::strip_indent;

/// HTML-style comments, both annotation markers and generic comments.
pub struct HtmlComment;

impl HtmlComment {
    pub const OPEN: &'static str = "<!--";
    pub const CLOSE: &'static str = "-->";

    /// If `line` opens a comment (after at most 3 spaces), returns the text
    /// following the `<!--`.
    pub fn opener(line: &str) -> Option<&str> {
        strip_indent(line)?.strip_prefix(Self::OPEN)
    }

    /// Whether the comment is exactly `name` (any case) and nothing else:
    /// `<!-- note -->` names `note`, `<!-- note to self -->` does not.
    pub fn is_marker(after_open: &str, name: &str) -> bool {
        after_open
            .trim_end()
            .strip_suffix(Self::CLOSE)
            .is_some_and(|body| same_name(body.trim(), name))
    }

    /// Whether the comment body starts with the word `name` (any case), as in
    /// `<!-- todo: check -->` for `todo`.
    pub fn starts_with_name(after_open: &str, name: &str) -> bool {
        let body = after_open.trim_start();
        let split = body
            .char_indices()
            .nth(name.chars().count())
            .map_or(body.len(), |(i, _)| i);
        let (head, tail) = body.split_at(split);
        same_name(head, name)
            && (tail.starts_with(Self::CLOSE) || !tail.chars().next().is_some_and(is_name_char))
    }

    /// Whether `line` is exactly `<!-- name -->` (up to 3 leading spaces,
    /// trailing whitespace ignored, case-insensitive).
    pub fn is_terminator(line: &str, name: &str) -> bool {
        strip_indent(line)
            .map(str::trim_end)
            .and_then(|rest| rest.strip_prefix("<!-- "))
            .and_then(|rest| rest.strip_suffix(" -->"))
            .is_some_and(|middle| same_name(middle, name))
    }

    pub fn closes(text: &str) -> bool {
        text.contains(Self::CLOSE)
    }
}

/// Unicode case-insensitive comparison of marker names.
fn same_name(text: &str, name: &str) -> bool {
    text.chars()
        .flat_map(char::to_lowercase)
        .eq(name.chars().flat_map(char::to_lowercase))
}

/// Characters allowed in marker names.
pub fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}
