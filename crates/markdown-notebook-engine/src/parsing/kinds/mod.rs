pub mod code_fence;
pub mod comment;
pub mod heading;

pub use code_fence::{CodeFence, FenceKind, FenceSig};
pub use comment::HtmlComment;
pub use heading::AtxHeading;

/// Maximum indentation before a construct stops being recognised.
pub const MAX_INDENT: usize = 3;

/// Strips up to [`MAX_INDENT`] leading spaces. Returns `None` when the line
/// is indented further.
pub fn strip_indent(line: &str) -> Option<&str> {
    let spaces = line.bytes().take_while(|&b| b == b' ').count();
    (spaces <= MAX_INDENT).then(|| &line[spaces..])
}
